//! The catalog of templates a user drags new inputs from.

use std::sync::Arc;

use crate::document::{Document, Field, FieldKind, FieldOption, Input, InputId, SubSection};
use crate::naming::NameAllocator;

/// Grid width of a newly placed field when neither the template nor the host says otherwise.
pub const DEFAULT_GRID_SIZE: u8 = 6;

/// Checkboxes are laid out on their own row by default.
pub const CHECKBOX_GRID_SIZE: u8 = 12;

/// Label of the single option seeded into new select/multiselect/radio fields.
pub const SEED_OPTION_LABEL: &str = "Option 1";

/// One draggable template. The template input is opaque: it is cloned, given a fresh id and a
/// unique name, and inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    pub id: String,
    pub template: Input,
}

/// Ordered `id → template` catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: impl IntoIterator<Item = PaletteEntry>) -> Self {
        let mut palette = Self::default();
        for entry in entries {
            palette.insert(entry);
        }
        palette
    }

    /// The built-in catalog: one template per field kind plus a sub-section.
    pub fn standard() -> Self {
        let fields = [
            ("text", FieldKind::Text, "Text"),
            ("textarea", FieldKind::Textarea, "Text Area"),
            ("number", FieldKind::Number, "Number"),
            ("email", FieldKind::Email, "Email"),
            ("phone", FieldKind::Phone, "Phone"),
            ("date", FieldKind::Date, "Date"),
            ("datetime", FieldKind::Datetime, "Date Time"),
            ("checkbox", FieldKind::Checkbox, "Checkbox"),
            ("select", FieldKind::Select, "Select"),
            ("multiselect", FieldKind::Multiselect, "Multi Select"),
            ("radio", FieldKind::Radio, "Radio"),
            ("lookup", FieldKind::Lookup, "Lookup"),
            ("file", FieldKind::File, "File"),
        ];

        let mut entries: Vec<PaletteEntry> = fields
            .into_iter()
            .map(|(id, kind, label)| PaletteEntry {
                id: id.to_owned(),
                template: Field::new(format!("template_{id}"), kind, label).into(),
            })
            .collect();
        entries.push(PaletteEntry {
            id: "subsection".to_owned(),
            template: SubSection::new("template_subsection", "Sub Section").into(),
        });
        Self::new(entries)
    }

    /// Adds an entry, replacing any entry with the same id in place.
    pub fn insert(&mut self, entry: PaletteEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, id: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PaletteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a PaletteEntry;
    type IntoIter = std::slice::Iter<'a, PaletteEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Grid sizes applied when a template does not specify one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridDefaults {
    pub default: u8,
    pub checkbox: u8,
}

impl Default for GridDefaults {
    fn default() -> Self {
        Self {
            default: DEFAULT_GRID_SIZE,
            checkbox: CHECKBOX_GRID_SIZE,
        }
    }
}

impl GridDefaults {
    pub fn for_kind(&self, kind: &FieldKind) -> u8 {
        match kind {
            FieldKind::Checkbox => self.checkbox,
            _ => self.default,
        }
    }
}

/// Turn `template` into a new input ready to be inserted into `document`.
///
/// The result has a fresh id, a name unique in `document`, a grid size, and (for option
/// kinds) exactly one seeded option when the template brought none. Inputs nested in a
/// sub-section template are materialized the same way.
pub fn instantiate(template: &Input, document: &Document, grid: GridDefaults) -> Input {
    let mut names = NameAllocator::for_document(document, None);
    instantiate_with(template, &mut names, grid)
}

fn instantiate_with(template: &Input, names: &mut NameAllocator, grid: GridDefaults) -> Input {
    let mut input = template.clone();
    input.set_id(InputId::random());
    input.set_name(names.allocate(template.label()));

    match &mut input {
        Input::Field(field) => {
            if field.grid_size.is_none() {
                field.grid_size = Some(grid.for_kind(&field.kind));
            }
            if field.kind.has_options() && field.options.as_ref().is_none_or(Vec::is_empty) {
                field.options = Some(vec![FieldOption::new(SEED_OPTION_LABEL)]);
            }
            if field.required {
                field.quick = true;
            }
        }
        Input::SubSection(sub) => {
            if sub.show_add_button {
                sub.save_and_add_more = false;
            }
            let children = std::mem::take(&mut sub.inputs);
            for child in &children {
                sub.inputs.push(Arc::new(instantiate_with(child, names, grid)));
            }
        }
    }
    input
}
