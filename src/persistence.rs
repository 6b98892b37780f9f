//! The load/save boundary of a form.
//!
//! Loading normalizes whatever the backend stored into a document that satisfies every editor
//! invariant; saving fixes up duplicate field labels. With the `persistence` feature the JSON
//! encoding itself is provided too.

use std::sync::Arc;

use ahash::HashSet;

use crate::document::{Document, Input, InputId, Inputs, Section, SectionId};
use crate::naming::NameAllocator;

/// Name base for sub-sections with an empty label.
pub const SUB_SECTION_FALLBACK_LABEL: &str = "Sub Section";

struct Normalizer {
    names: NameAllocator,
    seen_names: HashSet<String>,
    seen_ids: HashSet<InputId>,
}

impl Normalizer {
    fn inputs(&mut self, inputs: &Inputs) -> Inputs {
        let mut out = Inputs::new();
        for input in inputs {
            out.push(Arc::new(self.input(input)));
        }
        out
    }

    fn input(&mut self, input: &Input) -> Input {
        let mut input = input.clone();

        if !self.seen_ids.insert(input.id().clone()) {
            let fresh = InputId::random();
            log::debug!("load: duplicate input id {} replaced by {fresh}", input.id());
            self.seen_ids.insert(fresh.clone());
            input.set_id(fresh);
        }

        let name = input.name().to_owned();
        if name.is_empty() || !self.seen_names.insert(name.clone()) {
            let fallback = if input.is_sub_section() {
                SUB_SECTION_FALLBACK_LABEL
            } else {
                crate::naming::FALLBACK_NAME_BASE
            };
            let fresh = self.names.allocate_deterministic(input.label(), fallback);
            log::debug!("load: input {} name {name:?} reallocated to {fresh:?}", input.id());
            self.seen_names.insert(fresh.clone());
            input.set_name(fresh);
        }

        match &mut input {
            Input::Field(field) => {
                if field.required {
                    field.quick = true;
                }
            }
            Input::SubSection(sub) => {
                if sub.show_add_button {
                    sub.save_and_add_more = false;
                }
                sub.inputs = self.inputs(&sub.inputs);
            }
        }
        input
    }
}

/// Bring a loaded document in line with the editor invariants.
///
/// Every input ends up with a non-empty name unique in the document (the first holder of a
/// name keeps it; the others, and unnamed inputs, get one derived from their label), required
/// fields are quick, and `save_and_add_more` is dropped where `show_add_button` is set.
/// Duplicate section or input ids get fresh ones. The result only depends on the input
/// document, apart from those fresh ids.
pub fn normalize_loaded(document: Document) -> Document {
    let mut names = NameAllocator::default();
    document.for_each_input(|_, input| {
        if !input.name().is_empty() {
            names.reserve(input.name());
        }
    });

    let mut normalizer = Normalizer {
        names,
        seen_names: HashSet::default(),
        seen_ids: HashSet::default(),
    };
    let mut section_ids: HashSet<SectionId> = HashSet::default();

    let sections: Vec<Section> = document
        .sections()
        .iter()
        .map(|section| {
            let mut section = Section::clone(section);
            if !section_ids.insert(section.id.clone()) {
                section.id = SectionId::random();
                section_ids.insert(section.id.clone());
            }
            section.inputs = normalizer.inputs(&section.inputs);
            section
        })
        .collect();

    Document::new(sections)
}

/// The document as it should be sent to the backend.
///
/// Field labels must be unique when saved: the second and later fields carrying a label get
/// `" 1"`, `" 2"`, … appended (the first free one).
pub fn prepare_for_save(document: &Document) -> Document {
    fn fix_labels(inputs: &Inputs, labels: &mut HashSet<String>, seen: &mut HashSet<String>) -> Inputs {
        let mut out = Inputs::new();
        for input in inputs {
            let fixed = match input.as_ref() {
                Input::Field(field) if !seen.insert(field.label.clone()) => {
                    let mut field = field.clone();
                    let label = (1..)
                        .map(|n: u64| format!("{} {n}", field.label))
                        .find(|candidate| !labels.contains(candidate))
                        .unwrap_or_else(|| field.label.clone());
                    labels.insert(label.clone());
                    seen.insert(label.clone());
                    field.label = label;
                    Arc::new(Input::Field(field))
                }
                Input::Field(_) => Arc::clone(input),
                Input::SubSection(sub) => {
                    let children = fix_labels(&sub.inputs, labels, seen);
                    if children == sub.inputs {
                        Arc::clone(input)
                    } else {
                        let mut sub = sub.clone();
                        sub.inputs = children;
                        Arc::new(Input::SubSection(sub))
                    }
                }
            };
            out.push(fixed);
        }
        out
    }

    let mut labels: HashSet<String> = HashSet::default();
    document.for_each_input(|_, input| {
        if let Input::Field(field) = input.as_ref() {
            labels.insert(field.label.clone());
        }
    });

    let mut seen = HashSet::default();
    let sections: Vec<Section> = document
        .sections()
        .iter()
        .map(|section| {
            let mut section = Section::clone(section);
            section.inputs = fix_labels(&section.inputs, &mut labels, &mut seen);
            section
        })
        .collect();
    Document::new(sections)
}

#[cfg(feature = "persistence")]
pub use json::{FormPersistenceError, load_json, load_json_file, save_json, save_json_file};

#[cfg(feature = "persistence")]
mod json {
    use std::path::Path;

    use crate::document::Document;

    #[derive(Debug)]
    pub enum FormPersistenceError {
        Json(serde_json::Error),
        Io(std::io::Error),
    }

    impl std::fmt::Display for FormPersistenceError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::Json(err) => write!(f, "json error: {err}"),
                Self::Io(err) => write!(f, "io error: {err}"),
            }
        }
    }

    impl std::error::Error for FormPersistenceError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                Self::Json(err) => Some(err),
                Self::Io(err) => Some(err),
            }
        }
    }

    impl From<serde_json::Error> for FormPersistenceError {
        fn from(err: serde_json::Error) -> Self {
            Self::Json(err)
        }
    }

    impl From<std::io::Error> for FormPersistenceError {
        fn from(err: std::io::Error) -> Self {
            Self::Io(err)
        }
    }

    /// Decode and normalize a stored form.
    ///
    /// # Errors
    /// If `json` is not a valid form payload.
    pub fn load_json(json: &str) -> Result<Document, FormPersistenceError> {
        let document: Document = serde_json::from_str(json)?;
        Ok(super::normalize_loaded(document))
    }

    /// Encode `document` for saving, after [`super::prepare_for_save`].
    ///
    /// # Errors
    /// If serialization fails.
    pub fn save_json(document: &Document) -> Result<String, FormPersistenceError> {
        Ok(serde_json::to_string_pretty(&super::prepare_for_save(document))?)
    }

    /// # Errors
    /// On I/O or decoding failure.
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Document, FormPersistenceError> {
        let text = std::fs::read_to_string(path)?;
        load_json(&text)
    }

    /// # Errors
    /// On I/O or encoding failure.
    pub fn save_json_file(path: impl AsRef<Path>, document: &Document) -> Result<(), FormPersistenceError> {
        let text = save_json(document)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
