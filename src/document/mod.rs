//! The form document: sections holding ordered, arbitrarily nested inputs.
//!
//! Every value here is immutable once shared. Edits go through the copy-on-write operations in
//! [`tree`], which clone the path from the root down to the edited container and reuse every
//! untouched branch (`Arc` pointer-identical).

use std::sync::Arc;

mod input;
mod inputs;
mod path;
mod tree;

#[cfg(feature = "serde")]
pub use input::ExtraProps;
pub use input::{
    ConditionOperator, ConditionalDisplay, Dependency, Field, FieldKind, FieldOption, Input,
    SUB_SECTION_TYPE, SubSection,
};
pub use inputs::Inputs;
pub use path::ContainerPath;

/// Identifies a [`Section`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(transparent))]
pub struct SectionId(String);

/// Identifies an [`Input`] (field or sub-section). Unique across the whole document.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(transparent))]
pub struct InputId(String);

macro_rules! string_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// A fresh random (v4 UUID based) id.
            pub fn random() -> Self {
                Self(format!("{}{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $ty {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<String> for $ty {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(SectionId, "section_");
string_id!(InputId, "input_");

/// A top-level container of the form.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Section {
    pub id: SectionId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inputs: Inputs,
    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub can_remove: bool,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Section {
    pub fn new(id: impl Into<SectionId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            inputs: Inputs::new(),
            can_remove: true,
        }
    }

    #[must_use]
    pub fn with_input(mut self, input: impl Into<Input>) -> Self {
        self.inputs.push(Arc::new(input.into()));
        self
    }

    #[must_use]
    pub fn removable(mut self, can_remove: bool) -> Self {
        self.can_remove = can_remove;
        self
    }
}

/// The whole form: an ordered sequence of sections (print order).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Document {
    #[cfg_attr(feature = "serde", serde(default))]
    sections: Vec<Arc<Section>>,
}

impl Document {
    pub fn new(sections: impl IntoIterator<Item = Section>) -> Self {
        Self {
            sections: sections.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn sections(&self) -> &[Arc<Section>] {
        &self.sections
    }

    pub fn section(&self, id: &SectionId) -> Option<&Arc<Section>> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.inputs.is_empty())
    }

    /// Depth-first visit of every input, in display order, with the path of its container.
    pub fn for_each_input(&self, mut visit: impl FnMut(&ContainerPath, &Arc<Input>)) {
        fn walk(
            path: &ContainerPath,
            inputs: &Inputs,
            visit: &mut dyn FnMut(&ContainerPath, &Arc<Input>),
        ) {
            for input in inputs.iter() {
                visit(path, input);
                if let Input::SubSection(sub) = input.as_ref() {
                    walk(&path.child(sub.id.clone()), &sub.inputs, visit);
                }
            }
        }

        for section in &self.sections {
            walk(&ContainerPath::section(section.id.clone()), &section.inputs, &mut visit);
        }
    }

    /// Total number of inputs at every depth.
    pub fn input_count(&self) -> usize {
        let mut count = 0;
        self.for_each_input(|_, _| count += 1);
        count
    }
}
