use std::sync::Arc;

use super::{InputId, Inputs};

/// The value type of a [`Field`] (the `type` key of the payload).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Email,
    Phone,
    Date,
    Datetime,
    Checkbox,
    Select,
    Multiselect,
    Radio,
    Lookup,
    File,

    /// A host-defined type this crate has no special handling for.
    #[cfg_attr(feature = "serde", serde(untagged))]
    Custom(String),
}

impl FieldKind {
    /// Kinds whose options list is seeded with one default entry on insertion.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Multiselect | Self::Radio)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct FieldOption {
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: String,
}

impl FieldOption {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            value: label.clone(),
            label,
        }
    }
}

/// Lookup dependency: the field whose value filters this field's lookup results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Dependency {
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub field: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub filter: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub enum ConditionOperator {
    #[default]
    Equals,
    NotEquals,
    Includes,
    IsEmpty,
    IsNotEmpty,
}

/// Makes an input's visibility depend on another field's value.
///
/// `field` is the *name* of the controlling field. The editing engine never interprets this;
/// see [`crate::conditional`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ConditionalDisplay {
    pub field: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub operator: ConditionOperator,
    #[cfg_attr(feature = "serde", serde(default))]
    pub values: Vec<String>,
}

/// Payload keys this crate does not model (`min`/`max` of numbers, `lookupModel`, ...),
/// carried through load and save untouched.
#[cfg(feature = "serde")]
pub type ExtraProps = std::collections::BTreeMap<String, serde_json::Value>;

/// A leaf form element.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Field {
    pub id: InputId,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: FieldKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,

    /// Width in grid columns. `None` until the field is placed; see
    /// [`crate::palette::GridDefaults`].
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub grid_size: Option<u8>,

    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,

    /// Shown in the quick-create form. Always `true` while `required` is.
    #[cfg_attr(feature = "serde", serde(default))]
    pub quick: bool,

    #[cfg_attr(feature = "serde", serde(default = "default_true"))]
    pub is_viewable: bool,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub placeholder: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub help_text: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub options: Option<Vec<FieldOption>>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub dependency: Dependency,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub conditional_display: Option<ConditionalDisplay>,

    /// Type-specific props.
    #[cfg(feature = "serde")]
    #[serde(flatten)]
    pub extra: ExtraProps,
}

#[cfg(feature = "serde")]
fn default_true() -> bool {
    true
}

impl Field {
    pub fn new(id: impl Into<InputId>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            name: String::new(),
            grid_size: None,
            required: false,
            quick: false,
            is_viewable: true,
            placeholder: None,
            help_text: None,
            options: None,
            dependency: Dependency::default(),
            conditional_display: None,
            #[cfg(feature = "serde")]
            extra: ExtraProps::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self.quick = true;
        self
    }
}

/// The `type` value that marks a sub-section in the payload.
pub const SUB_SECTION_TYPE: &str = "SubSection";

/// Marker for the `"type": "SubSection"` tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
enum SubSectionTag {
    #[default]
    SubSection,
}

/// A nestable grouping container that is itself an input.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct SubSection {
    pub id: InputId,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    tag: SubSectionTag,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub inputs: Inputs,

    /// Mutually exclusive with `save_and_add_more`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub show_add_button: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub save_and_add_more: bool,

    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub conditional_display: Option<ConditionalDisplay>,

    #[cfg(feature = "serde")]
    #[serde(flatten)]
    pub extra: ExtraProps,
}

impl SubSection {
    pub fn new(id: impl Into<InputId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: SubSectionTag::SubSection,
            label: label.into(),
            name: String::new(),
            inputs: Inputs::new(),
            show_add_button: false,
            save_and_add_more: false,
            conditional_display: None,
            #[cfg(feature = "serde")]
            extra: ExtraProps::new(),
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: impl Into<Input>) -> Self {
        self.inputs.push(Arc::new(input.into()));
        self
    }
}

/// A field or a sub-section.
///
/// Decoding picks the variant from the `type` key: [`SUB_SECTION_TYPE`] is a sub-section,
/// anything else a field. A malformed sub-section is an error, never a field.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum Input {
    SubSection(SubSection),
    Field(Field),
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Input {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let value = serde_json::Value::deserialize(deserializer)?;
        let kind = value.get("type").and_then(serde_json::Value::as_str);
        if kind == Some(SUB_SECTION_TYPE) {
            SubSection::deserialize(value)
                .map(Self::SubSection)
                .map_err(D::Error::custom)
        } else {
            Field::deserialize(value).map(Self::Field).map_err(D::Error::custom)
        }
    }
}

impl Input {
    pub fn id(&self) -> &InputId {
        match self {
            Self::SubSection(sub) => &sub.id,
            Self::Field(field) => &field.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::SubSection(sub) => &sub.label,
            Self::Field(field) => &field.label,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::SubSection(sub) => &sub.name,
            Self::Field(field) => &field.name,
        }
    }

    pub(crate) fn set_id(&mut self, id: InputId) {
        match self {
            Self::SubSection(sub) => sub.id = id,
            Self::Field(field) => field.id = id,
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        match self {
            Self::SubSection(sub) => sub.name = name,
            Self::Field(field) => field.name = name,
        }
    }

    pub fn conditional_display(&self) -> Option<&ConditionalDisplay> {
        match self {
            Self::SubSection(sub) => sub.conditional_display.as_ref(),
            Self::Field(field) => field.conditional_display.as_ref(),
        }
    }

    pub fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(field) => Some(field),
            Self::SubSection(_) => None,
        }
    }

    pub fn as_sub_section(&self) -> Option<&SubSection> {
        match self {
            Self::SubSection(sub) => Some(sub),
            Self::Field(_) => None,
        }
    }

    pub fn is_sub_section(&self) -> bool {
        matches!(self, Self::SubSection(_))
    }

    /// Number of inputs below this one (0 for fields).
    pub fn descendant_count(&self) -> usize {
        match self {
            Self::Field(_) => 0,
            Self::SubSection(sub) => sub
                .inputs
                .iter()
                .map(|child| 1 + child.descendant_count())
                .sum(),
        }
    }
}

impl From<Field> for Input {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<SubSection> for Input {
    fn from(sub: SubSection) -> Self {
        Self::SubSection(sub)
    }
}
