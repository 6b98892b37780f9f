//! Conditional display: whether an input is shown given the current values of other fields.
//!
//! The editor only stores [`ConditionalDisplay`] descriptors (they travel with their input
//! through every move); this module evaluates them against a flat `name → value` map and
//! lists the fields an input may depend on.

use std::collections::BTreeMap;

use itertools::Itertools as _;

use crate::document::{ConditionOperator, ConditionalDisplay, Document, Field, Input, InputId, Inputs};

/// The current value of a field, as seen by the visibility check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    /// Normalized string values; empty strings do not count.
    fn strings(&self) -> Vec<&str> {
        match self {
            Self::Empty => Vec::new(),
            Self::Text(text) => Some(text.as_str()).filter(|t| !t.is_empty()).into_iter().collect(),
            Self::Bool(true) => vec!["true"],
            Self::Bool(false) => vec!["false"],
            Self::List(items) => items.iter().map(String::as_str).filter(|t| !t.is_empty()).collect(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Is an input with `display` visible given `values` (field name → current value)?
///
/// No descriptor means always visible. A controlling field missing from `values` counts as
/// empty.
pub fn is_visible(display: Option<&ConditionalDisplay>, values: &BTreeMap<String, FieldValue>) -> bool {
    let Some(display) = display else {
        return true;
    };
    let current = values.get(&display.field).map(FieldValue::strings).unwrap_or_default();
    let expected = || display.values.iter().map(String::as_str);

    match display.operator {
        ConditionOperator::Equals => same_set(&current, expected()),
        ConditionOperator::NotEquals => !same_set(&current, expected()),
        ConditionOperator::Includes => expected().any(|v| current.contains(&v)),
        ConditionOperator::IsEmpty => current.is_empty(),
        ConditionOperator::IsNotEmpty => !current.is_empty(),
    }
}

fn same_set<'a>(current: &[&'a str], expected: impl Iterator<Item = &'a str>) -> bool {
    let current: Vec<&str> = current.iter().copied().sorted().dedup().collect();
    let expected: Vec<&str> = expected.filter(|v| !v.is_empty()).sorted().dedup().collect();
    current == expected
}

/// Fields that `input` may make its visibility depend on, in display order.
///
/// That is every field in the document except `input` itself and, for a sub-section,
/// everything inside it.
pub fn parent_field_candidates<'a>(document: &'a Document, input: &InputId) -> Vec<&'a Field> {
    fn walk<'a>(inputs: &'a Inputs, exclude: &InputId, out: &mut Vec<&'a Field>) {
        for child in inputs {
            if child.id() == exclude {
                continue;
            }
            match child.as_ref() {
                Input::Field(field) => out.push(field),
                Input::SubSection(sub) => walk(&sub.inputs, exclude, out),
            }
        }
    }

    let mut out = Vec::new();
    for section in document.sections() {
        walk(&section.inputs, input, &mut out);
    }
    out
}

/// Ids of every input of `document` that is visible with `values`, in display order.
///
/// A sub-section that is hidden hides everything inside it.
pub fn visible_inputs(document: &Document, values: &BTreeMap<String, FieldValue>) -> Vec<InputId> {
    fn walk(inputs: &Inputs, values: &BTreeMap<String, FieldValue>, out: &mut Vec<InputId>) {
        for child in inputs {
            if !is_visible(child.conditional_display(), values) {
                continue;
            }
            out.push(child.id().clone());
            if let Input::SubSection(sub) = child.as_ref() {
                walk(&sub.inputs, values, out);
            }
        }
    }

    let mut out = Vec::new();
    for section in document.sections() {
        walk(&section.inputs, values, &mut out);
    }
    out
}
