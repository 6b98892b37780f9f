use std::hash::{Hash as _, Hasher as _};

use itertools::Itertools as _;

use crate::document::{Document, Input};

/// Every broken document invariant, one human readable line each. Empty means healthy.
pub fn document_integrity_issues(document: &Document) -> Vec<String> {
    let mut issues: Vec<String> = Vec::new();

    for id in document.sections().iter().map(|s| &s.id).duplicates() {
        issues.push(format!("integrity: duplicate section id {id}"));
    }

    let mut ids = Vec::new();
    let mut names: Vec<String> = Vec::new();
    document.for_each_input(|path, input| {
        ids.push(input.id().clone());
        names.push(input.name().to_owned());

        if input.name().is_empty() {
            issues.push(format!("integrity: input {} in {path} has an empty name", input.id()));
        }

        match input.as_ref() {
            Input::Field(field) => {
                if field.required && !field.quick {
                    issues.push(format!(
                        "integrity: field {} in {path} is required but not quick",
                        field.id
                    ));
                }
            }
            Input::SubSection(sub) => {
                if sub.show_add_button && sub.save_and_add_more {
                    issues.push(format!(
                        "integrity: sub-section {} in {path} has both showAddButton and saveAndAddMore",
                        sub.id
                    ));
                }
            }
        }
    });

    for id in ids.iter().duplicates() {
        issues.push(format!("integrity: duplicate input id {id}"));
    }
    for name in names.iter().filter(|n| !n.is_empty()).duplicates() {
        issues.push(format!("integrity: duplicate name {name:?}"));
    }

    issues
}

pub(crate) fn hash_issues(lines: &[String]) -> u64 {
    let mut hasher = ahash::AHasher::default();
    for line in lines {
        line.hash(&mut hasher);
    }
    hasher.finish()
}
