//! Document-wide unique names for fields and sub-sections, derived from their labels.

use ahash::HashSet;

use crate::document::{Document, InputId};

/// Base used for an empty label when the caller needs the result to be reproducible.
pub const FALLBACK_NAME_BASE: &str = "field";

/// `"First name (legal)"` → `"firstNameLegal"`.
///
/// Non-alphanumeric characters are dropped, the remaining words are joined with the first one
/// lower-cased and every following one title-cased.
pub fn camel_case(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    for (i, word) in cleaned.split_whitespace().enumerate() {
        if i == 0 {
            out.extend(word.chars().flat_map(char::to_lowercase));
            continue;
        }
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

/// The set of names already in use, scanned once from a document.
///
/// Names handed out by [`Self::allocate`] are reserved, so several inputs created in one go
/// (e.g. a sub-section template and its children) never collide with each other either.
#[derive(Clone, Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Every name in `document` (all sections, every depth) counts as taken, except the one
    /// carried by `exclude`, the input being renamed.
    pub fn for_document(document: &Document, exclude: Option<&InputId>) -> Self {
        let mut taken = HashSet::default();
        document.for_each_input(|_, input| {
            if Some(input.id()) != exclude && !input.name().is_empty() {
                taken.insert(input.name().to_owned());
            }
        });
        Self { taken }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Mark `name` as used.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// A free name for `label`; an empty label gets a random placeholder.
    pub fn allocate(&mut self, label: &str) -> String {
        let base = camel_case(label);
        let base = if base.is_empty() {
            random_placeholder()
        } else {
            base
        };
        self.claim_first_free(&base)
    }

    /// A free name for `label`; an empty label falls back to `fallback`, so the result only
    /// depends on what was taken before.
    pub fn allocate_deterministic(&mut self, label: &str, fallback: &str) -> String {
        let base = [label, fallback]
            .into_iter()
            .map(camel_case)
            .find(|base| !base.is_empty())
            .unwrap_or_else(|| FALLBACK_NAME_BASE.to_owned());
        self.claim_first_free(&base)
    }

    /// `base`, or `base1`, `base2`, … – the first one not taken. Reserves it.
    fn claim_first_free(&mut self, base: &str) -> String {
        let name = if self.taken.contains(base) {
            (1..)
                .map(|n: u64| format!("{base}{n}"))
                .find(|candidate| !self.taken.contains(candidate))
                .unwrap_or_else(|| base.to_owned())
        } else {
            base.to_owned()
        };
        self.taken.insert(name.clone());
        name
    }
}

/// A name for `label` that no other input of `document` carries.
///
/// `exclude` is the input being renamed: its current name does not count as taken.
/// An empty (or all-punctuation) label gets a random placeholder.
pub fn allocate(label: &str, document: &Document, exclude: Option<&InputId>) -> String {
    NameAllocator::for_document(document, exclude).allocate(label)
}

fn random_placeholder() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{FALLBACK_NAME_BASE}{}", &suffix[..8])
}
