use std::sync::Arc;

use super::{Input, InputId};

/// An insertion-ordered `id → input` map. Order is display order.
///
/// Entries are shared (`Arc`), so cloning an `Inputs` is shallow: only the spine is copied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inputs {
    entries: Vec<Arc<Input>>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<Input>> {
        self.entries.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &InputId> + '_ {
        self.entries.iter().map(|input| input.id())
    }

    pub fn get(&self, id: &InputId) -> Option<&Arc<Input>> {
        self.entries.iter().find(|input| input.id() == id)
    }

    pub fn position(&self, id: &InputId) -> Option<usize> {
        self.entries.iter().position(|input| input.id() == id)
    }

    pub fn contains(&self, id: &InputId) -> bool {
        self.position(id).is_some()
    }

    /// Append, or replace in place if the id is already present (ordered-map semantics).
    pub(crate) fn push(&mut self, input: Arc<Input>) {
        if !self.replace(Arc::clone(&input)) {
            self.entries.push(input);
        }
    }

    /// Insert at `index` (clamped to the end). The id must not be present yet.
    pub(crate) fn insert(&mut self, index: usize, input: Arc<Input>) -> bool {
        if self.contains(input.id()) {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, input);
        true
    }

    pub(crate) fn replace(&mut self, input: Arc<Input>) -> bool {
        match self.position(input.id()) {
            Some(index) => {
                self.entries[index] = input;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &InputId) -> Option<Arc<Input>> {
        let index = self.position(id)?;
        Some(self.entries.remove(index))
    }

    /// Reorder to `order`, which must be a permutation of the current ids.
    pub(crate) fn reorder(&mut self, order: &[InputId]) -> bool {
        if order.len() != self.entries.len() {
            return false;
        }
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let Some(input) = self.get(id) else {
                return false;
            };
            if reordered.iter().any(|taken: &Arc<Input>| taken.id() == id) {
                return false;
            }
            reordered.push(Arc::clone(input));
        }
        self.entries = reordered;
        true
    }
}

impl<'a> IntoIterator for &'a Inputs {
    type Item = &'a Arc<Input>;
    type IntoIter = std::slice::Iter<'a, Arc<Input>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Input> for Inputs {
    fn from_iter<I: IntoIterator<Item = Input>>(iter: I) -> Self {
        let mut inputs = Self::new();
        for input in iter {
            inputs.push(Arc::new(input));
        }
        inputs
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Inputs {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap as _;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for input in &self.entries {
            map.serialize_entry(input.id(), input.as_ref())?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Inputs {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct InputsVisitor;

        impl<'de> serde::de::Visitor<'de> for InputsVisitor {
            type Value = Inputs;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of input id to input")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut map: A,
            ) -> Result<Self::Value, A::Error> {
                let mut inputs = Inputs::new();
                while let Some((key, input)) = map.next_entry::<InputId, Input>()? {
                    if &key != input.id() {
                        return Err(serde::de::Error::custom(format!(
                            "input keyed {key} carries id {}",
                            input.id()
                        )));
                    }
                    if !inputs.insert(usize::MAX, Arc::new(input)) {
                        return Err(serde::de::Error::custom(format!("duplicate input id {key}")));
                    }
                }
                Ok(inputs)
            }
        }

        deserializer.deserialize_map(InputsVisitor)
    }
}
