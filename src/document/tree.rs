//! Copy-on-write edits of a [`Document`].
//!
//! Every operation returns a new document, or `None` when something it references is missing.
//! Only the sections and sub-sections on the path to the edited container are rebuilt; all
//! other `Arc`s are shared with the input document.

use std::sync::Arc;

use super::{ContainerPath, Document, Input, InputId, Inputs, Section, SectionId};

/// Rebuild `inputs` with `edit` applied to the container at the end of `chain`.
fn update_inputs<F>(inputs: &Inputs, chain: &[InputId], edit: F) -> Option<Inputs>
where
    F: FnOnce(&mut Inputs) -> bool,
{
    let Some((head, rest)) = chain.split_first() else {
        let mut next = inputs.clone();
        return edit(&mut next).then_some(next);
    };

    let Input::SubSection(sub) = inputs.get(head)?.as_ref() else {
        return None;
    };
    let child_inputs = update_inputs(&sub.inputs, rest, edit)?;

    let mut sub = sub.clone();
    sub.inputs = child_inputs;
    let mut next = inputs.clone();
    next.replace(Arc::new(Input::SubSection(sub)));
    Some(next)
}

fn find_in(path: &ContainerPath, inputs: &Inputs, id: &InputId) -> Option<ContainerPath> {
    if inputs.contains(id) {
        return Some(path.clone());
    }
    inputs.iter().find_map(|input| match input.as_ref() {
        Input::SubSection(sub) => find_in(&path.child(sub.id.clone()), &sub.inputs, id),
        Input::Field(_) => None,
    })
}

impl Document {
    /// The path of the container directly holding `id`.
    pub fn container_path_of(&self, id: &InputId) -> Option<ContainerPath> {
        self.sections.iter().find_map(|section| {
            find_in(&ContainerPath::section(section.id.clone()), &section.inputs, id)
        })
    }

    pub fn container(&self, path: &ContainerPath) -> Option<&Inputs> {
        let mut inputs = &self.section(path.section_id())?.inputs;
        for sub_id in path.sub_sections() {
            let Input::SubSection(sub) = inputs.get(sub_id)?.as_ref() else {
                return None;
            };
            inputs = &sub.inputs;
        }
        Some(inputs)
    }

    /// Find an input anywhere in the document.
    pub fn input(&self, id: &InputId) -> Option<(ContainerPath, &Arc<Input>)> {
        let path = self.container_path_of(id)?;
        let input = self.container(&path)?.get(id)?;
        Some((path, input))
    }

    pub fn contains_input(&self, id: &InputId) -> bool {
        self.container_path_of(id).is_some()
    }

    fn with_container_edited<F>(&self, path: &ContainerPath, edit: F) -> Option<Self>
    where
        F: FnOnce(&mut Inputs) -> bool,
    {
        let index = self
            .sections
            .iter()
            .position(|s| s.id == *path.section_id())?;
        let section = &self.sections[index];
        let inputs = update_inputs(&section.inputs, path.sub_sections(), edit)?;

        let mut section = Section::clone(section);
        section.inputs = inputs;
        let mut next = self.clone();
        next.sections[index] = Arc::new(section);
        Some(next)
    }

    /// Insert `input` into the container at `path`, at `index` or at the end.
    ///
    /// Fails if the id already exists anywhere in the document.
    pub fn with_input_at(
        &self,
        path: &ContainerPath,
        index: Option<usize>,
        input: impl Into<Arc<Input>>,
    ) -> Option<Self> {
        let input = input.into();
        if self.contains_input(input.id()) {
            return None;
        }
        self.with_container_edited(path, |inputs| {
            inputs.insert(index.unwrap_or(usize::MAX), input)
        })
    }

    /// Replace the input with the same id in the container at `path`, keeping its position.
    pub fn with_input_replaced(&self, path: &ContainerPath, input: impl Into<Arc<Input>>) -> Option<Self> {
        let input = input.into();
        self.with_container_edited(path, |inputs| inputs.replace(input))
    }

    /// Remove `id` (and, for a sub-section, everything beneath it) from the container at `path`.
    pub fn without_input_at(&self, path: &ContainerPath, id: &InputId) -> Option<(Self, Arc<Input>)> {
        let mut removed = None;
        let next = self.with_container_edited(path, |inputs| {
            removed = inputs.remove(id);
            removed.is_some()
        })?;
        Some((next, removed?))
    }

    /// Reorder the container at `path` to `order`, a permutation of its current ids.
    pub fn with_reordered_siblings(&self, path: &ContainerPath, order: &[InputId]) -> Option<Self> {
        self.with_container_edited(path, |inputs| inputs.reorder(order))
    }

    // ------------------------------------------------------------------------
    // Sections

    pub fn with_section_added(&self, section: Section, index: Option<usize>) -> Option<Self> {
        if self.section(&section.id).is_some() {
            return None;
        }
        let mut next = self.clone();
        let index = index.unwrap_or(usize::MAX).min(next.sections.len());
        next.sections.insert(index, Arc::new(section));
        Some(next)
    }

    pub fn without_section(&self, id: &SectionId) -> Option<(Self, Arc<Section>)> {
        let index = self.sections.iter().position(|s| &s.id == id)?;
        let mut next = self.clone();
        let removed = next.sections.remove(index);
        Some((next, removed))
    }

    pub fn with_section_moved(&self, id: &SectionId, to_index: usize) -> Option<Self> {
        let from = self.sections.iter().position(|s| &s.id == id)?;
        let mut next = self.clone();
        let section = next.sections.remove(from);
        let to_index = to_index.min(next.sections.len());
        next.sections.insert(to_index, section);
        Some(next)
    }

    pub fn with_section_retitled(&self, id: &SectionId, title: impl Into<String>) -> Option<Self> {
        let index = self.sections.iter().position(|s| &s.id == id)?;
        let mut section = Section::clone(&self.sections[index]);
        section.title = title.into();
        let mut next = self.clone();
        next.sections[index] = Arc::new(section);
        Some(next)
    }
}
