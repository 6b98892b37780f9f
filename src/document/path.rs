use super::{InputId, SectionId};

/// Address of a container: a section, optionally followed by the chain of nested sub-sections
/// (outermost first) leading to the container itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ContainerPath {
    section: SectionId,
    sub_sections: Vec<InputId>,
}

impl ContainerPath {
    pub fn section(section: impl Into<SectionId>) -> Self {
        Self {
            section: section.into(),
            sub_sections: Vec::new(),
        }
    }

    pub fn new(section: impl Into<SectionId>, sub_sections: impl IntoIterator<Item = InputId>) -> Self {
        Self {
            section: section.into(),
            sub_sections: sub_sections.into_iter().collect(),
        }
    }

    /// The path of the sub-section `id` nested directly in this container.
    #[must_use]
    pub fn child(&self, id: impl Into<InputId>) -> Self {
        let mut sub_sections = self.sub_sections.clone();
        sub_sections.push(id.into());
        Self {
            section: self.section.clone(),
            sub_sections,
        }
    }

    /// The enclosing container, or `None` for a section.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.sub_sections.split_last()?;
        Some(Self {
            section: self.section.clone(),
            sub_sections: rest.to_vec(),
        })
    }

    pub fn section_id(&self) -> &SectionId {
        &self.section
    }

    /// The chain of sub-sections from the section down to this container.
    pub fn sub_sections(&self) -> &[InputId] {
        &self.sub_sections
    }

    /// The innermost sub-section, i.e. the container itself unless it is a section.
    pub fn sub_section(&self) -> Option<&InputId> {
        self.sub_sections.last()
    }

    /// The sub-section enclosing [`Self::sub_section`], if any.
    pub fn parent_sub_section(&self) -> Option<&InputId> {
        let len = self.sub_sections.len();
        (len >= 2).then(|| &self.sub_sections[len - 2])
    }

    /// 0 for a section, 1 for a sub-section in a section, …
    pub fn depth(&self) -> usize {
        self.sub_sections.len()
    }

    pub fn is_section(&self) -> bool {
        self.sub_sections.is_empty()
    }

    /// Does the container at this path live inside (or is it) the sub-section `id`?
    pub fn passes_through(&self, id: &InputId) -> bool {
        self.sub_sections.contains(id)
    }

    /// `self` strictly encloses `other`.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.section == other.section
            && self.sub_sections.len() < other.sub_sections.len()
            && other.sub_sections.starts_with(&self.sub_sections)
    }
}

impl std::fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.section)?;
        for sub in &self.sub_sections {
            write!(f, "/{sub}")?;
        }
        Ok(())
    }
}
