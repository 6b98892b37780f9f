use crate::conditional;
use crate::document::{ConditionalDisplay, Input, InputId};
use crate::naming::NameAllocator;

use super::{EditorError, FormEditor};

impl FormEditor {
    /// Edit the properties of `id` in place.
    ///
    /// The id and (for sub-sections) the children are kept no matter what `edit` does. A
    /// changed label gets a freshly allocated name, a name already in use is made unique,
    /// `required` forces `quick`, and a sub-section may not end up with both
    /// `show_add_button` and `save_and_add_more`.
    ///
    /// # Errors
    ///
    /// [`EditorError::InputNotFound`] for an unknown id; [`EditorError::ConstraintViolation`]
    /// when the edit leaves both exclusive sub-section flags on.
    pub fn update_input(&mut self, id: &InputId, edit: impl FnOnce(&mut Input)) -> Result<(), EditorError> {
        let (path, current) = self
            .document
            .input(id)
            .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;

        let mut next = current.as_ref().clone();
        edit(&mut next);
        next.set_id(id.clone());

        match (&mut next, current.as_ref()) {
            (Input::Field(field), Input::Field(_)) => {
                if field.required {
                    field.quick = true;
                }
            }
            (Input::SubSection(sub), Input::SubSection(old)) => {
                sub.inputs = old.inputs.clone();
                if sub.show_add_button && sub.save_and_add_more {
                    return Err(EditorError::ConstraintViolation(
                        "showAddButton and saveAndAddMore are mutually exclusive",
                    ));
                }
            }
            _ => {
                return Err(EditorError::ConstraintViolation(
                    "an input cannot change between field and sub-section",
                ));
            }
        }

        let mut names = NameAllocator::for_document(&self.document, Some(id));
        if next.label() != current.label() {
            let name = names.allocate(next.label());
            next.set_name(name);
        } else if next.name().is_empty() || names.is_taken(next.name()) {
            let wanted = if next.name().is_empty() {
                next.label().to_owned()
            } else {
                next.name().to_owned()
            };
            let name = names.allocate(&wanted);
            next.set_name(name);
        }

        if next == **current {
            return Ok(());
        }

        let document = self
            .document
            .with_input_replaced(&path, next)
            .ok_or_else(|| EditorError::ContainerNotFound(path.clone()))?;
        self.commit(document, &format!("update {id}"));
        Ok(())
    }

    /// # Errors
    ///
    /// [`EditorError::InputNotFound`] for an unknown id.
    pub fn set_label(&mut self, id: &InputId, label: impl Into<String>) -> Result<(), EditorError> {
        let label = label.into();
        self.update_input(id, |input| match input {
            Input::Field(field) => field.label = label,
            Input::SubSection(sub) => sub.label = label,
        })
    }

    /// Making a field required also makes it quick.
    ///
    /// # Errors
    ///
    /// Fails for unknown ids and for sub-sections.
    pub fn set_required(&mut self, id: &InputId, required: bool) -> Result<(), EditorError> {
        self.field_only(id)?;
        self.update_input(id, |input| {
            if let Input::Field(field) = input {
                field.required = required;
            }
        })
    }

    /// A required field is always quick, so clearing `quick` on one is refused.
    ///
    /// # Errors
    ///
    /// Fails for unknown ids, sub-sections, and clearing `quick` on a required field.
    pub fn set_quick(&mut self, id: &InputId, quick: bool) -> Result<(), EditorError> {
        let field = self.field_only(id)?;
        if field.required && !quick {
            return Err(EditorError::ConstraintViolation("a required field is always quick"));
        }
        self.update_input(id, |input| {
            if let Input::Field(field) = input {
                field.quick = quick;
            }
        })
    }

    /// Turning the add button on turns save-and-add-more off.
    ///
    /// # Errors
    ///
    /// Fails for unknown ids and for fields.
    pub fn set_show_add_button(&mut self, id: &InputId, show: bool) -> Result<(), EditorError> {
        self.sub_section_only(id)?;
        self.update_input(id, |input| {
            if let Input::SubSection(sub) = input {
                sub.show_add_button = show;
                if show {
                    sub.save_and_add_more = false;
                }
            }
        })
    }

    /// Turning save-and-add-more on turns the add button off.
    ///
    /// # Errors
    ///
    /// Fails for unknown ids and for fields.
    pub fn set_save_and_add_more(&mut self, id: &InputId, enabled: bool) -> Result<(), EditorError> {
        self.sub_section_only(id)?;
        self.update_input(id, |input| {
            if let Input::SubSection(sub) = input {
                sub.save_and_add_more = enabled;
                if enabled {
                    sub.show_add_button = false;
                }
            }
        })
    }

    /// Show `id` only when the referenced parent field satisfies `display`.
    ///
    /// The parent must be another field outside `id` (see
    /// [`conditional::parent_field_candidates`]).
    ///
    /// # Errors
    ///
    /// Fails when the condition names a field that is not a valid parent of `id`.
    pub fn set_conditional_display(
        &mut self,
        id: &InputId,
        display: Option<ConditionalDisplay>,
    ) -> Result<(), EditorError> {
        if let Some(display) = &display {
            let candidates = conditional::parent_field_candidates(&self.document, id);
            if !candidates.iter().any(|field| field.name == display.field) {
                return Err(EditorError::ConstraintViolation(
                    "conditional display must reference another field outside this input",
                ));
            }
        }
        self.update_input(id, |input| match input {
            Input::Field(field) => field.conditional_display = display,
            Input::SubSection(sub) => sub.conditional_display = display,
        })
    }

    fn field_only(&self, id: &InputId) -> Result<&crate::document::Field, EditorError> {
        let (_, input) = self
            .document
            .input(id)
            .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;
        input
            .as_field()
            .ok_or(EditorError::ConstraintViolation("only fields have this property"))
    }

    fn sub_section_only(&self, id: &InputId) -> Result<(), EditorError> {
        let (_, input) = self
            .document
            .input(id)
            .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;
        if input.is_sub_section() {
            Ok(())
        } else {
            Err(EditorError::ConstraintViolation("only sub-sections have this property"))
        }
    }
}
