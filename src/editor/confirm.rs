use crate::document::{ContainerPath, Document, Input, InputId, SectionId};

/// A destructive edit waiting for the user to confirm it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    DeleteInput { id: InputId, path: ContainerPath },
    DeleteSection { id: SectionId },
    ReplaceDocument(Box<Document>),
}

/// The pending edit plus the message to show in the confirmation dialog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub action: PendingAction,
    pub message: String,
}

pub(crate) const CASCADE_WARNING: &str = "All fields inside it will also be removed.";

fn display_label(label: &str, fallback: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        fallback.to_owned()
    } else {
        format!("\"{label}\"")
    }
}

impl PendingConfirmation {
    pub(crate) fn delete_input(input: &Input, path: ContainerPath) -> Self {
        let message = match input {
            Input::SubSection(sub) => format!(
                "Are you sure you want to delete the sub-section {}? {CASCADE_WARNING}",
                display_label(&sub.label, "without a label")
            ),
            Input::Field(field) => format!(
                "Are you sure you want to delete the field {}?",
                display_label(&field.label, "without a label")
            ),
        };
        Self {
            action: PendingAction::DeleteInput {
                id: input.id().clone(),
                path,
            },
            message,
        }
    }

    pub(crate) fn delete_section(id: SectionId, title: &str) -> Self {
        Self {
            message: format!(
                "Are you sure you want to delete the section {}? {CASCADE_WARNING}",
                display_label(title, "without a title")
            ),
            action: PendingAction::DeleteSection { id },
        }
    }

    pub(crate) fn replace_document(document: Document) -> Self {
        Self {
            action: PendingAction::ReplaceDocument(Box::new(document)),
            message: "Replace the current form? Unsaved changes will be lost.".to_owned(),
        }
    }
}
