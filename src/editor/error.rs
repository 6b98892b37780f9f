use crate::document::{ContainerPath, InputId, SectionId};

/// Why an edit was refused. The document is unchanged in every case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorError {
    /// A referenced section, container or input no longer exists (e.g. a stale drag).
    InputNotFound(InputId),
    SectionNotFound(SectionId),
    ContainerNotFound(ContainerPath),

    /// Dropping the sub-section `dragged` into `target` would make it contain itself.
    InvalidMutationTarget {
        dragged: InputId,
        target: ContainerPath,
    },

    /// The edit is destructive; a pending confirmation was recorded instead.
    ConfirmationRequired,

    /// Nothing is waiting for confirmation.
    NothingToConfirm,

    /// The edit would break a document invariant.
    ConstraintViolation(&'static str),

    /// A drag operation was attempted without an active drag.
    NoActiveDrag,

    /// The palette has no template with this id.
    UnknownTemplate(String),
}

impl EditorError {
    /// Stale-reference misses; callers usually treat these as a silent no-op.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Self::InputNotFound(_) | Self::SectionNotFound(_) | Self::ContainerNotFound(_)
        )
    }
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputNotFound(id) => write!(f, "input {id} not found"),
            Self::SectionNotFound(id) => write!(f, "section {id} not found"),
            Self::ContainerNotFound(path) => write!(f, "container {path} not found"),
            Self::InvalidMutationTarget { dragged, target } => {
                write!(f, "cannot drop sub-section {dragged} into {target}: it would contain itself")
            }
            Self::ConfirmationRequired => write!(f, "confirmation required"),
            Self::NothingToConfirm => write!(f, "nothing to confirm"),
            Self::ConstraintViolation(what) => write!(f, "constraint violation: {what}"),
            Self::NoActiveDrag => write!(f, "no active drag"),
            Self::UnknownTemplate(id) => write!(f, "unknown palette template {id:?}"),
        }
    }
}

impl std::error::Error for EditorError {}
