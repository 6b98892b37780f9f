//! Deciding which of several nested containers owns a drop.
//!
//! A single physical drop is reported by every container under the pointer (innermost first,
//! but with no guarantee about ordering slack), and the generic drag-end signal arrives on top
//! of that. Only one of them may apply a mutation:
//!
//! - the first container handler to run takes the claim token synchronously and proceeds,
//! - any later handler sees the token and backs off,
//! - a container that runs while a *deeper* container is the current hover target backs off
//!   too, since that deeper handler is still going to run,
//! - the section-level drag-end fallback waits [`super::FormEditorOptions::claim_settle_delay`]
//!   and then re-checks both conditions before acting.
//!
//! The token lives in the [`super::session::DragSession`], so it is reset together with every
//! other per-gesture field when the gesture finishes.

use crate::document::ContainerPath;

/// Outcome of a container asking to own the current drop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimDecision {
    /// The asking container owns the drop and must now apply it.
    Claimed,

    /// Another container already owns this drop.
    AlreadyClaimed { by: ContainerPath },

    /// A container nested inside the asking one is hovered and will handle the drop.
    DeeperTargetHovered { deeper: ContainerPath },
}

/// The per-gesture claim token plus the id (path) of the container holding it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropClaim {
    owner: Option<ContainerPath>,
}

impl DropClaim {
    pub fn is_claimed(&self) -> bool {
        self.owner.is_some()
    }

    pub fn owner(&self) -> Option<&ContainerPath> {
        self.owner.as_ref()
    }

    /// Try to take the claim for `container`, given the most recent hover target.
    pub fn try_claim(
        &mut self,
        container: &ContainerPath,
        hovered: Option<&ContainerPath>,
    ) -> ClaimDecision {
        if let Some(owner) = &self.owner {
            return ClaimDecision::AlreadyClaimed { by: owner.clone() };
        }

        if let Some(hovered) = hovered.filter(|h| container.is_ancestor_of(h)) {
            return ClaimDecision::DeeperTargetHovered {
                deeper: hovered.clone(),
            };
        }

        self.owner = Some(container.clone());
        ClaimDecision::Claimed
    }
}
