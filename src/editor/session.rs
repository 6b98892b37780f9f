use egui::{Pos2, Rect};

use crate::document::{ContainerPath, Input, InputId, SectionId};

use super::claim::{ClaimDecision, DropClaim};

/// Where the dragged input comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragSource {
    /// A palette template: the drop creates a new input.
    Palette { entry_id: String },

    /// An input already in the document, held by this container.
    Container(ContainerPath),
}

/// Coarse state of the drag controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    Dragging,

    /// A container took the drop; the gesture is waiting for drag-end to wind down.
    Claimed,
}

/// How the previous gesture ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    Committed { target: ContainerPath },
    Cancelled,
}

/// Everything known about one drag gesture. Dropped as a whole when the gesture ends.
#[derive(Clone, Debug)]
pub struct DragSession {
    id: u64,
    dragged: Input,
    source: DragSource,
    started_at: f64,

    hovered: Option<ContainerPath>,
    sibling_target: Option<InputId>,

    pointer: Option<Pos2>,
    viewport: Option<Rect>,

    claim: DropClaim,
    claimed_at: Option<f64>,
    drag_ended_at: Option<f64>,
}

impl DragSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The dragged value, cloned at drag start.
    pub fn dragged(&self) -> &Input {
        &self.dragged
    }

    pub fn source(&self) -> &DragSource {
        &self.source
    }

    pub fn is_from_palette(&self) -> bool {
        matches!(self.source, DragSource::Palette { .. })
    }

    pub fn source_path(&self) -> Option<&ContainerPath> {
        match &self.source {
            DragSource::Container(path) => Some(path),
            DragSource::Palette { .. } => None,
        }
    }

    pub fn source_section_id(&self) -> Option<&SectionId> {
        self.source_path().map(ContainerPath::section_id)
    }

    pub fn source_sub_section_id(&self) -> Option<&InputId> {
        self.source_path().and_then(ContainerPath::sub_section)
    }

    pub fn source_parent_sub_section_id(&self) -> Option<&InputId> {
        self.source_path().and_then(ContainerPath::parent_sub_section)
    }

    /// The most recently hovered container (last write wins).
    pub fn hovered(&self) -> Option<&ContainerPath> {
        self.hovered.as_ref()
    }

    pub fn hovered_section_id(&self) -> Option<&SectionId> {
        self.hovered.as_ref().map(ContainerPath::section_id)
    }

    pub fn hovered_sub_section_id(&self) -> Option<&InputId> {
        self.hovered.as_ref().and_then(ContainerPath::sub_section)
    }

    /// The sibling the drop is aimed at.
    ///
    /// Inserts and moves land in front of it. A reorder within the same container takes the
    /// sibling's index instead, so dragging an input downwards puts it after the sibling.
    pub fn sibling_insert_target(&self) -> Option<&InputId> {
        self.sibling_target.as_ref()
    }

    pub fn claim(&self) -> &DropClaim {
        &self.claim
    }

    pub fn pointer(&self) -> Option<Pos2> {
        self.pointer
    }

    pub fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn drag_ended_at(&self) -> Option<f64> {
        self.drag_ended_at
    }

    pub fn claimed_at(&self) -> Option<f64> {
        self.claimed_at
    }
}

/// A drop whose owning container has been decided.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ResolvedDrop {
    pub(crate) session_id: u64,
    pub(crate) dragged: Input,
    pub(crate) source: DragSource,
    pub(crate) target: ContainerPath,
    pub(crate) before: Option<InputId>,
}

/// `Idle → Dragging → (Claimed | cancelled) → Idle`.
#[derive(Debug, Default)]
pub(crate) struct DragController {
    next_id: u64,
    active: Option<DragSession>,
    last_outcome: Option<GestureOutcome>,
}

impl DragController {
    pub(crate) fn phase(&self) -> DragPhase {
        match &self.active {
            None => DragPhase::Idle,
            Some(session) if session.claim.is_claimed() => DragPhase::Claimed,
            Some(_) => DragPhase::Dragging,
        }
    }

    pub(crate) fn session(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    pub(crate) fn last_outcome(&self) -> Option<&GestureOutcome> {
        self.last_outcome.as_ref()
    }

    /// Start a new gesture. A gesture still winding down is finished first.
    pub(crate) fn begin(&mut self, dragged: Input, source: DragSource, now: f64) -> u64 {
        if let Some(previous) = self.active.take() {
            log::debug!("drag session {} superseded before finishing", previous.id);
            self.last_outcome = Some(match previous.claim.owner() {
                Some(target) => GestureOutcome::Committed {
                    target: target.clone(),
                },
                None => GestureOutcome::Cancelled,
            });
        }

        let id = self.next_id.max(1);
        self.next_id = id.saturating_add(1);
        log::debug!(
            "drag session {id} START dragged={} source={source:?}",
            dragged.id()
        );
        self.active = Some(DragSession {
            id,
            dragged,
            source,
            started_at: now,
            hovered: None,
            sibling_target: None,
            pointer: None,
            viewport: None,
            claim: DropClaim::default(),
            claimed_at: None,
            drag_ended_at: None,
        });
        id
    }

    /// A container reports the pointer over it; `sibling` is the input under the pointer, if
    /// any. Ignored once the drop is claimed.
    pub(crate) fn update_hover(&mut self, candidate: ContainerPath, sibling: Option<InputId>) -> bool {
        let Some(session) = self.dragging_mut() else {
            return false;
        };
        log::trace!("drag session {} hover {candidate} sibling={sibling:?}", session.id);
        session.hovered = Some(candidate);
        session.sibling_target = sibling;
        true
    }

    /// The pointer left `container`. If it was the hover target, fall back to its parent.
    pub(crate) fn leave(&mut self, container: &ContainerPath) -> bool {
        let Some(session) = self.dragging_mut() else {
            return false;
        };
        if session.hovered.as_ref() != Some(container) {
            return false;
        }
        session.hovered = container.parent();
        session.sibling_target = None;
        true
    }

    pub(crate) fn pointer_moved(&mut self, pointer: Pos2, viewport: Rect) {
        if let Some(session) = self.active.as_mut() {
            session.pointer = Some(pointer);
            session.viewport = Some(viewport);
        }
    }

    /// Run the claim check for `container` and, if it wins, describe the drop to apply.
    pub(crate) fn claim(
        &mut self,
        container: &ContainerPath,
        now: f64,
    ) -> Result<ResolvedDrop, Option<ClaimDecision>> {
        let Some(session) = self.active.as_mut() else {
            return Err(None);
        };

        let decision = session.claim.try_claim(container, session.hovered.as_ref());
        if decision != ClaimDecision::Claimed {
            log::debug!(
                "drag session {} claim by {container} refused: {decision:?}",
                session.id
            );
            return Err(Some(decision));
        }

        log::debug!("drag session {} claimed by {container}", session.id);
        session.claimed_at = Some(now);
        let before = session
            .sibling_target
            .clone()
            .filter(|_| session.hovered.as_ref() == Some(container));
        Ok(ResolvedDrop {
            session_id: session.id,
            dragged: session.dragged.clone(),
            source: session.source.clone(),
            target: container.clone(),
            before,
        })
    }

    /// Record the generic drag-end signal. Returns `true` if it arrived for an active gesture.
    pub(crate) fn mark_drag_ended(&mut self, now: f64) -> bool {
        match self.active.as_mut() {
            Some(session) => {
                session.drag_ended_at.get_or_insert(now);
                true
            }
            None => false,
        }
    }

    /// End the gesture after its owner applied the drop. Resets all per-gesture state once.
    pub(crate) fn finish(&mut self) -> Option<DragSession> {
        let session = self.active.take()?;
        let outcome = match session.claim.owner() {
            Some(target) => GestureOutcome::Committed {
                target: target.clone(),
            },
            None => GestureOutcome::Cancelled,
        };
        log::debug!("drag session {} END {outcome:?}", session.id);
        self.last_outcome = Some(outcome);
        Some(session)
    }

    /// Abandon the gesture. Safe to call at any time; returns whether a drag was active.
    pub(crate) fn cancel(&mut self) -> bool {
        let Some(session) = self.active.take() else {
            return false;
        };
        log::debug!("drag session {} CANCEL", session.id);
        self.last_outcome = Some(GestureOutcome::Cancelled);
        true
    }

    fn dragging_mut(&mut self) -> Option<&mut DragSession> {
        self.active.as_mut().filter(|s| !s.claim.is_claimed())
    }
}
