//! The editing session: one live [`Document`], at most one drag gesture, and the host-facing
//! event API.
//!
//! Hosts translate their UI toolkit's drag-and-drop events into calls on [`FormEditor`]:
//!
//! - drag start: [`FormEditor::begin_drag`] / [`FormEditor::begin_palette_drag`]
//! - drag over / leave on a container: [`FormEditor::drag_over`] / [`FormEditor::drag_leave`]
//! - drop on a container: [`FormEditor::drop_on_container`] (every container under the pointer
//!   may report the same physical drop; exactly one of them applies it)
//! - generic drag end: [`FormEditor::drag_end`]
//! - once per frame: [`FormEditor::tick`] (deferred drop resolution, timers, auto-scroll)

use std::collections::{BTreeMap, VecDeque};

use egui::{Pos2, Rect, Vec2};

use crate::document::{ContainerPath, Document, InputId, Section, SectionId};
use crate::palette::Palette;
use crate::persistence;

mod autoscroll;
mod claim;
mod confirm;
mod debug;
mod drop_apply;
mod drop_policy;
mod error;
mod integrity;
mod options;
mod properties;
mod session;

#[cfg(test)]
mod model_tests;
#[cfg(test)]
mod world_model_tests;

pub use claim::{ClaimDecision, DropClaim};
pub use confirm::{PendingAction, PendingConfirmation};
pub use debug::debug_document_summary;
pub use drop_apply::{AppliedMutation, MutationKind};
pub use error::EditorError;
pub use integrity::document_integrity_issues;
pub use options::FormEditorOptions;
pub use session::{DragPhase, DragSession, DragSource, GestureOutcome};

use autoscroll::AutoScroller;
use session::{DragController, ResolvedDrop};

/// What a container's drop handler should make of its call to
/// [`FormEditor::drop_on_container`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// This container owned the drop and the document changed.
    Applied(AppliedMutation),

    /// Nothing changed, for the given reason. Backing off is the normal path for all but one
    /// of the containers that see a drop.
    Ignored(DropIgnored),
}

impl DropOutcome {
    pub fn applied(&self) -> Option<&AppliedMutation> {
        match self {
            Self::Applied(applied) => Some(applied),
            Self::Ignored(_) => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DropIgnored {
    NoActiveDrag,

    /// The drag ended over no container at all.
    NoTarget,

    /// Another container already owns this drop.
    AlreadyClaimed { by: ContainerPath },

    /// A container nested inside this one is hovered and will take the drop.
    DeferredToDeeper { deeper: ContainerPath },

    /// This container owned the drop, but it could not be applied.
    Rejected(EditorError),
}

/// Result of [`FormEditor::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickOutput {
    /// How far to scroll the form this frame (`+y` is down).
    pub scroll: Vec2,

    /// A drop resolved by the deferred drag-end check during this tick.
    pub drop: Option<DropOutcome>,
}

/// Editing session for one form.
pub struct FormEditor {
    pub options: FormEditorOptions,

    document: Document,
    palette: Palette,

    drag: DragController,
    auto_scroll: AutoScroller,

    pending: Option<PendingConfirmation>,

    /// Input id → time until which it counts as just inserted.
    just_inserted: BTreeMap<InputId, f64>,

    debug_log: VecDeque<String>,
    debug_last_integrity_hash: Option<u64>,
}

impl FormEditor {
    /// Start editing `document` (normalized as on load) with the standard palette.
    pub fn new(document: Document) -> Self {
        Self::with_options(document, FormEditorOptions::default())
    }

    pub fn with_options(document: Document, options: FormEditorOptions) -> Self {
        let mut editor = Self {
            options,
            document: persistence::normalize_loaded(document),
            palette: Palette::standard(),
            drag: DragController::default(),
            auto_scroll: AutoScroller::default(),
            pending: None,
            just_inserted: BTreeMap::new(),
            debug_log: VecDeque::new(),
            debug_last_integrity_hash: None,
        };
        editor.debug_check_integrity();
        editor
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// The document as it should be saved (see [`persistence::prepare_for_save`]).
    pub fn document_for_save(&self) -> Document {
        persistence::prepare_for_save(&self.document)
    }

    fn commit(&mut self, document: Document, what: &str) {
        log::debug!("commit: {what}");
        self.debug_log_event(format!("commit {what}"));
        self.document = document;
        self.debug_check_integrity();
    }

    // ------------------------------------------------------------------------
    // Drag and drop

    pub fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    /// How the most recently finished gesture ended.
    pub fn last_gesture_outcome(&self) -> Option<&GestureOutcome> {
        self.drag.last_outcome()
    }

    /// Start dragging a new input made from the palette template `entry_id`.
    ///
    /// # Errors
    ///
    /// Fails with [`EditorError::UnknownTemplate`] for an unknown entry.
    pub fn begin_palette_drag(&mut self, entry_id: &str, now: f64) -> Result<u64, EditorError> {
        let template = self
            .palette
            .get(entry_id)
            .ok_or_else(|| EditorError::UnknownTemplate(entry_id.to_owned()))?
            .template
            .clone();
        self.auto_scroll.stop();
        let id = self.drag.begin(
            template,
            DragSource::Palette {
                entry_id: entry_id.to_owned(),
            },
            now,
        );
        self.debug_log_event(format!("begin palette drag {entry_id:?}"));
        Ok(id)
    }

    /// Start dragging the existing input `id`.
    ///
    /// # Errors
    ///
    /// Fails with [`EditorError::InputNotFound`] when `id` is not in the document.
    pub fn begin_drag(&mut self, id: &InputId, now: f64) -> Result<u64, EditorError> {
        let (path, input) = self
            .document
            .input(id)
            .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;
        let dragged = input.as_ref().clone();
        self.auto_scroll.stop();
        let session_id = self.drag.begin(dragged, DragSource::Container(path.clone()), now);
        self.debug_log_event(format!("begin drag {id} from {path}"));
        Ok(session_id)
    }

    /// The pointer is over the container at `path`, and over its child `sibling` if any.
    ///
    /// Containers report this innermost first or in any order; the last report wins.
    pub fn drag_over(&mut self, path: ContainerPath, sibling: Option<InputId>) -> bool {
        self.drag.update_hover(path, sibling)
    }

    pub fn drag_leave(&mut self, path: &ContainerPath) -> bool {
        let changed = self.drag.leave(path);
        if changed {
            let hovered = debug::path_label(self.drag.session().and_then(DragSession::hovered));
            self.debug_log_event(format!("leave {path} -> hovered {hovered}"));
        }
        changed
    }

    /// Pointer position and the visible region of the form, both in the same coordinates.
    pub fn pointer_moved(&mut self, pointer: Pos2, viewport: Rect) {
        self.drag.pointer_moved(pointer, viewport);
    }

    /// Report a drop on the container at `path`.
    ///
    /// Every container under the pointer may call this for the same physical drop. The first
    /// one to run that is not enclosing a hovered deeper container applies the drop; all
    /// others get [`DropOutcome::Ignored`].
    pub fn drop_on_container(&mut self, path: &ContainerPath, now: f64) -> DropOutcome {
        let resolved = match self.drag.claim(path, now) {
            Ok(resolved) => resolved,
            Err(None | Some(ClaimDecision::Claimed)) => {
                return DropOutcome::Ignored(DropIgnored::NoActiveDrag);
            }
            Err(Some(ClaimDecision::AlreadyClaimed { by })) => {
                return DropOutcome::Ignored(DropIgnored::AlreadyClaimed { by });
            }
            Err(Some(ClaimDecision::DeeperTargetHovered { deeper })) => {
                self.debug_log_event(format!("drop on {path} deferred to {deeper}"));
                return DropOutcome::Ignored(DropIgnored::DeferredToDeeper { deeper });
            }
        };

        let outcome = self.apply_resolved(&resolved, now);

        // The gesture winds down at the later of claim and drag-end.
        if self
            .drag
            .session()
            .is_some_and(|s| s.drag_ended_at().is_some())
        {
            self.finish_gesture();
        }
        outcome
    }

    fn apply_resolved(&mut self, resolved: &ResolvedDrop, now: f64) -> DropOutcome {
        let result = drop_apply::plan(&self.document, resolved).and_then(|mutation| {
            drop_apply::apply(&self.document, &mutation, self.options.grid_defaults())
        });

        match result {
            Ok((document, applied)) => {
                log::debug!(
                    "drag session {} applied {:?} {} -> {}",
                    resolved.session_id,
                    applied.kind,
                    applied.id,
                    applied.target
                );
                self.commit(
                    document,
                    &format!("{:?} {} into {}", applied.kind, applied.id, applied.target),
                );
                if applied.kind == MutationKind::Inserted {
                    self.just_inserted.insert(
                        applied.id.clone(),
                        now + self.options.just_inserted_duration.max(0.0),
                    );
                }
                DropOutcome::Applied(applied)
            }
            Err(err) => {
                log::debug!(
                    "drag session {} drop on {} rejected: {err}",
                    resolved.session_id,
                    resolved.target
                );
                self.debug_log_event(format!("drop on {} rejected: {err}", resolved.target));
                DropOutcome::Ignored(DropIgnored::Rejected(err))
            }
        }
    }

    /// The generic drag-end signal.
    ///
    /// If no container claimed the drop yet, the drop is resolved after
    /// [`FormEditorOptions::claim_settle_delay`] by [`Self::tick`] (or right here when that
    /// delay is zero).
    pub fn drag_end(&mut self, now: f64) -> Option<DropOutcome> {
        if !self.drag.mark_drag_ended(now) {
            return None;
        }
        match self.drag.phase() {
            DragPhase::Claimed => {
                self.finish_gesture();
                None
            }
            DragPhase::Dragging => {
                self.debug_log_event("drag end without claim; waiting for containers");
                (self.options.claim_settle_delay() <= 0.0).then(|| self.resolve_deferred_drop(now))
            }
            DragPhase::Idle => None,
        }
    }

    /// Abandon the current gesture, if any. Safe to call at any time.
    pub fn cancel_drag(&mut self) -> bool {
        self.auto_scroll.stop();
        let cancelled = self.drag.cancel();
        if cancelled {
            self.debug_log_event("drag cancelled");
        }
        cancelled
    }

    /// Advance timers. Call once per frame while the editor is visible.
    pub fn tick(&mut self, now: f64) -> TickOutput {
        let drop = self.resolve_deadlines(now);
        self.just_inserted.retain(|_, until| *until > now);

        let dragging = self.drag.phase() == DragPhase::Dragging;
        let (pointer, viewport) = self
            .drag
            .session()
            .map_or((None, None), |s| (s.pointer(), s.viewport()));
        let scroll = self.auto_scroll.frame(
            now,
            dragging,
            pointer,
            viewport,
            self.options.auto_scroll_edge_margin,
            self.options.auto_scroll_max_speed,
        );

        TickOutput { scroll, drop }
    }

    /// Was `id` inserted from the palette within the last
    /// [`FormEditorOptions::just_inserted_duration`] seconds?
    pub fn is_just_inserted(&self, id: &InputId, now: f64) -> bool {
        self.just_inserted.get(id).is_some_and(|until| *until > now)
    }

    fn resolve_deadlines(&mut self, now: f64) -> Option<DropOutcome> {
        let settle = self.options.claim_settle_delay();
        let session = self.drag.session()?;
        let (claimed_at, ended_at) = (session.claimed_at(), session.drag_ended_at());

        match self.drag.phase() {
            DragPhase::Claimed => {
                let settled = claimed_at.is_none_or(|at| now - at >= settle);
                if ended_at.is_some() || settled {
                    self.finish_gesture();
                }
                None
            }
            DragPhase::Dragging => {
                let ended_at = ended_at?;
                (now - ended_at >= settle).then(|| self.resolve_deferred_drop(now))
            }
            DragPhase::Idle => None,
        }
    }

    /// Drag ended and no container claimed the drop within the settle delay: resolve it to
    /// the most recently hovered container, or cancel if there is none.
    fn resolve_deferred_drop(&mut self, now: f64) -> DropOutcome {
        let hovered = self.drag.session().and_then(|s| s.hovered().cloned());
        let Some(target) = hovered else {
            self.debug_log_event("drag ended over no container");
            self.cancel_drag();
            return DropOutcome::Ignored(DropIgnored::NoTarget);
        };

        self.debug_log_event(format!("deferred drop resolves to {target}"));
        let outcome = self.drop_on_container(&target, now);
        self.finish_gesture();
        outcome
    }

    fn finish_gesture(&mut self) {
        self.auto_scroll.stop();
        if let Some(session) = self.drag.finish() {
            let owner = debug::path_label(session.claim().owner());
            self.debug_log_event(format!("gesture {} finished, owner {owner}", session.id()));
        }
    }

    // ------------------------------------------------------------------------
    // Confirmation

    pub fn pending_confirmation(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    /// Ask to delete `id` (and, for a sub-section, everything inside it).
    ///
    /// On success this returns [`EditorError::ConfirmationRequired`] and records a
    /// [`PendingConfirmation`]; the deletion happens on [`Self::confirm`].
    ///
    /// # Errors
    ///
    /// [`EditorError::InputNotFound`] for an unknown id, otherwise
    /// [`EditorError::ConfirmationRequired`].
    pub fn delete_input(&mut self, id: &InputId) -> Result<(), EditorError> {
        let (path, input) = self
            .document
            .input(id)
            .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;
        self.pending = Some(PendingConfirmation::delete_input(input, path));
        Err(EditorError::ConfirmationRequired)
    }

    /// Ask to delete the section `id`. Refused for sections that cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::ConfirmationRequired`] when the request was recorded.
    pub fn delete_section(&mut self, id: &SectionId) -> Result<(), EditorError> {
        let section = self
            .document
            .section(id)
            .ok_or_else(|| EditorError::SectionNotFound(id.clone()))?;
        if !section.can_remove {
            return Err(EditorError::ConstraintViolation("this section cannot be removed"));
        }
        self.pending = Some(PendingConfirmation::delete_section(id.clone(), &section.title));
        Err(EditorError::ConfirmationRequired)
    }

    /// Replace the whole form. Immediate while the current form is empty, otherwise it needs
    /// confirmation like a delete.
    ///
    /// # Errors
    ///
    /// [`EditorError::ConfirmationRequired`] when the current form is not empty.
    pub fn replace_document(&mut self, document: Document) -> Result<(), EditorError> {
        if self.document.is_empty() {
            self.install_document(document);
            return Ok(());
        }
        self.pending = Some(PendingConfirmation::replace_document(document));
        Err(EditorError::ConfirmationRequired)
    }

    /// Apply the pending destructive edit.
    ///
    /// # Errors
    ///
    /// [`EditorError::NothingToConfirm`] without a pending edit, or the lookup error when the
    /// target disappeared in the meantime.
    pub fn confirm(&mut self) -> Result<(), EditorError> {
        let pending = self.pending.take().ok_or(EditorError::NothingToConfirm)?;
        match pending.action {
            PendingAction::DeleteInput { id, .. } => {
                let (document, removed) = drop_apply::delete(&self.document, &id)?;
                let what = format!("delete {id} (+{} nested)", removed.descendant_count());
                self.commit(document, &what);
                self.just_inserted.remove(&id);
            }
            PendingAction::DeleteSection { id } => {
                let (document, _) = self
                    .document
                    .without_section(&id)
                    .ok_or_else(|| EditorError::SectionNotFound(id.clone()))?;
                self.commit(document, &format!("delete section {id}"));
            }
            PendingAction::ReplaceDocument(document) => {
                self.install_document(*document);
            }
        }
        Ok(())
    }

    pub fn cancel_confirmation(&mut self) -> bool {
        self.pending.take().is_some()
    }

    fn install_document(&mut self, document: Document) {
        self.cancel_drag();
        self.just_inserted.clear();
        self.commit(persistence::normalize_loaded(document), "replace document");
    }

    // ------------------------------------------------------------------------
    // Sections

    /// Add an empty section at `index` (or at the end) and return its id.
    ///
    /// # Errors
    ///
    /// Fails when the new section's id is already in use.
    pub fn add_section(
        &mut self,
        title: impl Into<String>,
        index: Option<usize>,
    ) -> Result<SectionId, EditorError> {
        let section = Section::new(SectionId::random(), title);
        let id = section.id.clone();
        let document = self
            .document
            .with_section_added(section, index)
            .ok_or(EditorError::ConstraintViolation("section id already in use"))?;
        self.commit(document, &format!("add section {id}"));
        Ok(id)
    }

    /// # Errors
    ///
    /// [`EditorError::SectionNotFound`] for an unknown section.
    pub fn retitle_section(&mut self, id: &SectionId, title: impl Into<String>) -> Result<(), EditorError> {
        let document = self
            .document
            .with_section_retitled(id, title)
            .ok_or_else(|| EditorError::SectionNotFound(id.clone()))?;
        self.commit(document, &format!("retitle section {id}"));
        Ok(())
    }

    /// # Errors
    ///
    /// [`EditorError::SectionNotFound`] for an unknown section.
    pub fn move_section(&mut self, id: &SectionId, to_index: usize) -> Result<(), EditorError> {
        let document = self
            .document
            .with_section_moved(id, to_index)
            .ok_or_else(|| EditorError::SectionNotFound(id.clone()))?;
        self.commit(document, &format!("move section {id} to {to_index}"));
        Ok(())
    }
}

impl Default for FormEditor {
    fn default() -> Self {
        Self::new(Document::default())
    }
}
