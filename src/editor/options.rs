use crate::palette::{CHECKBOX_GRID_SIZE, DEFAULT_GRID_SIZE, GridDefaults};

/// Options for [`super::FormEditor`].
#[derive(Clone, Debug)]
pub struct FormEditorOptions {
    /// Seconds the section-level drag-end handling waits before its final claim check.
    ///
    /// Container drop handlers that arrive within this window still win over the section.
    /// `0.0` resolves on drag-end immediately.
    pub claim_settle_delay: f64,

    /// Seconds a freshly inserted input is reported by [`super::FormEditor::is_just_inserted`].
    pub just_inserted_duration: f64,

    /// Distance (in points) from the viewport's top/bottom edge where auto-scroll kicks in.
    pub auto_scroll_edge_margin: f32,

    /// Auto-scroll speed (points per second) with the pointer right at the edge.
    ///
    /// The speed falls off linearly to zero at `auto_scroll_edge_margin`.
    pub auto_scroll_max_speed: f32,

    /// Grid width of new fields whose template has none.
    pub default_grid_size: u8,

    /// Grid width of new checkbox fields whose template has none.
    pub checkbox_grid_size: u8,

    /// If true, record drag/claim/mutation events in a small ring buffer
    /// (see [`super::FormEditor::debug_log_text`]).
    pub debug_event_log: bool,

    /// Maximum number of debug log lines to keep (ring buffer).
    pub debug_event_log_capacity: usize,

    /// If true, check document integrity after every committed edit.
    pub debug_integrity: bool,

    /// If true, panic on integrity issues (debug builds only).
    pub debug_integrity_panic: bool,
}

impl Default for FormEditorOptions {
    fn default() -> Self {
        Self {
            claim_settle_delay: 0.3,
            just_inserted_duration: 2.0,
            auto_scroll_edge_margin: 100.0,
            auto_scroll_max_speed: 900.0,
            default_grid_size: DEFAULT_GRID_SIZE,
            checkbox_grid_size: CHECKBOX_GRID_SIZE,
            debug_event_log: false,
            debug_event_log_capacity: 200,
            debug_integrity: cfg!(debug_assertions),
            debug_integrity_panic: false,
        }
    }
}

impl FormEditorOptions {
    pub(crate) fn grid_defaults(&self) -> GridDefaults {
        GridDefaults {
            default: self.default_grid_size,
            checkbox: self.checkbox_grid_size,
        }
    }

    pub(crate) fn claim_settle_delay(&self) -> f64 {
        self.claim_settle_delay.max(0.0)
    }
}
