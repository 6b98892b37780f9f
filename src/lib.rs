//! Editing engine for a form builder: sections holding arbitrarily nested sub-sections and
//! fields, edited by drag-and-drop.
//!
//! Start with [`FormEditor`]; the data model lives in [`document`].

#![forbid(unsafe_code)]

pub mod conditional;
pub mod document;
pub mod editor;
pub mod naming;
pub mod palette;
pub mod persistence;

#[cfg(feature = "serde")]
pub use document::ExtraProps;
pub use document::{
    ConditionOperator, ConditionalDisplay, ContainerPath, Dependency, Document, Field, FieldKind,
    FieldOption, Input, InputId, Inputs, Section, SectionId, SubSection,
};
pub use editor::{
    AppliedMutation, DragPhase, DragSession, DragSource, DropIgnored, DropOutcome, EditorError,
    FormEditor, FormEditorOptions, GestureOutcome, MutationKind, PendingAction,
    PendingConfirmation, TickOutput,
};
pub use palette::{Palette, PaletteEntry};

#[cfg(feature = "persistence")]
pub use persistence::{FormPersistenceError, load_json, save_json};
