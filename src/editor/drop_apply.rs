use std::sync::Arc;

use crate::document::{ContainerPath, Document, Input, InputId};
use crate::palette::{self, GridDefaults};

use super::EditorError;
use super::drop_policy::{self, DropKind};
use super::session::ResolvedDrop;

/// What kind of change a drop made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationKind {
    Inserted,
    Reordered,
    Moved,
}

/// A drop that changed the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMutation {
    pub kind: MutationKind,

    /// The inserted, reordered or moved input.
    pub id: InputId,

    /// The container it now lives in.
    pub target: ContainerPath,
}

/// A planned change, computed from a resolved drop and the live document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mutation {
    InsertNew {
        template: Input,
        target: ContainerPath,
        before: Option<InputId>,
    },
    Reorder {
        container: ContainerPath,
        id: InputId,
        before: Option<InputId>,
    },
    Move {
        id: InputId,
        from: ContainerPath,
        to: ContainerPath,
        before: Option<InputId>,
    },
}

pub(crate) fn plan(document: &Document, drop: &ResolvedDrop) -> Result<Mutation, EditorError> {
    let mutation = match drop_policy::classify(document, drop)? {
        DropKind::InsertNew => Mutation::InsertNew {
            template: drop.dragged.clone(),
            target: drop.target.clone(),
            before: drop.before.clone(),
        },
        DropKind::Reorder { container } => Mutation::Reorder {
            container,
            id: drop.dragged.id().clone(),
            before: drop.before.clone(),
        },
        DropKind::Move { from } => Mutation::Move {
            id: drop.dragged.id().clone(),
            from,
            to: drop.target.clone(),
            before: drop.before.clone(),
        },
    };
    Ok(mutation)
}

/// Index in `container` to insert at so the new entry lands in front of `before`.
///
/// A `before` that is not in the container is ignored (append).
fn insertion_index(document: &Document, container: &ContainerPath, before: Option<&InputId>) -> Option<usize> {
    let inputs = document.container(container)?;
    before.and_then(|id| inputs.position(id))
}

pub(crate) fn apply(
    document: &Document,
    mutation: &Mutation,
    grid: GridDefaults,
) -> Result<(Document, AppliedMutation), EditorError> {
    match mutation {
        Mutation::InsertNew {
            template,
            target,
            before,
        } => {
            let input = palette::instantiate(template, document, grid);
            let id = input.id().clone();
            let index = insertion_index(document, target, before.as_ref());
            let next = document
                .with_input_at(target, index, input)
                .ok_or_else(|| EditorError::ContainerNotFound(target.clone()))?;
            Ok((
                next,
                AppliedMutation {
                    kind: MutationKind::Inserted,
                    id,
                    target: target.clone(),
                },
            ))
        }

        Mutation::Reorder {
            container,
            id,
            before,
        } => {
            let inputs = document
                .container(container)
                .ok_or_else(|| EditorError::ContainerNotFound(container.clone()))?;
            let from = inputs
                .position(id)
                .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;
            // Same semantics as an array move: take out at `from`, put back at the index the
            // sibling had before the removal (or at the end).
            let to = before
                .as_ref()
                .and_then(|b| inputs.position(b))
                .unwrap_or(inputs.len() - 1);

            let mut order: Vec<InputId> = inputs.ids().cloned().collect();
            let moved = order.remove(from);
            order.insert(to.min(order.len()), moved);

            let next = document
                .with_reordered_siblings(container, &order)
                .ok_or_else(|| EditorError::ContainerNotFound(container.clone()))?;
            Ok((
                next,
                AppliedMutation {
                    kind: MutationKind::Reordered,
                    id: id.clone(),
                    target: container.clone(),
                },
            ))
        }

        Mutation::Move {
            id,
            from,
            to,
            before,
        } => {
            let (without, input) = document
                .without_input_at(from, id)
                .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;
            drop_policy::check_not_into_itself(&input, to)?;

            let index = insertion_index(&without, to, before.as_ref());
            let next = without
                .with_input_at(to, index, Arc::clone(&input))
                .ok_or_else(|| EditorError::ContainerNotFound(to.clone()))?;
            Ok((
                next,
                AppliedMutation {
                    kind: MutationKind::Moved,
                    id: id.clone(),
                    target: to.clone(),
                },
            ))
        }
    }
}

/// Remove `id` and everything inside it.
pub(crate) fn delete(document: &Document, id: &InputId) -> Result<(Document, Arc<Input>), EditorError> {
    let path = document
        .container_path_of(id)
        .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;
    document
        .without_input_at(&path, id)
        .ok_or_else(|| EditorError::InputNotFound(id.clone()))
}
