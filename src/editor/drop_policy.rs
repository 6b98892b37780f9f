use crate::document::{ContainerPath, Document, Input};

use super::EditorError;
use super::session::{DragSource, ResolvedDrop};

/// What a resolved drop amounts to, before touching the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DropKind {
    /// A palette template dropped into `target`.
    InsertNew,

    /// An existing input dropped back into the container it already lives in.
    Reorder { container: ContainerPath },

    /// An existing input dropped into a different container.
    Move { from: ContainerPath },
}

/// Classify `drop` against the live `document`, rejecting drops that cannot be applied.
///
/// The source container is looked up again rather than taken from the drag session: the
/// document may have changed since the drag started.
pub(crate) fn classify(document: &Document, drop: &ResolvedDrop) -> Result<DropKind, EditorError> {
    if document.container(&drop.target).is_none() {
        return Err(EditorError::ContainerNotFound(drop.target.clone()));
    }

    if matches!(drop.source, DragSource::Palette { .. }) {
        return Ok(DropKind::InsertNew);
    }

    let id = drop.dragged.id();
    let from = document
        .container_path_of(id)
        .ok_or_else(|| EditorError::InputNotFound(id.clone()))?;

    check_not_into_itself(&drop.dragged, &drop.target)?;

    if from == drop.target {
        Ok(DropKind::Reorder { container: from })
    } else {
        Ok(DropKind::Move { from })
    }
}

/// A sub-section may not be dropped into itself or anything nested inside it.
pub(crate) fn check_not_into_itself(dragged: &Input, target: &ContainerPath) -> Result<(), EditorError> {
    if dragged.is_sub_section() && target.passes_through(dragged.id()) {
        return Err(EditorError::InvalidMutationTarget {
            dragged: dragged.id().clone(),
            target: target.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Field, FieldKind, Section, SubSection};

    fn doc() -> Document {
        Document::new([
            Section::new("s1", "S1").with_input(
                SubSection::new("ss1", "SS1")
                    .named("ss1")
                    .with_input(Field::new("x", FieldKind::Text, "X").named("x"))
                    .with_input(SubSection::new("ss2", "SS2").named("ss2")),
            ),
            Section::new("s2", "S2"),
        ])
    }

    fn drop_of(document: &Document, id: &str, target: ContainerPath) -> ResolvedDrop {
        let (path, input) = document.input(&id.into()).unwrap();
        ResolvedDrop {
            session_id: 1,
            dragged: input.as_ref().clone(),
            source: DragSource::Container(path),
            target,
            before: None,
        }
    }

    #[test]
    fn same_container_is_reorder_other_is_move() {
        let doc = doc();
        let ss1 = ContainerPath::section("s1").child("ss1");
        assert_eq!(
            classify(&doc, &drop_of(&doc, "x", ss1.clone())),
            Ok(DropKind::Reorder { container: ss1.clone() })
        );
        assert_eq!(
            classify(&doc, &drop_of(&doc, "x", ContainerPath::section("s2"))),
            Ok(DropKind::Move { from: ss1 })
        );
    }

    #[test]
    fn sub_section_into_itself_or_descendant_is_rejected() {
        let doc = doc();
        let ss1 = ContainerPath::section("s1").child("ss1");
        for target in [ss1.clone(), ss1.child("ss2")] {
            assert!(matches!(
                classify(&doc, &drop_of(&doc, "ss1", target)),
                Err(EditorError::InvalidMutationTarget { .. })
            ));
        }
        assert!(classify(&doc, &drop_of(&doc, "ss2", ContainerPath::section("s2"))).is_ok());
    }

    #[test]
    fn stale_references_are_lookup_misses() {
        let doc = doc();
        let mut drop = drop_of(&doc, "x", ContainerPath::section("s9"));
        assert!(classify(&doc, &drop).unwrap_err().is_lookup_miss());

        drop.target = ContainerPath::section("s2");
        drop.dragged = Field::new("gone", FieldKind::Text, "Gone").into();
        assert_eq!(
            classify(&doc, &drop),
            Err(EditorError::InputNotFound("gone".into()))
        );
    }
}
