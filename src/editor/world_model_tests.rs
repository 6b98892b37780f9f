use std::sync::Arc;

use crate::document::{ContainerPath, Document, Field, FieldKind, Input, InputId, Section, SubSection};

use super::{
    DropOutcome, EditorError, FormEditor, FormEditorOptions, MutationKind, PendingAction,
    document_integrity_issues,
};

fn field(id: &str, kind: FieldKind, label: &str, name: &str) -> Field {
    Field::new(id, kind, label).named(name)
}

fn text(id: &str) -> Field {
    field(id, FieldKind::Text, id, id)
}

fn editor(document: Document) -> FormEditor {
    let options = FormEditorOptions {
        debug_integrity: true,
        debug_integrity_panic: true,
        ..Default::default()
    };
    FormEditor::with_options(document, options)
}

fn assert_document_ok(editor: &FormEditor) {
    let issues = document_integrity_issues(editor.document());
    assert!(issues.is_empty(), "document integrity failed:\n{}", issues.join("\n"));
}

fn ids(editor: &FormEditor, path: &ContainerPath) -> Vec<String> {
    editor
        .document()
        .container(path)
        .unwrap()
        .ids()
        .map(|id| id.as_str().to_owned())
        .collect()
}

/// One full gesture ending on `target`, reported by `target` alone.
fn drag_existing(editor: &mut FormEditor, id: &str, target: &ContainerPath, before: Option<&str>) -> DropOutcome {
    editor.begin_drag(&id.into(), 0.0).unwrap();
    editor.drag_over(target.clone(), before.map(InputId::from));
    let outcome = editor.drop_on_container(target, 0.5);
    editor.drag_end(0.5);
    outcome
}

#[test]
fn palette_email_next_to_existing_email_gets_email1_after_it() {
    let mut editor = editor(Document::new([Section::new("s1", "S1")
        .with_input(field("f1", FieldKind::Email, "Email", "email"))]));
    let s1 = ContainerPath::section("s1");

    editor.begin_palette_drag("email", 0.0).unwrap();
    assert!(editor.drag_session().unwrap().is_from_palette());
    editor.drag_over(s1.clone(), None);
    let outcome = editor.drop_on_container(&s1, 0.5);
    editor.drag_end(0.5);

    let applied = outcome.applied().unwrap();
    assert_eq!(applied.kind, MutationKind::Inserted);
    let order = ids(&editor, &s1);
    assert_eq!(order[0], "f1");
    assert_eq!(order[1], applied.id.as_str());

    let (_, input) = editor.document().input(&applied.id).unwrap();
    let new_field = input.as_field().unwrap();
    assert_eq!(new_field.name, "email1");
    assert_eq!(new_field.kind, FieldKind::Email);
    assert_eq!(new_field.grid_size, Some(6));
    assert_document_ok(&editor);
}

#[test]
fn dragging_x_out_of_its_sub_section_onto_the_section() {
    let mut editor = editor(Document::new([Section::new("s1", "S1").with_input(
        SubSection::new("ss1", "SS1")
            .named("ss1")
            .with_input(text("x"))
            .with_input(text("y")),
    )]));
    let s1 = ContainerPath::section("s1");
    let ss1 = s1.child("ss1");

    editor.begin_drag(&"x".into(), 0.0).unwrap();
    assert_eq!(
        editor.drag_session().unwrap().source_sub_section_id().map(InputId::as_str),
        Some("ss1")
    );
    editor.drag_over(s1.clone(), None);
    editor.drag_over(ss1.clone(), Some("y".into()));
    assert!(editor.drag_leave(&ss1));

    assert!(editor.drop_on_container(&s1, 0.5).is_applied());
    editor.drag_end(0.5);

    assert_eq!(ids(&editor, &s1), ["ss1", "x"]);
    assert_eq!(ids(&editor, &ss1), ["y"]);
    assert_eq!(editor.document().input(&"x".into()).unwrap().1.name(), "x");
    assert_document_ok(&editor);
}

#[test]
fn reordering_f2_before_f1_shares_every_other_section() {
    let mut editor = editor(Document::new([
        Section::new("s0", "S0").with_input(text("a")),
        Section::new("s1", "S1").with_input(text("f1")).with_input(text("f2")),
        Section::new("s2", "S2").with_input(
            SubSection::new("ss", "SS").named("ss").with_input(text("b")),
        ),
    ]));
    let before = editor.document().clone();
    let s1 = ContainerPath::section("s1");

    let outcome = drag_existing(&mut editor, "f2", &s1, Some("f1"));
    assert_eq!(outcome.applied().unwrap().kind, MutationKind::Reordered);
    assert_eq!(ids(&editor, &s1), ["f2", "f1"]);

    let after = editor.document();
    assert!(Arc::ptr_eq(&before.sections()[0], &after.sections()[0]));
    assert!(Arc::ptr_eq(&before.sections()[2], &after.sections()[2]));
    assert!(!Arc::ptr_eq(&before.sections()[1], &after.sections()[1]));
    assert!(Arc::ptr_eq(
        before.input(&"f1".into()).unwrap().1,
        after.input(&"f1".into()).unwrap().1
    ));
    // The old document is untouched.
    assert_eq!(before.container(&s1).unwrap().ids().next().map(InputId::as_str), Some("f1"));
}

#[test]
fn sibling_target_means_in_front_for_moves_and_its_index_for_reorders() {
    let mut editor = editor(Document::new([
        Section::new("s1", "S1")
            .with_input(text("a"))
            .with_input(text("b"))
            .with_input(text("c")),
        Section::new("s2", "S2").with_input(text("x")),
    ]));
    let s1 = ContainerPath::section("s1");

    let outcome = drag_existing(&mut editor, "a", &s1, Some("c"));
    assert_eq!(outcome.applied().unwrap().kind, MutationKind::Reordered);
    assert_eq!(ids(&editor, &s1), ["b", "c", "a"]);

    let outcome = drag_existing(&mut editor, "a", &s1, Some("b"));
    assert_eq!(outcome.applied().unwrap().kind, MutationKind::Reordered);
    assert_eq!(ids(&editor, &s1), ["a", "b", "c"]);

    let outcome = drag_existing(&mut editor, "x", &s1, Some("c"));
    assert_eq!(outcome.applied().unwrap().kind, MutationKind::Moved);
    assert_eq!(ids(&editor, &s1), ["a", "b", "x", "c"]);
    assert_document_ok(&editor);
}

#[test]
fn moving_a_sub_section_keeps_its_children() {
    let mut editor = editor(Document::new([
        Section::new("s1", "S1").with_input(
            SubSection::new("ss", "SS")
                .named("ss")
                .with_input(text("a"))
                .with_input(text("b")),
        ),
        Section::new("s2", "S2").with_input(
            SubSection::new("dest", "Dest").named("dest").with_input(text("z")),
        ),
    ]));
    let dest = ContainerPath::section("s2").child("dest");

    let outcome = drag_existing(&mut editor, "ss", &dest, None);
    assert_eq!(outcome.applied().unwrap().kind, MutationKind::Moved);

    assert_eq!(ids(&editor, &dest), ["z", "ss"]);
    assert_eq!(ids(&editor, &dest.child("ss")), ["a", "b"]);
    assert!(ids(&editor, &ContainerPath::section("s1")).is_empty());
    assert_document_ok(&editor);
}

#[test]
fn deleting_a_sub_section_cascades_after_confirmation() {
    // ss holds N = 3 fields and M = 2 sub-sections at any depth.
    let mut editor = editor(Document::new([Section::new("s1", "S1")
        .with_input(text("keep"))
        .with_input(
            SubSection::new("ss", "Contact details")
                .named("ss")
                .with_input(text("a"))
                .with_input(
                    SubSection::new("n1", "N1")
                        .named("n1")
                        .with_input(text("b"))
                        .with_input(SubSection::new("n2", "N2").named("n2").with_input(text("c"))),
                ),
        )]));
    let before = editor.document().input_count();

    assert_eq!(editor.delete_input(&"ss".into()), Err(EditorError::ConfirmationRequired));
    assert_eq!(editor.document().input_count(), before);
    let pending = editor.pending_confirmation().unwrap();
    assert!(pending.message.contains("\"Contact details\""));
    assert!(pending.message.contains("All fields inside it will also be removed."));
    assert!(matches!(pending.action, PendingAction::DeleteInput { .. }));

    editor.confirm().unwrap();
    assert_eq!(editor.document().input_count(), before - (3 + 2 + 1));
    assert!(editor.pending_confirmation().is_none());
    assert_eq!(editor.confirm(), Err(EditorError::NothingToConfirm));
    assert_document_ok(&editor);
}

#[test]
fn cancelled_confirmation_changes_nothing() {
    let mut editor = editor(Document::new([Section::new("s1", "S1").with_input(text("a"))]));
    let before = editor.document().clone();
    assert!(editor.delete_input(&"a".into()).is_err());
    assert!(editor.cancel_confirmation());
    assert!(!editor.cancel_confirmation());
    assert_eq!(editor.document(), &before);
    assert!(editor.delete_input(&"missing".into()).unwrap_err().is_lookup_miss());
}

#[test]
fn stale_pending_delete_is_a_lookup_miss() {
    let mut editor = editor(Document::new([Section::new("s1", "S1").with_input(
        SubSection::new("ss", "SS").named("ss").with_input(text("a")),
    )]));
    assert!(editor.delete_input(&"a".into()).is_err());
    // Replaced by a newer request.
    assert!(editor.delete_input(&"ss".into()).is_err());
    editor.confirm().unwrap();

    assert!(editor.delete_input(&"a".into()).unwrap_err().is_lookup_miss());
}

#[test]
fn sections_can_be_added_moved_retitled_and_deleted() {
    let mut editor = editor(Document::new([
        Section::new("s1", "S1").with_input(text("a")),
        Section::new("locked", "Locked").removable(false),
    ]));

    let id = editor.add_section("New", Some(0)).unwrap();
    assert_eq!(editor.document().sections()[0].id, id);
    editor.move_section(&id, 5).unwrap();
    assert_eq!(editor.document().sections()[2].id, id);
    editor.retitle_section(&id, "Renamed").unwrap();
    assert_eq!(editor.document().section(&id).unwrap().title, "Renamed");

    assert!(matches!(
        editor.delete_section(&"locked".into()),
        Err(EditorError::ConstraintViolation(_))
    ));
    assert!(editor.pending_confirmation().is_none());

    assert_eq!(editor.delete_section(&"s1".into()), Err(EditorError::ConfirmationRequired));
    assert!(editor.pending_confirmation().unwrap().message.contains("\"S1\""));
    editor.confirm().unwrap();
    assert_eq!(editor.document().sections().len(), 2);
    assert!(!editor.document().contains_input(&"a".into()));

    assert!(editor.retitle_section(&"s1".into(), "x").unwrap_err().is_lookup_miss());
}

#[test]
fn replacing_a_non_empty_form_needs_confirmation() {
    let replacement = Document::new([Section::new("r1", "R").with_input(
        field("r", FieldKind::Text, "Full Name", ""),
    )]);

    let mut empty = editor(Document::new([Section::new("s1", "S1")]));
    empty.replace_document(replacement.clone()).unwrap();
    assert_eq!(empty.document().input(&"r".into()).unwrap().1.name(), "fullName");

    let mut editor = editor(Document::new([Section::new("s1", "S1").with_input(text("a"))]));
    editor.begin_drag(&"a".into(), 0.0).unwrap();
    assert_eq!(
        editor.replace_document(replacement),
        Err(EditorError::ConfirmationRequired)
    );
    assert!(editor.document().contains_input(&"a".into()));
    editor.confirm().unwrap();
    assert!(editor.drag_session().is_none());
    assert!(editor.document().contains_input(&"r".into()));
    assert!(!editor.document().contains_input(&"a".into()));
}

#[test]
fn stale_drag_after_delete_is_ignored() {
    let mut editor = editor(Document::new([
        Section::new("s1", "S1").with_input(text("a")),
        Section::new("s2", "S2"),
    ]));
    let s2 = ContainerPath::section("s2");

    editor.begin_drag(&"a".into(), 0.0).unwrap();
    assert!(editor.delete_input(&"a".into()).is_err());
    editor.confirm().unwrap();

    editor.drag_over(s2.clone(), None);
    let outcome = editor.drop_on_container(&s2, 0.5);
    let DropOutcome::Ignored(super::DropIgnored::Rejected(err)) = &outcome else {
        panic!("expected a rejected drop, got {outcome:?}");
    };
    assert!(err.is_lookup_miss());
    assert!(ids(&editor, &s2).is_empty());
}

#[test]
fn conditional_display_survives_moves() {
    let mut gated = text("gated");
    gated.conditional_display = Some(crate::document::ConditionalDisplay {
        field: "kind".to_owned(),
        operator: crate::document::ConditionOperator::Equals,
        values: vec!["company".to_owned()],
    });
    let mut editor = editor(Document::new([
        Section::new("s1", "S1").with_input(text("kind")).with_input(gated),
        Section::new("s2", "S2").with_input(SubSection::new("ss", "SS").named("ss")),
    ]));
    let expected = editor
        .document()
        .input(&"gated".into())
        .unwrap()
        .1
        .conditional_display()
        .cloned();

    drag_existing(&mut editor, "gated", &ContainerPath::section("s2").child("ss"), None);
    let (_, moved) = editor.document().input(&"gated".into()).unwrap();
    assert_eq!(moved.conditional_display().cloned(), expected);
}

#[test]
fn palette_sub_section_with_children_is_inserted_whole() {
    let mut editor = editor(Document::new([Section::new("s1", "S1")
        .with_input(field("f1", FieldKind::Email, "Email", "email"))]));
    let mut palette = crate::palette::Palette::standard();
    palette.insert(crate::palette::PaletteEntry {
        id: "contact".to_owned(),
        template: Input::from(
            SubSection::new("tpl", "Contact")
                .with_input(Field::new("tpl_email", FieldKind::Email, "Email"))
                .with_input(Field::new("tpl_pick", FieldKind::Select, "Pick")),
        ),
    });
    editor.set_palette(palette);

    let s1 = ContainerPath::section("s1");
    editor.begin_palette_drag("contact", 0.0).unwrap();
    editor.drag_over(s1.clone(), Some("f1".into()));
    let id = editor.drop_on_container(&s1, 0.5).applied().unwrap().id.clone();
    editor.drag_end(0.5);

    assert_eq!(ids(&editor, &s1)[0], id.as_str());
    let (_, sub) = editor.document().input(&id).unwrap();
    let sub = sub.as_sub_section().unwrap();
    let names: Vec<&str> = sub.inputs.iter().map(|i| i.name()).collect();
    assert_eq!(names, ["email1", "pick"]);
    let pick = sub.inputs.iter().nth(1).unwrap().as_field().unwrap();
    assert_eq!(pick.options.as_ref().map(Vec::len), Some(1));

    assert_eq!(
        editor.begin_palette_drag("nope", 1.0),
        Err(EditorError::UnknownTemplate("nope".to_owned()))
    );
    assert_document_ok(&editor);
}
