use crate::document::{ContainerPath, Document, Field, FieldKind, InputId, Section, SubSection};

use super::{
    DropIgnored, DropOutcome, EditorError, FormEditor, FormEditorOptions, MutationKind,
    document_integrity_issues,
};

fn assert_document_ok(document: &Document) {
    let issues = document_integrity_issues(document);
    assert!(
        issues.is_empty(),
        "document integrity failed:\n{}",
        issues.join("\n")
    );
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed ^ 0xF0A4_F0A4_F0A4_F0A4)
    }

    fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005u64)
            .wrapping_add(1442695040888963407u64);
        self.0
    }

    fn next_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        ((self.next_u64() >> 33) as usize) % upper
    }

    fn next_bool(&mut self) -> bool {
        (self.next_u64() >> 40) & 1 != 0
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.next_usize(items.len())])
        }
    }

    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_usize(i + 1);
            items.swap(i, j);
        }
    }
}

const LABELS: [&str; 5] = ["Email", "Name", "", "Phone Number", "name"];

fn containers(document: &Document) -> Vec<ContainerPath> {
    let mut out: Vec<ContainerPath> = document
        .sections()
        .iter()
        .map(|s| ContainerPath::section(s.id.clone()))
        .collect();
    document.for_each_input(|path, input| {
        if input.is_sub_section() {
            out.push(path.child(input.id().clone()));
        }
    });
    out
}

fn input_ids(document: &Document) -> Vec<InputId> {
    let mut out = Vec::new();
    document.for_each_input(|_, input| out.push(input.id().clone()));
    out
}

fn seed_editor() -> FormEditor {
    let options = FormEditorOptions {
        debug_integrity: true,
        debug_integrity_panic: true,
        ..Default::default()
    };
    FormEditor::with_options(
        Document::new([
            Section::new("s1", "One")
                .with_input(Field::new("f1", FieldKind::Email, "Email").named("email"))
                .with_input(
                    SubSection::new("ss1", "Outer").named("outer").with_input(
                        SubSection::new("ss2", "Inner")
                            .named("inner")
                            .with_input(Field::new("f2", FieldKind::Text, "Name").named("name")),
                    ),
                ),
            Section::new("s2", "Two"),
        ]),
        options,
    )
}

/// One drag gesture from a random source to a random container. The drop is reported by the
/// target and every enclosing container, in random order.
fn random_gesture(editor: &mut FormEditor, rng: &mut Rng, now: f64) {
    let before = editor.document().clone();
    let targets = containers(&before);
    let Some(target) = rng.pick(&targets).cloned() else {
        return;
    };

    let ids = input_ids(&before);
    let dragged = if ids.is_empty() || rng.next_usize(3) == 0 {
        let entries: Vec<String> = editor.palette().iter().map(|e| e.id.clone()).collect();
        let Some(entry) = rng.pick(&entries) else {
            return;
        };
        editor.begin_palette_drag(entry, now).unwrap();
        None
    } else {
        let id = rng.pick(&ids).cloned().unwrap();
        editor.begin_drag(&id, now).unwrap();
        Some(id)
    };

    let mut chain: Vec<ContainerPath> =
        std::iter::successors(Some(target.clone()), ContainerPath::parent).collect();
    for container in chain.iter().rev() {
        editor.drag_over(container.clone(), None);
    }
    let siblings: Vec<InputId> = before.container(&target).unwrap().ids().cloned().collect();
    let sibling = if rng.next_bool() {
        rng.pick(&siblings).cloned()
    } else {
        None
    };
    editor.drag_over(target.clone(), sibling);

    rng.shuffle(&mut chain);
    let outcomes: Vec<DropOutcome> = chain
        .iter()
        .map(|container| editor.drop_on_container(container, now))
        .collect();
    editor.drag_end(now);
    assert!(editor.drag_session().is_none());

    let owners: Vec<&DropOutcome> = outcomes
        .iter()
        .filter(|o| matches!(o, DropOutcome::Applied(_) | DropOutcome::Ignored(DropIgnored::Rejected(_))))
        .collect();
    assert_eq!(owners.len(), 1, "exactly one container owns the drop: {outcomes:?}");

    let after = editor.document();
    match owners[0] {
        DropOutcome::Applied(applied) => {
            assert_eq!(applied.target, target);
            assert_eq!(after.container_path_of(&applied.id), Some(target.clone()));
            match applied.kind {
                MutationKind::Inserted => {
                    assert!(dragged.is_none());
                    assert!(after.input_count() > before.input_count());
                }
                MutationKind::Reordered | MutationKind::Moved => {
                    let id = dragged.as_ref().unwrap();
                    assert_eq!(&applied.id, id);
                    assert_eq!(after.input_count(), before.input_count());
                    let (_, old) = before.input(id).unwrap();
                    let (_, new) = after.input(id).unwrap();
                    assert_eq!(old.name(), new.name());
                    assert_eq!(old.descendant_count(), new.descendant_count());
                }
            }
        }
        DropOutcome::Ignored(DropIgnored::Rejected(err)) => {
            let id = dragged.as_ref().unwrap();
            assert_eq!(
                err,
                &EditorError::InvalidMutationTarget {
                    dragged: id.clone(),
                    target: target.clone(),
                }
            );
            assert!(target.passes_through(id));
            assert_eq!(after, &before);
        }
        DropOutcome::Ignored(_) => unreachable!(),
    }
}

fn random_delete(editor: &mut FormEditor, rng: &mut Rng) {
    let before = editor.document().clone();
    let ids = input_ids(&before);
    let Some(id) = rng.pick(&ids).cloned() else {
        return;
    };
    let removed = 1 + before.input(&id).unwrap().1.descendant_count();

    assert_eq!(editor.delete_input(&id), Err(EditorError::ConfirmationRequired));
    if rng.next_bool() {
        editor.confirm().unwrap();
        assert_eq!(editor.document().input_count(), before.input_count() - removed);
        assert!(!editor.document().contains_input(&id));
    } else {
        assert!(editor.cancel_confirmation());
        assert_eq!(editor.document(), &before);
    }
}

fn random_relabel(editor: &mut FormEditor, rng: &mut Rng) {
    let ids = input_ids(editor.document());
    let Some(id) = rng.pick(&ids).cloned() else {
        return;
    };
    let label = LABELS[rng.next_usize(LABELS.len())];
    editor.set_label(&id, label).unwrap();

    let (_, input) = editor.document().input(&id).unwrap();
    assert_eq!(input.label(), label);
    assert!(!input.name().is_empty());
}

#[test]
fn random_editing_sequences_keep_invariants() {
    for seed in 0..40_u64 {
        let mut rng = Rng::new(seed);
        let mut editor = seed_editor();
        let mut now = 0.0;

        for _step in 0..60 {
            now += 0.5;
            let snapshot = editor.document().clone();
            let fingerprint = format!("{snapshot:?}");

            match rng.next_usize(6) {
                0..=2 => random_gesture(&mut editor, &mut rng, now),
                3 => random_delete(&mut editor, &mut rng),
                4 => random_relabel(&mut editor, &mut rng),
                _ => {
                    if rng.next_usize(4) == 0 {
                        editor.add_section("Extra", None).unwrap();
                    }
                }
            }
            editor.tick(now);

            assert_document_ok(editor.document());
            // Old documents are never mutated through the new one.
            assert_eq!(format!("{snapshot:?}"), fingerprint, "seed={seed}");
        }
    }
}

#[test]
fn random_sub_section_drops_never_create_cycles() {
    for seed in 0..40_u64 {
        let mut rng = Rng::new(seed ^ 0x55);
        let mut editor = seed_editor();
        for _ in 0..6 {
            editor.begin_palette_drag("subsection", 0.0).unwrap();
            let targets = containers(editor.document());
            let target = rng.pick(&targets).cloned().unwrap();
            editor.drag_over(target.clone(), None);
            assert!(editor.drop_on_container(&target, 0.0).is_applied());
            editor.drag_end(0.0);
        }

        for step in 0..40 {
            random_gesture(&mut editor, &mut rng, f64::from(step));
            assert_document_ok(editor.document());
            for path in containers(editor.document()) {
                let distinct: ahash::HashSet<&InputId> = path.sub_sections().iter().collect();
                assert_eq!(distinct.len(), path.depth(), "cycle in {path}");
            }
        }
    }
}
