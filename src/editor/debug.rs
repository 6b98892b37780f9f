use crate::document::{ContainerPath, Document, Input, Inputs};

use super::FormEditor;
use super::integrity;

/// Indented outline of `document`, at most `max_lines` lines.
pub fn debug_document_summary(document: &Document, max_lines: usize) -> String {
    fn walk(inputs: &Inputs, depth: usize, lines: &mut Vec<String>, max_lines: usize) {
        for input in inputs {
            if lines.len() >= max_lines {
                return;
            }
            let indent = "  ".repeat(depth);
            match input.as_ref() {
                Input::Field(field) => lines.push(format!(
                    "{indent}{} Field({:?}) name={:?}",
                    field.id, field.kind, field.name
                )),
                Input::SubSection(sub) => {
                    lines.push(format!(
                        "{indent}{} SubSection name={:?} children={}",
                        sub.id,
                        sub.name,
                        sub.inputs.len()
                    ));
                    walk(&sub.inputs, depth + 1, lines, max_lines);
                }
            }
        }
    }

    let mut lines: Vec<String> = Vec::new();
    for section in document.sections() {
        if lines.len() >= max_lines {
            break;
        }
        lines.push(format!(
            "{} Section title={:?} children={}",
            section.id,
            section.title,
            section.inputs.len()
        ));
        walk(&section.inputs, 1, &mut lines, max_lines);
    }

    format!(
        "sections={} inputs={}\n{}",
        document.sections().len(),
        document.input_count(),
        lines.join("\n")
    )
}

impl FormEditor {
    pub(super) fn debug_log_event(&mut self, message: impl Into<String>) {
        if !self.options.debug_event_log {
            return;
        }
        self.push_debug_log_line(message.into());
    }

    fn debug_integrity_log_event(&mut self, message: impl Into<String>) {
        if !self.options.debug_integrity {
            return;
        }
        self.push_debug_log_line(message.into());
    }

    fn push_debug_log_line(&mut self, message: String) {
        let cap = self.options.debug_event_log_capacity.clamp(1, 10_000);
        while self.debug_log.len() >= cap {
            self.debug_log.pop_front();
        }
        let prefix = match self.drag.session() {
            Some(session) => format!("drag {}", session.id()),
            None => "idle".to_owned(),
        };
        self.debug_log.push_back(format!("[{prefix}] {message}"));
    }

    pub fn debug_log_clear(&mut self) {
        self.debug_log.clear();
    }

    /// The debug event log, oldest line first.
    pub fn debug_log_text(&self) -> String {
        self.debug_log.iter().cloned().collect::<Vec<_>>().join("\n")
    }

    pub(super) fn debug_check_integrity(&mut self) {
        if !self.options.debug_integrity {
            return;
        }
        let issues = integrity::document_integrity_issues(&self.document);
        let hash = integrity::hash_issues(&issues);
        self.debug_handle_integrity_result(issues, hash);
    }

    fn debug_handle_integrity_result(&mut self, issues: Vec<String>, hash: u64) {
        let prev = self.debug_last_integrity_hash.replace(hash);
        if prev == Some(hash) {
            return;
        }

        if issues.is_empty() {
            if prev.is_some() {
                self.debug_integrity_log_event("integrity OK");
            }
            return;
        }

        log::warn!("form integrity failure: {} issue(s)", issues.len());
        self.debug_integrity_log_event(format!("integrity FAIL issues={}", issues.len()));
        for issue in &issues {
            log::warn!("{issue}");
            self.debug_integrity_log_event(issue.clone());
        }
        let summary = debug_document_summary(&self.document, 48);
        self.debug_integrity_log_event(format!("integrity document_summary:\n{summary}"));

        if self.options.debug_integrity_panic && cfg!(debug_assertions) {
            panic!("form integrity failure\n{}", issues.join("\n"));
        }
    }
}

/// `s1/outer` style label for log lines; `-` when there is no container.
pub(super) fn path_label(path: Option<&ContainerPath>) -> String {
    path.map_or_else(|| "-".to_owned(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Field, FieldKind, Section, SubSection};

    #[test]
    fn summary_is_indented_and_capped() {
        let doc = Document::new([
            Section::new("s1", "One").with_input(
                SubSection::new("ss", "SS")
                    .named("ss")
                    .with_input(Field::new("a", FieldKind::Email, "A").named("a")),
            ),
            Section::new("s2", "Two"),
        ]);
        let summary = debug_document_summary(&doc, 100);
        assert!(summary.starts_with("sections=2 inputs=2"));
        assert!(summary.contains("\n  ss SubSection"));
        assert!(summary.contains("\n    a Field(Email)"));

        let capped = debug_document_summary(&doc, 1);
        assert_eq!(capped.lines().count(), 2);
    }

    #[test]
    fn path_labels() {
        assert_eq!(path_label(None), "-");
        assert_eq!(
            path_label(Some(&ContainerPath::section("s1").child("ss"))),
            "s1/ss"
        );
    }
}
