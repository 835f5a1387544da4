//! Incremental nesting state for the sidebar walk.

use super::{label_kind, section_matches_number, LabelKind};
use crate::sanitize::sanitize_segment;
use std::path::PathBuf;

/// Tracks the open section (and topic) while labels are consumed in sidebar
/// order, assigning each label a directory path of depth one or two.
#[derive(Debug, Default)]
pub struct HierarchyState {
    section: Option<String>,
    topic: Option<String>,
}

impl HierarchyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the next label and return the directory path its content
    /// belongs under, relative to the course root.
    ///
    /// Topics whose number does not match the open section still nest under
    /// it: a mismatch means the portal numbered sections and topics
    /// independently, and orphaning the topic to the top level would scatter
    /// its files.
    pub fn advance(&mut self, label: &str) -> PathBuf {
        match label_kind(label) {
            LabelKind::Section => self.open_section(label),
            LabelKind::Topic { number } => match &self.section {
                Some(section) => {
                    if !section_matches_number(section, number) {
                        tracing::debug!(%label, %section, "topic number does not match its section");
                    }
                    self.topic = Some(label.to_string());
                    self.current_path()
                }
                // A topic with nothing above it stands alone.
                None => self.open_section(label),
            },
            LabelKind::Standalone => self.open_section(label),
        }
    }

    fn open_section(&mut self, label: &str) -> PathBuf {
        self.section = Some(label.to_string());
        self.topic = None;
        self.current_path()
    }

    /// Path for the most recent label: `section` or `section/topic`, each
    /// component filesystem-sanitized.
    pub fn current_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        if let Some(section) = &self.section {
            path.push(sanitize_segment(section));
        }
        if let Some(topic) = &self.topic {
            path.push(sanitize_segment(topic));
        }
        path
    }
}

/// Assign every label its path in one pass. Convenience over [`HierarchyState`]
/// for callers that already hold the full label list.
pub fn assign_paths(labels: &[String]) -> Vec<(String, PathBuf)> {
    let mut state = HierarchyState::new();
    labels
        .iter()
        .map(|label| (label.clone(), state.advance(label)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn paths(labels: &[&str]) -> Vec<PathBuf> {
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        assign_paths(&labels).into_iter().map(|(_, p)| p).collect()
    }

    #[test]
    fn topics_nest_under_their_module() {
        let got = paths(&[
            "Module 1 - Basics",
            "Topic 1.1: Hello",
            "Topic 1.2: World",
            "Module 2 - More",
            "Topic 2.1: Deeper",
        ]);
        // ':' is not filesystem-safe, so the sanitizer turns it into '_'.
        assert_eq!(
            got,
            [
                Path::new("Module 1 - Basics"),
                Path::new("Module 1 - Basics/Topic 1.1_ Hello"),
                Path::new("Module 1 - Basics/Topic 1.2_ World"),
                Path::new("Module 2 - More"),
                Path::new("Module 2 - More/Topic 2.1_ Deeper"),
            ]
        );
    }

    #[test]
    fn mismatched_topic_numbers_still_nest() {
        let got = paths(&["Module 1 - Basics", "Topic 3.1: Stray"]);
        assert_eq!(got[1], Path::new("Module 1 - Basics/Topic 3.1_ Stray"));
    }

    #[test]
    fn leading_topic_stands_alone() {
        let got = paths(&["Topic 1.1: Orphan", "Topic 1.2: Sibling"]);
        // The orphan opens its own section; the next topic nests under it.
        assert_eq!(got[0], Path::new("Topic 1.1_ Orphan"));
        assert_eq!(got[1], Path::new("Topic 1.1_ Orphan/Topic 1.2_ Sibling"));
    }

    #[test]
    fn unnumbered_topic_label_opens_its_own_section() {
        let got = paths(&["Module 1 - Basics", "Topic overview", "Topic 1.1: After"]);
        // Without a parent number there is nothing to nest by.
        assert_eq!(got[1], Path::new("Topic overview"));
        assert_eq!(got[2], Path::new("Topic overview/Topic 1.1_ After"));
    }

    #[test]
    fn standalone_labels_reset_nesting() {
        let got = paths(&[
            "Module 1 - Basics",
            "Topic 1.1: Hello",
            "Course Syllabus",
            "Topic 1.2: After",
        ]);
        assert_eq!(got[2], Path::new("Course Syllabus"));
        assert_eq!(got[3], Path::new("Course Syllabus/Topic 1.2_ After"));
    }

    #[test]
    fn paths_never_exceed_two_levels() {
        let labels: Vec<String> = [
            "Module 1",
            "Topic 1.1: A",
            "Topic 1.2: B",
            "Topic 1.3: C",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        for (_, path) in assign_paths(&labels) {
            assert!(path.components().count() <= 2);
        }
    }

    #[test]
    fn path_components_are_sanitized() {
        let got = paths(&["Module 1: A/B"]);
        assert_eq!(got[0], Path::new("Module 1_ A_B"));
    }
}
