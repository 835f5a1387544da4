//! Reconstruction of the module/topic tree from flat sidebar labels.
//!
//! The content sidebar renders the course outline as a flat list of anchors;
//! the nesting that the visual tree shows is not recoverable from the DOM
//! snapshots. It is rebuilt here from the label text alone: "Module N ..."
//! labels open a new top-level section, "Topic N.x ..." labels nest under
//! the section whose number matches, and everything else stands on its own.

mod stack;

pub use self::stack::{assign_paths, HierarchyState};

use regex::Regex;
use std::sync::LazyLock;

/// Leading topic numbering, e.g. "Topic 3.2: Loops" captures 3.
static TOPIC_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Topic (\d+)\.").expect("topic number pattern"));

/// Structural role a sidebar label plays in the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelKind {
    /// Opens a new top-level section.
    Section,
    /// Nests under the section with the same leading number.
    Topic { number: u32 },
    /// Neither a module nor a numbered topic; stands alone at the top level.
    Standalone,
}

/// Classify a sidebar label by its leading token. A "Topic " label only
/// counts as a topic when it encodes a parent number; without one there is
/// nothing to nest it by and it stands alone.
pub fn label_kind(label: &str) -> LabelKind {
    if label.starts_with("Module ") || label.starts_with("Module:") {
        return LabelKind::Section;
    }
    if label.starts_with("Topic ") {
        if let Some(number) = TOPIC_NUMBER
            .captures(label)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
        {
            return LabelKind::Topic { number };
        }
    }
    LabelKind::Standalone
}

/// True when a section label carries the (1-based) number `number`, i.e. it
/// starts with "Module {number}".
pub fn section_matches_number(section_label: &str, number: u32) -> bool {
    let prefix = format!("Module {number}");
    match section_label.strip_prefix(&prefix) {
        // Guard against "Module 12" matching number 1.
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_digit()),
        None => false,
    }
}
