//! Content classification from link text and title attributes.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Parenthesized `mm:ss`-style duration token, e.g. `(05:30)`. Its presence
/// in a link label is a strong video signal on content listings.
static DURATION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d+:\d+\)").expect("duration token pattern"));

/// Category assigned to a discovered content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Video,
    Pdf,
    Quiz,
    Other,
}

impl Category {
    /// Bracketed tag used in the human-readable report.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Video => "[VIDEO]",
            Category::Pdf => "[PDF]",
            Category::Quiz => "[QUIZ]",
            Category::Other => "[OTHER]",
        }
    }
}

/// Classifies a content link from its visible text and `title` attribute.
///
/// Precedence is a deliberate priority chain, first match wins:
/// "pdf" → PDF, "slides" → PDF, "external learning tool" in the title →
/// VIDEO, a `(mm:ss)` duration token → VIDEO, "quiz" → QUIZ, else OTHER.
/// "pdf"/"slides" outrank the duration signal: duration tokens can appear
/// spuriously in non-video labels, and the inverse order would misclassify
/// PDF items that carry a timestamp.
pub fn classify(text: &str, title_attr: &str) -> Category {
    let text_lower = text.to_lowercase();
    let title_lower = title_attr.to_lowercase();

    if text_lower.contains("pdf") || title_lower.contains("pdf") {
        Category::Pdf
    } else if text_lower.contains("slides") || title_lower.contains("slides") {
        Category::Pdf
    } else if title_lower.contains("external learning tool") {
        Category::Video
    } else if DURATION_TOKEN.is_match(text) {
        Category::Video
    } else if text_lower.contains("quiz") {
        Category::Quiz
    } else {
        Category::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_by_text_or_title() {
        assert_eq!(classify("Syllabus PDF", ""), Category::Pdf);
        assert_eq!(classify("Syllabus", "week1.PDF"), Category::Pdf);
    }

    #[test]
    fn slides_beat_duration_token() {
        assert_eq!(classify("Lecture Slides (05:30)", ""), Category::Pdf);
    }

    #[test]
    fn external_tool_title_is_video() {
        assert_eq!(
            classify("", "Lecture 3 - External Learning Tool"),
            Category::Video
        );
    }

    #[test]
    fn duration_token_is_video() {
        assert_eq!(classify("Intro Lecture (12:05)", ""), Category::Video);
    }

    #[test]
    fn quiz_by_text() {
        assert_eq!(classify("Quiz 2", ""), Category::Quiz);
    }

    #[test]
    fn fallthrough_is_other() {
        assert_eq!(classify("Reading list", ""), Category::Other);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Video).unwrap(), "\"video\"");
        assert_eq!(serde_json::to_string(&Category::Pdf).unwrap(), "\"pdf\"");
    }
}
