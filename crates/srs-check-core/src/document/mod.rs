use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod extract;
pub mod tree;

/// One paragraph pulled from a source document, with the style name the
/// authoring tool attached to it (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphUnit {
    pub text: String,
    pub style_hint: Option<String>,
}

impl ParagraphUnit {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_hint: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style_hint: Some(style.into()),
        }
    }
}

/// Whether a classified line opens a section or carries body text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Heading,
    Content,
}

/// A paragraph after heading classification. `level` is only set for headings;
/// `section_number` only for headings recognised by their numeric prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub kind: LineKind,
    pub text: String,
    pub level: Option<u32>,
    pub section_number: Option<String>,
}

impl ClassifiedLine {
    pub fn heading(text: impl Into<String>, level: u32, section_number: Option<String>) -> Self {
        Self {
            kind: LineKind::Heading,
            text: text.into(),
            level: Some(level),
            section_number,
        }
    }

    pub fn content(text: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Content,
            text: text.into(),
            level: None,
            section_number: None,
        }
    }
}

/// Text used for content fingerprinting: paragraph texts joined by newlines.
pub fn normalized_text(paragraphs: &[ParagraphUnit]) -> String {
    paragraphs
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
