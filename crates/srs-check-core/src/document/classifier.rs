use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::{ClassifiedLine, LineKind, ParagraphUnit};

#[allow(clippy::expect_used)]
static NUMBERED_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)*)\.?\s+(\S.*)$").expect("numbered heading regex is valid")
});

const HEADING_STYLE_MARKERS: &[&str] = &["heading", "标题"];
const TOC_STYLE_MARKERS: &[&str] = &["toc"];
/// Deepest outline level a style name can claim (Word stops at `Heading 9`).
const MAX_STYLE_LEVEL: u32 = 9;

/// Section names of the GJB 438C Appendix J outline with their fixed levels.
/// Chinese source documents use the first block; translated documents the second.
const KNOWN_HEADINGS: &[(&str, u32)] = &[
    ("软件需求规格说明", 1),
    ("范围", 1),
    ("标识", 2),
    ("系统概述", 2),
    ("文档概述", 2),
    ("引用文档", 1),
    ("需求", 1),
    ("要求的状态和方式", 2),
    ("能力需求", 2),
    ("外部接口需求", 2),
    ("内部接口需求", 2),
    ("系统的内部数据需求", 2),
    ("适应性需求", 2),
    ("保密性需求", 2),
    ("安全性需求", 2),
    ("环境适应性需求", 2),
    ("其他质量特性", 2),
    ("计算机资源需求", 2),
    ("设计和实现约束", 2),
    ("人员相关需求", 2),
    ("训练相关需求", 2),
    ("软件保障需求", 2),
    ("包装需求", 2),
    ("需求的优先顺序和关键程度", 2),
    ("其他需求", 2),
    ("合格性规定", 1),
    ("合格性方法", 2),
    ("合格性级别", 2),
    ("需求可追踪性", 1),
    ("注释", 1),
    ("Software Requirements Specification", 1),
    ("Scope", 1),
    ("Identification", 2),
    ("System overview", 2),
    ("Document overview", 2),
    ("Referenced documents", 1),
    ("Requirements", 1),
    ("Required states and modes", 2),
    ("Capability requirements", 2),
    ("External interface requirements", 2),
    ("Internal interface requirements", 2),
    ("Internal data requirements", 2),
    ("Adaptation requirements", 2),
    ("Security requirements", 2),
    ("Safety requirements", 2),
    ("Environment requirements", 2),
    ("Other quality characteristics", 2),
    ("Computer resource requirements", 2),
    ("Design and implementation constraints", 2),
    ("Personnel-related requirements", 2),
    ("Training-related requirements", 2),
    ("Software support requirements", 2),
    ("Packaging requirements", 2),
    ("Precedence and criticality of requirements", 2),
    ("Other requirements", 2),
    ("Qualification provisions", 1),
    ("Qualification methods", 2),
    ("Qualification levels", 2),
    ("Requirements traceability", 1),
    ("Notes", 1),
];

/// Outcome of classifying a single paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Heading {
        level: u32,
        section_number: Option<String>,
    },
    Content,
}

/// Decides whether a paragraph is a section heading.
///
/// Strategies run in a fixed order and the first match wins:
/// exact known section name, numeric prefix, heading style, table-of-contents style.
#[derive(Debug, Clone)]
pub struct HeadingClassifier {
    known_headings: HashMap<String, u32>,
}

impl Default for HeadingClassifier {
    fn default() -> Self {
        Self::with_known_headings(
            KNOWN_HEADINGS
                .iter()
                .map(|(name, level)| ((*name).to_string(), *level)),
        )
    }
}

impl HeadingClassifier {
    pub fn with_known_headings(headings: impl IntoIterator<Item = (String, u32)>) -> Self {
        Self {
            known_headings: headings
                .into_iter()
                .map(|(name, level)| (name, level.max(1)))
                .collect(),
        }
    }

    pub fn classify(&self, paragraph: &ParagraphUnit) -> Classification {
        let text = paragraph.text.trim();

        if let Some(level) = self.known_headings.get(text) {
            return Classification::Heading {
                level: *level,
                section_number: None,
            };
        }

        if let Some(section) = numbered_prefix(text) {
            return Classification::Heading {
                level: section_depth(section),
                section_number: Some(section.to_string()),
            };
        }

        if let Some(style) = paragraph.style_hint.as_deref() {
            if let Some(level) = style_level(style, HEADING_STYLE_MARKERS) {
                return Classification::Heading {
                    level,
                    section_number: None,
                };
            }
            if let Some(level) = style_level(style, TOC_STYLE_MARKERS) {
                return Classification::Heading {
                    level,
                    section_number: None,
                };
            }
        }

        Classification::Content
    }

    /// Classify a paragraph stream. Runs of consecutive content paragraphs are
    /// merged into one content line joined by single spaces.
    pub fn classify_paragraphs(&self, paragraphs: &[ParagraphUnit]) -> Vec<ClassifiedLine> {
        let mut lines: Vec<ClassifiedLine> = Vec::new();
        for paragraph in paragraphs {
            let text = paragraph.text.trim();
            if text.is_empty() {
                continue;
            }
            match self.classify(paragraph) {
                Classification::Heading {
                    level,
                    section_number,
                } => {
                    trace!(level, section = ?section_number, "heading detected");
                    lines.push(ClassifiedLine::heading(text, level, section_number));
                }
                Classification::Content => match lines.last_mut() {
                    Some(last) if last.kind == LineKind::Content => {
                        last.text.push(' ');
                        last.text.push_str(text);
                    }
                    _ => lines.push(ClassifiedLine::content(text)),
                },
            }
        }
        lines
    }
}

/// Dotted numeric prefix of a numbered heading (`"3.2.1 Title"` -> `"3.2.1"`).
pub fn numbered_prefix(text: &str) -> Option<&str> {
    NUMBERED_HEADING
        .captures(text.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Heading text with any numeric prefix removed.
pub fn heading_title(text: &str) -> &str {
    let text = text.trim();
    match NUMBERED_HEADING.captures(text).and_then(|caps| caps.get(2)) {
        Some(title) => title.as_str().trim(),
        None => text,
    }
}

/// Number of components in a dotted section number.
pub fn section_depth(section: &str) -> u32 {
    u32::try_from(section.split('.').count()).unwrap_or(u32::MAX)
}

fn style_level(style: &str, markers: &[&str]) -> Option<u32> {
    let style = style.trim();
    let lowered = style.to_lowercase();
    if !markers.iter().any(|marker| lowered.starts_with(marker)) {
        return None;
    }
    let digits_start = style
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx);
    let level = digits_start
        .and_then(|idx| style[idx..].parse::<u32>().ok())
        .filter(|level| *level > 0)
        .unwrap_or(1);
    Some(level.min(MAX_STYLE_LEVEL))
}
