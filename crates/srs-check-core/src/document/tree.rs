use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::{classifier::heading_title, ClassifiedLine, LineKind};
use crate::error::NodeValidationError;
use crate::rules::RuleBook;

pub const ROOT_ID: &str = "root";
const PLACEHOLDER_ID: &str = "default_0";
const PLACEHOLDER_SECTION: &str = "3";
const PLACEHOLDER_LABEL: &str = "Requirements";

/// A section of the requirement tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementNode {
    /// Unique within a tree; assigned in document order during construction.
    pub id: String,
    /// Canonical corpus name for the section number, else the heading text.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_number: Option<String>,
    /// The heading line as it appeared in the source document.
    #[serde(default)]
    pub original_text: String,
    /// Body text directly under this heading; `None` for structural nodes.
    pub content: Option<String>,
    /// Depth in the outline; the synthetic root is level 0.
    pub level: u32,
    #[serde(default)]
    pub children: Vec<RequirementNode>,
}

/// A node visited during a pre-order walk, with its parent's id.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub node: &'a RequirementNode,
    pub parent_id: Option<&'a str>,
}

impl RequirementNode {
    pub fn root(document_name: impl Into<String>) -> Self {
        let name = document_name.into();
        Self {
            id: ROOT_ID.to_string(),
            label: name.clone(),
            section_number: None,
            original_text: name,
            content: None,
            level: 0,
            children: Vec::new(),
        }
    }

    /// Pre-order walk (parent before children, children in document order).
    pub fn walk(&self) -> Vec<NodeRef<'_>> {
        let mut visited = Vec::new();
        let mut stack = vec![NodeRef {
            node: self,
            parent_id: None,
        }];
        while let Some(current) = stack.pop() {
            for child in current.node.children.iter().rev() {
                stack.push(NodeRef {
                    node: child,
                    parent_id: Some(current.node.id.as_str()),
                });
            }
            visited.push(current);
        }
        visited
    }

    /// Total number of nodes including this one.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(RequirementNode::node_count)
            .sum::<usize>()
    }

    /// Check the structural invariants of a tree rooted at `self`.
    pub fn validate(&self) -> Result<(), NodeValidationError> {
        if self.level != 0 {
            return Err(NodeValidationError::RootLevel { level: self.level });
        }
        let mut seen = HashSet::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.id.trim().is_empty() {
                return Err(NodeValidationError::EmptyId);
            }
            if !seen.insert(node.id.as_str()) {
                return Err(NodeValidationError::DuplicateId {
                    id: node.id.clone(),
                });
            }
            for child in &node.children {
                if child.level <= node.level {
                    return Err(NodeValidationError::LevelNotDeeper {
                        id: child.id.clone(),
                        level: child.level,
                        parent_level: node.level,
                    });
                }
                if let (Some(parent_section), Some(section)) =
                    (node.section_number.as_deref(), child.section_number.as_deref())
                {
                    if !refines(parent_section, section) {
                        return Err(NodeValidationError::SectionNotRefined {
                            id: child.id.clone(),
                            section: section.to_string(),
                            parent_section: parent_section.to_string(),
                        });
                    }
                }
                stack.push(child);
            }
        }
        Ok(())
    }
}

/// Builds the requirement tree from classified lines.
///
/// `frontier[L]` remembers which node owns the sibling list that received the
/// last level-`L` heading; a level-`L` heading attaches to the last node of
/// `frontier[L - 1]`. Headings without a usable parent go to the root.
pub struct TreeBuilder<'r> {
    rules: &'r RuleBook,
}

type NodePath = Vec<usize>;

impl<'r> TreeBuilder<'r> {
    pub fn new(rules: &'r RuleBook) -> Self {
        Self { rules }
    }

    #[instrument(name = "build_tree", skip(self, lines), fields(lines = lines.len()))]
    pub fn build(&self, document_name: &str, lines: &[ClassifiedLine]) -> RequirementNode {
        let mut root = RequirementNode::root(document_name);
        let mut frontier: Vec<Option<NodePath>> = Vec::new();
        let mut open: Option<NodePath> = None;
        let mut headings = 0usize;

        for line in lines {
            match line.kind {
                LineKind::Heading => {
                    let level = line.level.unwrap_or(1).max(1);
                    let node = self.heading_node(headings, line, level);
                    headings += 1;

                    let owner = match Self::parent_path(&root, &frontier, &node) {
                        Some(path) => path,
                        None => {
                            warn!(
                                id = %node.id,
                                level,
                                section = ?node.section_number,
                                "heading has no open parent section; attaching to root"
                            );
                            NodePath::new()
                        }
                    };

                    let parent = node_at_mut(&mut root, &owner);
                    parent.children.push(node);
                    let mut path = owner.clone();
                    path.push(parent.children.len() - 1);

                    let slot = level as usize;
                    if frontier.len() <= slot {
                        frontier.resize(slot + 1, None);
                    }
                    frontier[slot] = Some(owner);
                    frontier.truncate(slot + 1);
                    open = Some(path);
                }
                LineKind::Content => match open.as_deref() {
                    Some(path) => append_content(node_at_mut(&mut root, path), &line.text),
                    None => debug!(
                        chars = line.text.chars().count(),
                        "discarding text before first heading"
                    ),
                },
            }
        }

        if headings == 0 {
            debug!("no headings recognised; using placeholder section");
            root.children.push(self.placeholder());
        }
        root
    }

    fn heading_node(&self, ordinal: usize, line: &ClassifiedLine, level: u32) -> RequirementNode {
        let title = heading_title(&line.text);
        let label = line
            .section_number
            .as_deref()
            .and_then(|section| self.rules.display_name(section, title))
            .unwrap_or(title)
            .to_string();
        RequirementNode {
            id: format!("node_{ordinal}"),
            label,
            section_number: line.section_number.clone(),
            original_text: line.text.clone(),
            content: None,
            level,
            children: Vec::new(),
        }
    }

    fn placeholder(&self) -> RequirementNode {
        let label = self
            .rules
            .canonical_name(PLACEHOLDER_SECTION)
            .unwrap_or(PLACEHOLDER_LABEL)
            .to_string();
        RequirementNode {
            id: PLACEHOLDER_ID.to_string(),
            original_text: label.clone(),
            label,
            section_number: None,
            content: None,
            level: 1,
            children: Vec::new(),
        }
    }

    fn parent_path(
        root: &RequirementNode,
        frontier: &[Option<NodePath>],
        node: &RequirementNode,
    ) -> Option<NodePath> {
        if node.level == 1 {
            return Some(NodePath::new());
        }
        let owner = frontier.get(node.level as usize - 1)?.as_ref()?;
        let siblings = &node_at(root, owner).children;
        let candidate = siblings.last()?;
        // The last sibling may itself be a reparented deeper heading.
        if candidate.level >= node.level {
            return None;
        }
        if let (Some(parent_section), Some(section)) = (
            candidate.section_number.as_deref(),
            node.section_number.as_deref(),
        ) {
            if !refines(parent_section, section) {
                return None;
            }
        }
        let mut path = owner.clone();
        path.push(siblings.len() - 1);
        Some(path)
    }
}

/// `true` when `parent` is a proper dotted prefix of `child` (`3.2` of `3.2.1`).
pub fn refines(parent: &str, child: &str) -> bool {
    child
        .strip_prefix(parent)
        .is_some_and(|rest| rest.len() > 1 && rest.starts_with('.'))
}

fn append_content(node: &mut RequirementNode, text: &str) {
    match node.content.as_mut() {
        Some(existing) if !existing.is_empty() => {
            existing.push(' ');
            existing.push_str(text);
        }
        _ => node.content = Some(text.to_string()),
    }
}

fn node_at<'a>(root: &'a RequirementNode, path: &[usize]) -> &'a RequirementNode {
    path.iter().fold(root, |node, idx| &node.children[*idx])
}

fn node_at_mut<'a>(root: &'a mut RequirementNode, path: &[usize]) -> &'a mut RequirementNode {
    path.iter().fold(root, |node, idx| &mut node.children[*idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{
        classifier::HeadingClassifier, extract::PlainTextExtractor, ParagraphUnit,
    };
    use proptest::prelude::*;

    fn build(text: &str) -> RequirementNode {
        build_paragraphs(&PlainTextExtractor::paragraphs_from_str(text))
    }

    fn build_paragraphs(paragraphs: &[ParagraphUnit]) -> RequirementNode {
        let rules = RuleBook::embedded();
        let lines = HeadingClassifier::default().classify_paragraphs(paragraphs);
        TreeBuilder::new(&rules).build("spec.txt", &lines)
    }

    #[test]
    fn builds_scope_and_identification() {
        let tree = build("1 Scope\nSome body text.\n1.1 Identification\nMore text.");
        assert_eq!(tree.id, ROOT_ID);
        assert_eq!(tree.label, "spec.txt");
        assert_eq!(tree.children.len(), 1);

        let scope = &tree.children[0];
        assert_eq!(scope.label, "Scope");
        assert_eq!(scope.level, 1);
        assert_eq!(scope.content.as_deref(), Some("Some body text."));
        assert_eq!(scope.children.len(), 1);

        let ident = &scope.children[0];
        assert_eq!(ident.label, "Identification");
        assert_eq!(ident.level, 2);
        assert_eq!(ident.section_number.as_deref(), Some("1.1"));
        assert_eq!(ident.content.as_deref(), Some("More text."));
        tree.validate().unwrap();
    }

    #[test]
    fn canonical_names_replace_heading_text() {
        let tree = build("3 Requirements\n3.2 Functions\nbody");
        let requirements = &tree.children[0];
        assert_eq!(requirements.label, "Requirements");
        assert_eq!(requirements.children[0].label, "CSCI capability requirements");
    }

    #[test]
    fn chinese_headings_keep_chinese_canonical_names() {
        let tree = build("3 需求\n3.2 功能\nbody");
        let requirements = &tree.children[0];
        assert_eq!(requirements.label, "需求");
        assert_eq!(requirements.original_text, "3 需求");
        assert_eq!(requirements.children[0].label, "CSCI能力需求");
    }

    #[test]
    fn unmapped_sections_keep_heading_title() {
        let tree = build("3 Requirements\n3.2 Capabilities\n3.2.1 Gyro sampling\nSample at 1 kHz.");
        let leaf = &tree.children[0].children[0].children[0];
        assert_eq!(leaf.label, "Gyro sampling");
        assert_eq!(leaf.content.as_deref(), Some("Sample at 1 kHz."));
    }

    #[test]
    fn skipped_level_attaches_to_root() {
        let tree = build("1 Scope\n2.1.1 Orphan\nbody");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[1].section_number.as_deref(), Some("2.1.1"));
        assert_eq!(tree.children[1].level, 3);
        tree.validate().unwrap();
    }

    #[test]
    fn non_refining_number_attaches_to_root() {
        // `2.1` must not become a child of `1` just because `2` is missing.
        let tree = build("1 Scope\n2.1 Stray");
        assert_eq!(tree.children.len(), 2);
        assert!(tree.children[0].children.is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn shallower_style_heading_after_orphan_attaches_to_root() {
        let tree = build_paragraphs(&[
            ParagraphUnit::styled("Alpha", "Heading 1"),
            ParagraphUnit::styled("Deep orphan", "Heading 3"),
            ParagraphUnit::styled("Beta", "Heading 2"),
        ]);
        let labels: Vec<_> = tree.children.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, ["Alpha", "Deep orphan", "Beta"]);
        assert!(tree.children[1].children.is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn known_name_after_numbered_orphan_attaches_to_root() {
        let tree = build("1 Scope\nbody\n3.1.1 Orphan\n标识\nmore");
        assert_eq!(tree.children.len(), 3);
        assert!(tree.children[1].children.is_empty());
        assert_eq!(tree.children[2].original_text, "标识");
        assert_eq!(tree.children[2].level, 2);
        assert_eq!(tree.children[2].content.as_deref(), Some("more"));
        tree.validate().unwrap();
    }

    #[test]
    fn huge_style_level_builds_shallow_frontier() {
        let tree = build_paragraphs(&[
            ParagraphUnit::styled("Alpha", "Heading 1"),
            ParagraphUnit::styled("Runaway", "Heading 4000000000"),
        ]);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[1].level, 9);
        tree.validate().unwrap();
    }

    #[test]
    fn closed_sections_are_not_reused_as_parents() {
        let tree = build("1 A\n1.1 B\n2 C\n2.1.1 D");
        // `2.1.1` skips `2.1`; it must not attach beneath `1.1`.
        assert!(tree.children[0].children[0].children.is_empty());
        assert_eq!(tree.children.len(), 3);
        assert_eq!(tree.children[2].original_text, "2.1.1 D");
    }

    #[test]
    fn reparented_node_becomes_parent_for_next_level() {
        let tree = build("3.1.1 Deep\n3.1.1.1 Deeper");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].children[0].original_text, "3.1.1.1 Deeper");
    }

    #[test]
    fn no_headings_yields_placeholder() {
        let tree = build("just prose\nmore prose");
        assert_eq!(tree.children.len(), 1);
        let placeholder = &tree.children[0];
        assert_eq!(placeholder.id, "default_0");
        assert_eq!(placeholder.label, "Requirements");
        assert_eq!(placeholder.level, 1);
        assert!(placeholder.content.is_none());
    }

    #[test]
    fn duplicate_sections_stay_distinct() {
        let tree = build("1 Scope\n1 Scope\n1.1 Identification");
        assert_eq!(tree.children.len(), 2);
        assert_ne!(tree.children[0].id, tree.children[1].id);
        assert!(tree.children[0].children.is_empty());
        assert_eq!(tree.children[1].children.len(), 1);
    }

    #[test]
    fn preamble_is_discarded() {
        let tree = build("Cover page\n1 Scope\nbody");
        assert_eq!(tree.children.len(), 1);
        assert!(tree.content.is_none());
        assert_eq!(tree.children[0].content.as_deref(), Some("body"));
    }

    #[test]
    fn walk_is_preorder_with_parent_ids() {
        let tree = build("1 A\n1.1 B\n1.2 C\n2 D");
        let order: Vec<_> = tree
            .walk()
            .into_iter()
            .map(|r| (r.node.original_text.clone(), r.parent_id.map(str::to_string)))
            .collect();
        assert_eq!(
            order,
            vec![
                ("spec.txt".to_string(), None),
                ("1 A".to_string(), Some("root".to_string())),
                ("1.1 B".to_string(), Some("node_0".to_string())),
                ("1.2 C".to_string(), Some("node_0".to_string())),
                ("2 D".to_string(), Some("root".to_string())),
            ]
        );
    }

    #[test]
    fn validate_rejects_shallow_child() {
        let mut tree = RequirementNode::root("doc");
        let mut child = RequirementNode::root("child");
        child.id = "node_0".into();
        tree.children.push(child);
        assert!(matches!(
            tree.validate(),
            Err(NodeValidationError::LevelNotDeeper { .. })
        ));
    }

    #[test]
    fn refines_requires_dot_boundary() {
        assert!(refines("3", "3.2"));
        assert!(refines("3.2", "3.2.1"));
        assert!(!refines("3", "3"));
        assert!(!refines("3", "31.2"));
        assert!(!refines("3", "3."));
    }

    /// Random well-formed outlines: each heading is either a child of the
    /// previous one or a sibling of it or of one of its ancestors.
    fn outline() -> impl Strategy<Value = Vec<Vec<u32>>> {
        proptest::collection::vec(0usize..4, 1..40).prop_map(|moves| {
            let mut sections: Vec<Vec<u32>> = Vec::new();
            let mut current: Vec<u32> = Vec::new();
            for step in moves {
                if current.is_empty() {
                    current = vec![1];
                } else if step == 0 && current.len() < 6 {
                    current.push(1);
                } else {
                    let keep = current.len().saturating_sub(step.saturating_sub(1)).max(1);
                    current.truncate(keep);
                    if let Some(last) = current.last_mut() {
                        *last += 1;
                    }
                }
                sections.push(current.clone());
            }
            sections
        })
    }

    proptest! {
        #[test]
        fn well_formed_outlines_nest_exactly(sections in outline()) {
            let text = sections
                .iter()
                .map(|parts| {
                    let number = parts.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
                    format!("{number} Heading {number}\nBody of {number}")
                })
                .collect::<Vec<_>>()
                .join("\n");
            let tree = build(&text);

            prop_assert_eq!(tree.node_count() - 1, sections.len());
            prop_assert!(tree.validate().is_ok());
            let levels: std::collections::HashMap<&str, u32> =
                tree.walk().iter().map(|r| (r.node.id.as_str(), r.node.level)).collect();
            for visited in tree.walk().into_iter().skip(1) {
                let parent_level = levels[visited.parent_id.unwrap()];
                prop_assert_eq!(visited.node.level, parent_level + 1);
                prop_assert!(visited.node.content.as_deref().unwrap_or("").starts_with("Body of"));
            }
        }
    }
}
