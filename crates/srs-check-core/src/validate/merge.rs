use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{response::OracleItem, ValidationVerdict};
use crate::document::tree::{NodeRef, RequirementNode};

pub const ROOT_REASON: &str = "No applicable rule for the root node.";
pub const DEFAULT_REASON: &str =
    "LLM validation is temporarily unavailable; marked compliant by default.";

/// Verdict counts over a merged list, root included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    /// Verdicts synthesized because the oracle gave nothing usable.
    pub defaulted: usize,
}

impl ValidationSummary {
    pub fn from_verdicts(verdicts: &[ValidationVerdict]) -> Self {
        verdicts.iter().fold(Self::default(), |mut summary, verdict| {
            summary.total += 1;
            if verdict.compliant {
                summary.compliant += 1;
            } else {
                summary.non_compliant += 1;
            }
            if verdict.defaulted {
                summary.defaulted += 1;
            }
            summary
        })
    }
}

/// Accumulates per-batch oracle output into the final verdict list.
///
/// The root verdict always comes first; node verdicts follow in the order
/// batches are pushed.
#[derive(Debug)]
pub struct ResultMerger {
    verdicts: Vec<ValidationVerdict>,
}

impl ResultMerger {
    pub fn new(root: &RequirementNode) -> Self {
        Self {
            verdicts: vec![ValidationVerdict {
                node_id: root.id.clone(),
                node_name: root.label.clone(),
                compliant: true,
                reason: ROOT_REASON.to_string(),
                parent_id: None,
                defaulted: false,
            }],
        }
    }

    /// Merge one batch. `items == None` means the oracle was unavailable or
    /// its answer unparsable; every node of the batch is then defaulted.
    pub fn push_batch(&mut self, nodes: &[NodeRef<'_>], items: Option<Vec<OracleItem>>) {
        let mut by_id: HashMap<String, OracleItem> = HashMap::new();
        for item in items.into_iter().flatten() {
            by_id.entry(item.id.clone()).or_insert(item);
        }

        let mut matched = 0usize;
        for node_ref in nodes {
            let node = node_ref.node;
            let verdict = match by_id.remove(&node.id) {
                Some(item) => {
                    matched += 1;
                    ValidationVerdict {
                        node_id: node.id.clone(),
                        node_name: node.label.clone(),
                        compliant: item.compliant,
                        reason: item.reason,
                        parent_id: node_ref.parent_id.map(str::to_string),
                        defaulted: false,
                    }
                }
                None => default_verdict(node_ref),
            };
            self.verdicts.push(verdict);
        }
        if !by_id.is_empty() {
            debug!(unknown = by_id.len(), "ignoring oracle items with unknown node ids");
        }
        debug!(nodes = nodes.len(), matched, "batch merged");
    }

    pub fn finish(self) -> (Vec<ValidationVerdict>, ValidationSummary) {
        let summary = ValidationSummary::from_verdicts(&self.verdicts);
        (self.verdicts, summary)
    }
}

fn default_verdict(node_ref: &NodeRef<'_>) -> ValidationVerdict {
    ValidationVerdict {
        node_id: node_ref.node.id.clone(),
        node_name: node_ref.node.label.clone(),
        compliant: true,
        reason: DEFAULT_REASON.to_string(),
        parent_id: node_ref.parent_id.map(str::to_string),
        defaulted: true,
    }
}
