pub mod merge;
pub mod prompt;
pub mod response;

use std::sync::Arc;

use anyhow::{bail, Result};
use futures::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::document::tree::{NodeRef, RequirementNode};
use crate::llm::{call_optional, LlmClient};
use crate::rules::RuleBook;

pub use merge::{ResultMerger, ValidationSummary, DEFAULT_REASON, ROOT_REASON};
pub use prompt::{build_prompt, PromptNode};
pub use response::{parse_batch_response, OracleItem};

/// Compliance decision for one node. Serialized with the wire names
/// `id`, `name`, `result`, `reason` and `parent_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    #[serde(rename = "id")]
    pub node_id: String,
    #[serde(rename = "name")]
    pub node_name: String,
    #[serde(rename = "result")]
    pub compliant: bool,
    pub reason: String,
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub defaulted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Nodes per oracle call.
    pub batch_size: usize,
    /// Oracle calls in flight at once.
    pub concurrency: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            concurrency: 4,
        }
    }
}

impl ValidationOptions {
    pub fn check(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch size must be at least 1");
        }
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        Ok(())
    }
}

/// Result of validating one tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub verdicts: Vec<ValidationVerdict>,
    pub summary: ValidationSummary,
    pub batches: usize,
}

/// Validates a requirement tree against the rule corpus in batched oracle calls.
pub struct BatchValidator {
    client: Arc<dyn LlmClient>,
    options: ValidationOptions,
}

impl BatchValidator {
    pub fn new(client: Arc<dyn LlmClient>, options: ValidationOptions) -> Result<Self> {
        options.check()?;
        Ok(Self { client, options })
    }

    /// One verdict per node (root first, then pre-order). Never fails: batches
    /// the oracle cannot answer are marked compliant by default.
    #[instrument(name = "validate_tree", skip_all, fields(batch_size = self.options.batch_size))]
    pub async fn validate(&self, tree: &RequirementNode, rules: &RuleBook) -> ValidationReport {
        let nodes: Vec<NodeRef<'_>> = tree.walk().into_iter().skip(1).collect();
        let batches: Vec<&[NodeRef<'_>]> = nodes.chunks(self.options.batch_size).collect();
        let total_batches = batches.len();
        info!(nodes = nodes.len(), batches = total_batches, "validating requirement tree");

        let responses: Vec<Option<Vec<OracleItem>>> = stream::iter(batches.iter().enumerate())
            .map(|(idx, batch)| self.run_batch(idx, total_batches, batch, rules))
            .buffered(self.options.concurrency)
            .collect()
            .await;

        let mut merger = ResultMerger::new(tree);
        for (batch, items) in batches.iter().zip(responses) {
            merger.push_batch(batch, items);
        }
        let (verdicts, summary) = merger.finish();
        info!(
            total = summary.total,
            non_compliant = summary.non_compliant,
            defaulted = summary.defaulted,
            "validation finished"
        );
        ValidationReport {
            verdicts,
            summary,
            batches: total_batches,
        }
    }

    async fn run_batch(
        &self,
        idx: usize,
        total: usize,
        batch: &[NodeRef<'_>],
        rules: &RuleBook,
    ) -> Option<Vec<OracleItem>> {
        let prompt_nodes: Vec<PromptNode<'_>> = batch
            .iter()
            .map(|node_ref| prompt_node(node_ref.node, rules))
            .collect();
        let prompt = build_prompt(&prompt_nodes);
        debug!(batch = idx + 1, of = total, nodes = batch.len(), "dispatching batch");

        let raw = call_optional(self.client.as_ref(), &prompt).await;
        let items = raw.as_deref().and_then(parse_batch_response);
        if raw.is_some() && items.is_none() {
            warn!(batch = idx + 1, "oracle response malformed; defaulting batch to compliant");
        } else if raw.is_none() {
            warn!(batch = idx + 1, "oracle unavailable; defaulting batch to compliant");
        }
        items
    }
}

fn prompt_node<'a>(node: &'a RequirementNode, rules: &'a RuleBook) -> PromptNode<'a> {
    let content = node
        .content
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(node.original_text.as_str());
    PromptNode {
        id: &node.id,
        name: &node.label,
        section_number: node.section_number.as_deref(),
        rule: rules.resolve(node.section_number.as_deref(), &node.label),
        content,
    }
}
