use std::{collections::HashMap, fmt::Write};

use colored::Colorize;
use serde::Serialize;

use crate::document::tree::RequirementNode;
use crate::pipeline::{CheckOutcome, ParseOutcome, ValidationOutcome};
use crate::rules::{RuleBook, RuleEntry, RuleSource};
use crate::validate::ValidationVerdict;

/// Format styles for validation and rule listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Format styles for requirement trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeFormat {
    Human,
    Json,
    Yaml,
}

const SNIPPET_CHARS: usize = 60;

pub fn render_parse(outcome: &ParseOutcome, format: TreeFormat) -> anyhow::Result<String> {
    match format {
        TreeFormat::Human => {
            let mut out = String::new();
            writeln!(
                out,
                "Document {}{}",
                outcome.doc_id.bold(),
                cached_marker(outcome.cached)
            )?;
            writeln!(out, "Fingerprint: {}", outcome.fingerprint)?;
            writeln!(out, "Nodes: {}", outcome.tree.node_count() - 1)?;
            writeln!(out)?;
            out.push_str(&render_outline(&outcome.tree)?);
            Ok(out)
        }
        TreeFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        TreeFormat::Yaml => Ok(serde_yaml::to_string(outcome)?),
    }
}

/// Indented outline: one line per node with its section number and id.
pub fn render_outline(tree: &RequirementNode) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", tree.label.bold())?;
    let mut stack: Vec<(&RequirementNode, usize)> =
        tree.children.iter().rev().map(|child| (child, 1)).collect();
    while let Some((node, depth)) = stack.pop() {
        let section = node
            .section_number
            .as_deref()
            .map(|s| format!("{s} "))
            .unwrap_or_default();
        write!(
            out,
            "{indent}{section}{label} {id}",
            indent = "  ".repeat(depth),
            label = node.label,
            id = format!("({})", node.id).dimmed(),
        )?;
        if let Some(content) = node.content.as_deref().filter(|c| !c.is_empty()) {
            write!(out, ": {}", snippet(content))?;
        }
        writeln!(out)?;
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    Ok(out)
}

pub fn render_validation(outcome: &ValidationOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_validation_human(outcome),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

pub fn render_check(outcome: &CheckOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => {
            let mut out = String::new();
            writeln!(
                out,
                "Parsed {} ({} nodes){}",
                outcome.parse.tree.label,
                outcome.parse.tree.node_count() - 1,
                cached_marker(outcome.parse.cached)
            )?;
            out.push_str(&render_validation_human(&outcome.validation)?);
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

fn render_validation_human(outcome: &ValidationOutcome) -> anyhow::Result<String> {
    let mut out = String::new();
    let summary = &outcome.summary;
    writeln!(
        out,
        "Validation of {}{}",
        outcome.doc_id.bold(),
        cached_marker(outcome.cached)
    )?;
    writeln!(
        out,
        "Summary: {} verdicts, {} compliant, {} non-compliant, {} defaulted",
        summary.total,
        summary.compliant.to_string().green(),
        summary.non_compliant.to_string().red(),
        summary.defaulted.to_string().yellow()
    )?;
    writeln!(out)?;

    let depths = verdict_depths(&outcome.verdicts);
    for verdict in &outcome.verdicts {
        let depth = depths.get(verdict.node_id.as_str()).copied().unwrap_or(0);
        let status = if !verdict.compliant {
            "FAIL".red().bold()
        } else if verdict.defaulted {
            "PASS?".yellow()
        } else {
            "PASS".green()
        };
        writeln!(
            out,
            "{indent}[{status}] {name} {id}",
            indent = "  ".repeat(depth),
            name = verdict.node_name,
            id = format!("({})", verdict.node_id).dimmed(),
        )?;
        if !verdict.reason.trim().is_empty() {
            writeln!(
                out,
                "{indent}    {reason}",
                indent = "  ".repeat(depth),
                reason = sanitize(&verdict.reason)
            )?;
        }
    }
    Ok(out)
}

/// Depth of each verdict's node, derived from `parent_id` (verdicts are pre-order).
fn verdict_depths(verdicts: &[ValidationVerdict]) -> HashMap<&str, usize> {
    let mut depths: HashMap<&str, usize> = HashMap::new();
    for verdict in verdicts {
        let depth = verdict
            .parent_id
            .as_deref()
            .and_then(|parent| depths.get(parent))
            .map(|depth| depth + 1)
            .unwrap_or(0);
        depths.insert(verdict.node_id.as_str(), depth);
    }
    depths
}

pub fn render_rules(rules: &RuleBook, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => {
            let mut out = String::new();
            let source = match rules.source() {
                RuleSource::File(path) => path.display().to_string(),
                RuleSource::Embedded => "built-in Appendix J".to_string(),
            };
            writeln!(out, "{} rule(s) loaded from {}", rules.len(), source)?;
            for entry in rules.entries() {
                writeln!(
                    out,
                    "- {section:<6} {title} :: {text}",
                    section = entry.section,
                    title = entry.title.bold(),
                    text = snippet(&entry.text)
                )?;
            }
            Ok(out)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&JsonRules::from(rules))?),
    }
}

#[derive(Debug, Serialize)]
struct JsonRules<'a> {
    source: &'a RuleSource,
    rules: &'a [RuleEntry],
}

impl<'a> From<&'a RuleBook> for JsonRules<'a> {
    fn from(rules: &'a RuleBook) -> Self {
        Self {
            source: rules.source(),
            rules: rules.entries(),
        }
    }
}

fn cached_marker(cached: bool) -> String {
    if cached {
        format!(" {}", "(cached)".cyan())
    } else {
        String::new()
    }
}

fn sanitize(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            _ => c,
        })
        .collect()
}

fn snippet(input: &str) -> String {
    let clean = sanitize(input);
    if clean.chars().count() <= SNIPPET_CHARS {
        return clean;
    }
    clean.chars().take(SNIPPET_CHARS).collect::<String>() + "…"
}
