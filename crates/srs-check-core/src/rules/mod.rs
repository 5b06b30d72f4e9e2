use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

mod default_corpus;
pub mod file_repository;

/// Rule text handed to the oracle when nothing in the corpus applies.
pub const NO_MATCHING_RULE: &str = "No matching rule";

#[allow(clippy::expect_used)]
static CORPUS_SECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)*)\.?\s*([^\d\s.].*)$").expect("corpus section regex is valid")
});

/// One normative rule of the appendix corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    /// Dotted section number (`"3.2"`).
    pub section: String,
    /// Canonical section name, used as display label for matching headings.
    pub title: String,
    /// Alternative section names accepted by name-based lookup.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Normative text, starting with the title.
    pub text: String,
}

/// Where the active rule corpus came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum RuleSource {
    File(PathBuf),
    Embedded,
}

/// Which lookup step produced a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatch {
    Exact,
    Ancestor,
    Name,
}

/// The loaded appendix corpus. Immutable once built.
#[derive(Debug, Clone)]
pub struct RuleBook {
    entries: Vec<RuleEntry>,
    by_section: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    source: RuleSource,
}

impl RuleBook {
    pub fn new(entries: Vec<RuleEntry>, source: RuleSource) -> Self {
        let mut by_section = HashMap::new();
        let mut by_name = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if by_section.insert(entry.section.clone(), idx).is_some() {
                debug!(section = %entry.section, "duplicate corpus section; keeping the later entry");
            }
            by_name.insert(entry.title.clone(), idx);
            for alias in &entry.aliases {
                by_name.insert(alias.clone(), idx);
            }
        }
        Self {
            entries,
            by_section,
            by_name,
            source,
        }
    }

    /// The built-in GJB 438C Appendix J corpus.
    pub fn embedded() -> Self {
        let entries = default_corpus::APPENDIX_J
            .iter()
            .map(|(section, title, alias, text)| RuleEntry {
                section: (*section).to_string(),
                title: (*title).to_string(),
                aliases: vec![(*alias).to_string()],
                text: (*text).to_string(),
            })
            .collect();
        Self::new(entries, RuleSource::Embedded)
    }

    /// Parse a flat corpus: a line starting with a dotted number opens an entry,
    /// other lines extend the current entry. Blank lines and text before the
    /// first numbered line are ignored.
    pub fn parse(text: &str, source: RuleSource) -> Self {
        let mut entries: Vec<RuleEntry> = Vec::new();
        for line in text.trim_start_matches('\u{feff}').lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(caps) = CORPUS_SECTION.captures(line) {
                let title = caps[2].trim().to_string();
                entries.push(RuleEntry {
                    section: caps[1].to_string(),
                    text: title.clone(),
                    title,
                    aliases: Vec::new(),
                });
            } else if let Some(current) = entries.last_mut() {
                current.text.push(' ');
                current.text.push_str(line);
            }
        }
        Self::new(entries, source)
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.by_section.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_section.is_empty()
    }

    pub fn get(&self, section: &str) -> Option<&RuleEntry> {
        self.by_section.get(section).map(|idx| &self.entries[*idx])
    }

    /// Canonical name registered for an exact section number.
    pub fn canonical_name(&self, section: &str) -> Option<&str> {
        self.get(section).map(|entry| entry.title.as_str())
    }

    /// Display label for a numbered heading: the source-language alias when
    /// the heading is written in CJK script and the entry has one, else the
    /// canonical title.
    pub fn display_name(&self, section: &str, heading: &str) -> Option<&str> {
        let entry = self.get(section)?;
        if is_cjk_text(heading) {
            if let Some(alias) = entry.aliases.iter().find(|alias| is_cjk_text(alias)) {
                return Some(alias.as_str());
            }
        }
        Some(entry.title.as_str())
    }

    /// Find the rule for a node: exact section, then each ancestor section
    /// (`3.2.1` -> `3.2` -> `3`), then the node name.
    pub fn lookup(&self, section: Option<&str>, name: &str) -> Option<(&RuleEntry, RuleMatch)> {
        if let Some(section) = section {
            if let Some(entry) = self.get(section) {
                return Some((entry, RuleMatch::Exact));
            }
            let mut prefix = section;
            while let Some((parent, _)) = prefix.rsplit_once('.') {
                if let Some(entry) = self.get(parent) {
                    return Some((entry, RuleMatch::Ancestor));
                }
                prefix = parent;
            }
        }
        self.by_name
            .get(name.trim())
            .map(|idx| (&self.entries[*idx], RuleMatch::Name))
    }

    /// Rule text for a node, or [`NO_MATCHING_RULE`].
    pub fn resolve(&self, section: Option<&str>, name: &str) -> &str {
        self.lookup(section, name)
            .map(|(entry, _)| entry.text.as_str())
            .unwrap_or(NO_MATCHING_RULE)
    }
}

fn is_cjk_text(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(
            c,
            '\u{3400}'..='\u{4dbf}' | '\u{4e00}'..='\u{9fff}' | '\u{f900}'..='\u{faff}'
        )
    })
}

/// Abstraction over corpus loading so files and the built-in table can be swapped.
#[async_trait]
pub trait RuleRepository: Send + Sync {
    /// Load the corpus. Implementations cache the result.
    async fn load_rules(&self) -> AnyResult<Arc<RuleBook>>;
}

/// Always yields the built-in corpus.
#[derive(Debug, Default)]
pub struct EmbeddedRuleRepository;

#[async_trait]
impl RuleRepository for EmbeddedRuleRepository {
    async fn load_rules(&self) -> AnyResult<Arc<RuleBook>> {
        Ok(Arc::new(RuleBook::embedded()))
    }
}

/// Load from `repo`, falling back to the built-in corpus on any failure.
pub async fn load_or_default(repo: &dyn RuleRepository) -> Arc<RuleBook> {
    match repo.load_rules().await {
        Ok(book) => book,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "rule corpus unavailable; using built-in Appendix J rules");
            Arc::new(RuleBook::embedded())
        }
    }
}
