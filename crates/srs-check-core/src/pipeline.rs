use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cache::{fingerprint, ContentCache};
use crate::document::{
    classifier::HeadingClassifier, extract::extract_paragraphs, normalized_text,
    tree::{RequirementNode, TreeBuilder},
};
use crate::llm::LlmClient;
use crate::rules::RuleBook;
use crate::store::ArtifactStore;
use crate::validate::{BatchValidator, ValidationOptions, ValidationSummary, ValidationVerdict};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub doc_id: String,
    pub fingerprint: String,
    /// `true` when the tree came from the content cache.
    pub cached: bool,
    pub tree: RequirementNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub doc_id: String,
    /// `true` when the verdicts were loaded from an earlier run.
    pub cached: bool,
    pub summary: ValidationSummary,
    pub verdicts: Vec<ValidationVerdict>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub parse: ParseOutcome,
    pub validation: ValidationOutcome,
}

/// Parse-then-validate orchestration over one data directory.
///
/// Artifacts of a stage (tree plus cache entry, or verdicts) are written only
/// once that stage has fully completed, so dropping an in-flight future
/// leaves the store untouched.
pub struct Pipeline {
    rules: Arc<RuleBook>,
    classifier: HeadingClassifier,
    store: ArtifactStore,
    cache: ContentCache,
    validator: BatchValidator,
}

impl Pipeline {
    pub fn new(
        store: ArtifactStore,
        rules: Arc<RuleBook>,
        client: Arc<dyn LlmClient>,
        options: ValidationOptions,
    ) -> Result<Self> {
        let validator = BatchValidator::new(client, options)?;
        let cache = ContentCache::open(store.cache_index_path());
        Ok(Self {
            rules,
            classifier: HeadingClassifier::default(),
            store,
            cache,
            validator,
        })
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Extract and structure a document, reusing the stored tree when the same
    /// content was parsed before.
    #[instrument(name = "parse_document", skip(self, path), fields(path = %path.display()))]
    pub async fn parse(&self, path: &Path) -> Result<ParseOutcome> {
        let paragraphs = extract_paragraphs(path)?;
        let document_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let fingerprint = fingerprint(&normalized_text(&paragraphs));

        let mut doc_id = None;
        if let Some(known) = self.cache.lookup(&fingerprint).await {
            match self.store.load_tree(&known) {
                Ok(mut tree) => {
                    tree.label = document_name;
                    info!(doc_id = %known, "content cache hit");
                    return Ok(ParseOutcome {
                        doc_id: known,
                        fingerprint,
                        cached: true,
                        tree,
                    });
                }
                Err(err) => {
                    warn!(doc_id = %known, error = %err, "cached tree unavailable; parsing again");
                    doc_id = Some(known);
                }
            }
        }

        let lines = self.classifier.classify_paragraphs(&paragraphs);
        let tree = TreeBuilder::new(&self.rules).build(&document_name, &lines);
        tree.validate()
            .context("constructed requirement tree violates its invariants")?;

        let doc_id = doc_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        self.store.save_tree(&doc_id, &tree)?;
        let doc_id = self.cache.store(&fingerprint, &doc_id).await?;
        info!(doc_id = %doc_id, nodes = tree.node_count(), "document parsed");
        Ok(ParseOutcome {
            doc_id,
            fingerprint,
            cached: false,
            tree,
        })
    }

    /// Validate a stored tree, returning earlier verdicts when they exist.
    /// A stored set holding defaulted verdicts is not reused, so nodes the
    /// oracle never judged are asked about again.
    #[instrument(name = "validate_document", skip(self))]
    pub async fn validate(&self, doc_id: &str) -> Result<ValidationOutcome> {
        let tree = self.store.load_tree(doc_id)?;
        match self.store.find_verdicts(doc_id) {
            Ok(Some(verdicts)) if verdicts.iter().any(|verdict| verdict.defaulted) => {
                info!("stored verdicts include defaulted nodes; validating again");
            }
            Ok(Some(verdicts)) => {
                info!(verdicts = verdicts.len(), "reusing stored verdicts");
                return Ok(ValidationOutcome {
                    doc_id: doc_id.to_string(),
                    cached: true,
                    summary: ValidationSummary::from_verdicts(&verdicts),
                    verdicts,
                });
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "stored verdicts unusable; validating again"),
        }

        let report = self.validator.validate(&tree, &self.rules).await;
        self.store.save_verdicts(doc_id, &report.verdicts)?;
        Ok(ValidationOutcome {
            doc_id: doc_id.to_string(),
            cached: false,
            summary: report.summary,
            verdicts: report.verdicts,
        })
    }

    /// Parse then validate.
    pub async fn check(&self, path: &Path) -> Result<CheckOutcome> {
        let parse = self.parse(path).await?;
        let validation = self.validate(&parse.doc_id).await?;
        Ok(CheckOutcome { parse, validation })
    }
}
