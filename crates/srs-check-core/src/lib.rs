pub mod cache;
pub mod document;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod report;
pub mod rules;
pub mod store;
pub mod validate;

pub use cache::{fingerprint, CacheEntry, ContentCache};
pub use document::{
    classifier::{Classification, HeadingClassifier},
    extract::{extract_paragraphs, DocxExtractor, PlainTextExtractor, TextExtractor},
    normalized_text,
    tree::{NodeRef, RequirementNode, TreeBuilder, ROOT_ID},
    ClassifiedLine, LineKind, ParagraphUnit,
};
pub use error::{ExtractError, NodeValidationError, StoreError};
pub use llm::{
    build_client, call_optional, ChatCompletionsClient, LlmClient, LlmSettings, NoopLlmClient,
    RetryPolicy,
};
pub use pipeline::{CheckOutcome, ParseOutcome, Pipeline, ValidationOutcome};
pub use report::{OutputFormat, TreeFormat};
pub use rules::{
    file_repository::FileRuleRepository, load_or_default, EmbeddedRuleRepository, RuleBook,
    RuleEntry, RuleMatch, RuleRepository, RuleSource, NO_MATCHING_RULE,
};
pub use store::ArtifactStore;
pub use validate::{
    BatchValidator, ValidationOptions, ValidationReport, ValidationSummary, ValidationVerdict,
};
