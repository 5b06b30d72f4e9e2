use std::path::PathBuf;

use thiserror::Error;

/// Hard failures while pulling paragraphs out of a source document.
///
/// These are the only errors that abort a pipeline run; everything past
/// extraction degrades instead of failing.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read document at {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unsupported document format `{extension}` for {path} (expected txt, md or docx)")]
    UnsupportedFormat { path: PathBuf, extension: String },
    #[error("document at {path} is not valid UTF-8 text")]
    InvalidEncoding { path: PathBuf },
    #[error("docx container at {path} is malformed: {message}")]
    MalformedContainer { path: PathBuf, message: String },
}

/// Violations of the requirement tree invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeValidationError {
    #[error("node id must not be blank")]
    EmptyId,
    #[error("node id `{id}` appears more than once in the tree")]
    DuplicateId { id: String },
    #[error("node `{id}` has level {level}, not deeper than its parent's level {parent_level}")]
    LevelNotDeeper {
        id: String,
        level: u32,
        parent_level: u32,
    },
    #[error("node `{id}` section `{section}` does not refine parent section `{parent_section}`")]
    SectionNotRefined {
        id: String,
        section: String,
        parent_section: String,
    },
    #[error("root node must have level 0 (got {level})")]
    RootLevel { level: u32 },
}

/// Lookup failures in the on-disk artifact store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no {kind} stored for document `{doc_id}`")]
    NotFound { kind: &'static str, doc_id: String },
    #[error("stored {kind} for document `{doc_id}` is corrupt")]
    Corrupt {
        kind: &'static str,
        doc_id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("`{doc_id}` is not a valid document id")]
    InvalidId { doc_id: String },
    #[error("artifact store I/O failed at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
