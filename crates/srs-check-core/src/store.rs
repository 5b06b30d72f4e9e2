use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::document::tree::RequirementNode;
use crate::error::StoreError;
use crate::validate::ValidationVerdict;

const TREES_DIR: &str = "trees";
const VALIDATIONS_DIR: &str = "validations";
const CACHE_INDEX_FILE: &str = "cache_index.json";

/// Directory-backed persistence for parsed trees and validation results,
/// keyed by document id.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache_index_path(&self) -> PathBuf {
        self.root.join(CACHE_INDEX_FILE)
    }

    pub fn save_tree(&self, doc_id: &str, tree: &RequirementNode) -> Result<(), StoreError> {
        self.save("tree", TREES_DIR, doc_id, tree)
    }

    pub fn load_tree(&self, doc_id: &str) -> Result<RequirementNode, StoreError> {
        self.load("tree", TREES_DIR, doc_id)?
            .ok_or_else(|| StoreError::NotFound {
                kind: "tree",
                doc_id: doc_id.to_string(),
            })
    }

    pub fn save_verdicts(
        &self,
        doc_id: &str,
        verdicts: &[ValidationVerdict],
    ) -> Result<(), StoreError> {
        self.save("validation", VALIDATIONS_DIR, doc_id, &verdicts)
    }

    /// Previously persisted verdicts, if the document was validated before.
    pub fn find_verdicts(&self, doc_id: &str) -> Result<Option<Vec<ValidationVerdict>>, StoreError> {
        self.load("validation", VALIDATIONS_DIR, doc_id)
    }

    fn artifact_path(&self, dir: &str, doc_id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_doc_id(doc_id) {
            return Err(StoreError::InvalidId {
                doc_id: doc_id.to_string(),
            });
        }
        Ok(self.root.join(dir).join(format!("{doc_id}.json")))
    }

    fn save<T: Serialize + ?Sized>(
        &self,
        kind: &'static str,
        dir: &str,
        doc_id: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let path = self.artifact_path(dir, doc_id)?;
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Corrupt {
            kind,
            doc_id: doc_id.to_string(),
            source,
        })?;
        write_atomic(&path, &bytes)?;
        debug!(kind, doc_id, path = %path.display(), "artifact stored");
        Ok(())
    }

    fn load<T: DeserializeOwned>(
        &self,
        kind: &'static str,
        dir: &str,
        doc_id: &str,
    ) -> Result<Option<T>, StoreError> {
        let path = self.artifact_path(dir, doc_id)?;
        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                kind,
                doc_id: doc_id.to_string(),
                source,
            })
    }
}

/// Document ids are used as file stems, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_doc_id(doc_id: &str) -> bool {
    !doc_id.is_empty()
        && doc_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Replace `path` with `bytes` via a temp file in the same directory.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(io_err)?;
    let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
    temp.write_all(bytes).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}
