use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use once_cell::sync::OnceCell;
use tracing::info;

use super::{RuleBook, RuleRepository, RuleSource};

/// Loads the appendix corpus from a UTF-8 text file.
pub struct FileRuleRepository {
    path: PathBuf,
    cache: OnceCell<Arc<RuleBook>>,
}

impl FileRuleRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: OnceCell::new(),
        }
    }

    fn read_corpus(&self) -> Result<RuleBook> {
        let raw = fs::read_to_string(&self.path).with_context(|| {
            format!("failed to read rule corpus at {}", self.path.display())
        })?;
        let book = RuleBook::parse(&raw, RuleSource::File(self.path.clone()));
        if book.is_empty() {
            bail!(
                "rule corpus at {} contains no numbered sections",
                self.path.display()
            );
        }
        info!(path = %self.path.display(), rules = book.len(), "rule corpus loaded");
        Ok(book)
    }
}

#[async_trait::async_trait]
impl RuleRepository for FileRuleRepository {
    async fn load_rules(&self) -> Result<Arc<RuleBook>> {
        let book = self
            .cache
            .get_or_try_init(|| self.read_corpus().map(Arc::new))?;
        Ok(Arc::clone(book))
    }
}
