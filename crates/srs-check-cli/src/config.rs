use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use srs_check_core::{LlmSettings, ValidationOptions};

/// Layered application settings: config file, then `SRS_CHECK__*`
/// environment variables, then command-line flags (applied by the caller).
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub validation: ValidationSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LlmSection {
    pub provider: Option<String>,
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationSection {
    pub batch_size: usize,
    pub concurrency: usize,
}

impl Default for ValidationSection {
    fn default() -> Self {
        let defaults = ValidationOptions::default();
        Self {
            batch_size: defaults.batch_size,
            concurrency: defaults.concurrency,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: PathBuf,
    pub rules_file: Option<PathBuf>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./srs-data"),
            rules_file: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("SRS_CHECK")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );
        let settings = builder.build().with_context(|| match path {
            Some(path) => format!("failed to load configuration from {}", path.display()),
            None => "failed to load configuration from environment".to_string(),
        })?;
        settings
            .try_deserialize()
            .context("configuration has an unexpected shape")
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            batch_size: self.validation.batch_size,
            concurrency: self.validation.concurrency,
        }
    }

    /// LLM settings: the `[llm]` section, overridden by `SRS_CHECK_*` variables.
    pub fn llm_settings(&self) -> Result<LlmSettings> {
        self.llm_settings_with(std::env::vars().collect())
    }

    fn llm_settings_with(&self, env: HashMap<String, String>) -> Result<LlmSettings> {
        let section = &self.llm;
        let mut vars = HashMap::new();
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                vars.insert(key.to_string(), value);
            }
        };
        put(LlmSettings::PROVIDER_ENV, section.provider.clone());
        put(LlmSettings::API_KEY_ENV, section.api_key.clone());
        put(LlmSettings::ENDPOINT_ENV, section.endpoint.clone());
        put(LlmSettings::MODEL_ENV, section.model.clone());
        put(LlmSettings::TIMEOUT_ENV, section.timeout_secs.map(|v| v.to_string()));
        put(LlmSettings::RETRIES_ENV, section.max_retries.map(|v| v.to_string()));
        put(LlmSettings::BACKOFF_ENV, section.retry_backoff_ms.map(|v| v.to_string()));

        vars.extend(
            env.into_iter()
                .filter(|(key, value)| key.starts_with("SRS_CHECK_") && !value.trim().is_empty()),
        );
        LlmSettings::from_map(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_without_sources() {
        let config = AppConfig::default();
        assert_eq!(config.validation.batch_size, 10);
        assert_eq!(config.validation.concurrency, 4);
        assert_eq!(config.storage.data_dir, PathBuf::from("./srs-data"));
        assert!(config.storage.rules_file.is_none());
    }

    #[test]
    fn reads_toml_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("srs-check.toml");
        fs::write(
            &path,
            "[llm]\nprovider = \"noop\"\nmodel = \"review\"\n\n[validation]\nbatch_size = 5\n\n[storage]\ndata_dir = \"/tmp/srs\"\n",
        )
        .unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.llm.provider.as_deref(), Some("noop"));
        assert_eq!(config.validation.batch_size, 5);
        assert_eq!(config.validation.concurrency, 4);
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/srs"));
    }

    #[test]
    fn environment_overrides_llm_section() {
        let config = AppConfig {
            llm: LlmSection {
                provider: Some("openai".into()),
                api_key: Some("from-file".into()),
                model: Some("file-model".into()),
                ..LlmSection::default()
            },
            ..AppConfig::default()
        };
        let env = HashMap::from([
            (LlmSettings::API_KEY_ENV.to_string(), "from-env".to_string()),
            (LlmSettings::MODEL_ENV.to_string(), " ".to_string()),
            ("UNRELATED".to_string(), "x".to_string()),
        ]);
        let settings = config.llm_settings_with(env).unwrap();
        assert_eq!(settings.provider, "openai");
        assert_eq!(settings.api_key, "from-env");
        assert_eq!(settings.model.as_deref(), Some("file-model"));
    }

    #[test]
    fn missing_key_for_remote_provider_errors() {
        let config = AppConfig {
            llm: LlmSection {
                provider: Some("openai".into()),
                ..LlmSection::default()
            },
            ..AppConfig::default()
        };
        assert!(config.llm_settings_with(HashMap::new()).is_err());
    }
}
