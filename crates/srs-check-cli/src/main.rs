mod config;

use std::{future::Future, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use srs_check_core::{
    build_client, load_or_default,
    report::{render_check, render_parse, render_rules, render_validation},
    ArtifactStore, ContentCache, EmbeddedRuleRepository, FileRuleRepository, LlmClient,
    NoopLlmClient, OutputFormat, Pipeline, RuleBook, RuleRepository, TreeFormat,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(
    name = "srs-check",
    author,
    version,
    about = "Structure software requirements specifications and check them against GJB 438C Appendix J"
)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory holding parsed trees, verdicts and the content cache
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Rule corpus file; the built-in Appendix J rules are used when absent or unreadable
    #[arg(long = "rules-file", value_name = "FILE", global = true)]
    rules_file: Option<PathBuf>,

    /// Nodes per LLM call
    #[arg(long = "batch-size", value_name = "N", global = true)]
    batch_size: Option<usize>,

    /// LLM calls in flight at once
    #[arg(long, value_name = "N", global = true)]
    concurrency: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the requirement tree of a document
    Parse {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = TreeOutput::Human)]
        format: TreeOutput,
    },
    /// Validate a previously parsed document by id
    Validate {
        doc_id: String,
        /// Emit JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
    /// Parse and validate a document
    Check {
        file: PathBuf,
        /// Emit JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Abort the run after this long (e.g. `90s`, `5m`)
        #[arg(long, value_parser = humantime::parse_duration)]
        timeout: Option<Duration>,
    },
    /// List the active rule corpus
    Rules {
        #[arg(long)]
        json: bool,
    },
    /// Inspect or clear the content cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// List fingerprint to document id mappings
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Remove every cache entry
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TreeOutput {
    Human,
    Json,
    Yaml,
}

impl From<TreeOutput> for TreeFormat {
    fn from(value: TreeOutput) -> Self {
        match value {
            TreeOutput::Human => TreeFormat::Human,
            TreeOutput::Json => TreeFormat::Json,
            TreeOutput::Yaml => TreeFormat::Yaml,
        }
    }
}

fn output_format(json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    match &cli.command {
        Commands::Parse { file, format } => {
            let pipeline = build_pipeline(&config, Arc::new(NoopLlmClient)).await?;
            let outcome = pipeline.parse(file).await?;
            print!("{}", render_parse(&outcome, (*format).into())?);
        }
        Commands::Validate { doc_id, json } => {
            let pipeline = build_pipeline(&config, llm_client(&config)?).await?;
            let outcome = until_interrupted(pipeline.validate(doc_id)).await?;
            print!("{}", render_validation(&outcome, output_format(*json))?);
        }
        Commands::Check {
            file,
            json,
            timeout,
        } => {
            let pipeline = build_pipeline(&config, llm_client(&config)?).await?;
            let run = until_interrupted(pipeline.check(file));
            let outcome = match timeout {
                Some(limit) => tokio::time::timeout(*limit, run).await.map_err(|_| {
                    anyhow!(
                        "check of {} timed out after {}",
                        file.display(),
                        humantime::format_duration(*limit)
                    )
                })??,
                None => run.await?,
            };
            print!("{}", render_check(&outcome, output_format(*json))?);
        }
        Commands::Rules { json } => {
            let rules = load_rules(&config).await;
            print!("{}", render_rules(&rules, output_format(*json))?);
        }
        Commands::Cache { action } => {
            let store = ArtifactStore::new(&config.storage.data_dir);
            let cache = ContentCache::open(store.cache_index_path());
            match action {
                CacheAction::Show { json } => {
                    let entries = cache.entries().await;
                    if *json {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    } else {
                        println!(
                            "{} cache entr{} in {}",
                            entries.len(),
                            if entries.len() == 1 { "y" } else { "ies" },
                            cache.path().display()
                        );
                        for entry in entries {
                            println!("- {} -> {}", entry.fingerprint, entry.doc_id);
                        }
                    }
                }
                CacheAction::Clear => {
                    let removed = cache
                        .clear()
                        .await
                        .with_context(|| format!("failed to clear {}", cache.path().display()))?;
                    println!("Cleared {removed} cache entries");
                }
            }
        }
    }
    Ok(())
}

/// Config file and environment, then command-line flags on top.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if let Some(file) = &cli.rules_file {
        config.storage.rules_file = Some(file.clone());
    }
    if let Some(batch_size) = cli.batch_size {
        config.validation.batch_size = batch_size;
    }
    if let Some(concurrency) = cli.concurrency {
        config.validation.concurrency = concurrency;
    }
    Ok(config)
}

/// Drop `run` on Ctrl-C. Stages persist only on completion, so nothing partial is saved.
async fn until_interrupted<T>(run: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        result = run => result,
        _ = tokio::signal::ctrl_c() => bail!("interrupted; the unfinished stage saved nothing"),
    }
}

fn llm_client(config: &AppConfig) -> Result<Arc<dyn LlmClient>> {
    let settings = config.llm_settings()?;
    info!(provider = %settings.provider, "using validation oracle");
    build_client(&settings)
}

async fn load_rules(config: &AppConfig) -> Arc<RuleBook> {
    let repo: Box<dyn RuleRepository> = match &config.storage.rules_file {
        Some(path) => Box::new(FileRuleRepository::new(path)),
        None => Box::new(EmbeddedRuleRepository),
    };
    load_or_default(repo.as_ref()).await
}

async fn build_pipeline(config: &AppConfig, client: Arc<dyn LlmClient>) -> Result<Pipeline> {
    let rules = load_rules(config).await;
    Pipeline::new(
        ArtifactStore::new(&config.storage.data_dir),
        rules,
        client,
        config.validation_options(),
    )
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
