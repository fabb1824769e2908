/// # llm-mend CLI Interface (Module)
///
/// This module implements the CLI for llm-mend: command parsing, argument overrides,
/// and the async entrypoint shared by `main` and the integration tests.
///
/// All pipeline logic lives in the [`llm-mend-core`] crate. This module only builds the
/// collaborators the core needs (content store, transformation client, console) once
/// per run and hands them over.
///
/// ## Subcommands
/// - `fix`: run the review pipeline over a directory
/// - `pack`: concatenate a directory into a single annotated bundle file
/// - `unpack`: split a bundle back into files under an output directory
///
/// [`llm-mend-core`]: ../../llm-mend-core/
use crate::console::StdinConsole;
use crate::load_config::{api_key_from_env, load_config};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm_mend_core::bundle;
use llm_mend_core::config::{Config, DEFAULT_SUFFIX};
use llm_mend_core::pipeline::{ItemOutcome, Pipeline};
use llm_mend_core::store::FsContentStore;
use llm_mend_core::transform::{OpenAiCompletionService, TransformationClient};
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// CLI for llm-mend: submit source files for automated correction and review the fixes.
#[derive(Parser)]
#[clap(
    name = "llm-mend",
    version,
    about = "Submit source files to a text-generation service for correction and review each suggested fix"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transform every matching file and interactively accept, guide or reject each suggestion
    Fix {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Directory to process (overrides source.root)
        #[clap(long)]
        dir: Option<PathBuf>,
        /// File name suffix filter (overrides source.suffix)
        #[clap(long)]
        suffix: Option<String>,
        /// Maximum number of files in flight at once (overrides pipeline.max_concurrency)
        #[clap(long)]
        max_concurrency: Option<NonZeroUsize>,
    },
    /// Concatenate matching files into one bundle with `// File:` markers
    Pack {
        #[clap(long)]
        dir: PathBuf,
        #[clap(long, default_value = DEFAULT_SUFFIX)]
        suffix: String,
        /// Bundle file to write
        #[clap(long)]
        output: PathBuf,
    },
    /// Split a bundle back into individual files
    Unpack {
        /// Bundle file to read
        #[clap(long)]
        input: PathBuf,
        #[clap(long)]
        output_dir: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Fix {
            config,
            dir,
            suffix,
            max_concurrency,
        } => {
            let mut config = match config {
                Some(path) => load_config(path)?,
                None => Config::default(),
            };
            if let Some(dir) = dir {
                config.source.root = dir;
            }
            if let Some(suffix) = suffix {
                config.source.suffix = suffix;
            }
            if max_concurrency.is_some() {
                config.pipeline.max_concurrency = max_concurrency;
            }
            config.trace_loaded();
            fix(config).await
        }
        Commands::Pack {
            dir,
            suffix,
            output,
        } => {
            tracing::info!(command = "pack", dir = %dir.display(), "Packing directory");
            let text = bundle::pack(&dir, &suffix)
                .with_context(|| format!("Failed to pack {}", dir.display()))?;
            std::fs::write(&output, text)
                .with_context(|| format!("Failed to write bundle {}", output.display()))?;
            tracing::info!(command = "pack", output = %output.display(), "Bundle written");
            Ok(())
        }
        Commands::Unpack { input, output_dir } => {
            tracing::info!(command = "unpack", input = %input.display(), "Unpacking bundle");
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read bundle {}", input.display()))?;
            let entries = bundle::parse_bundle(&text)
                .with_context(|| format!("Failed to parse bundle {}", input.display()))?;
            let written = bundle::unpack(&entries, &output_dir)
                .with_context(|| format!("Failed to unpack into {}", output_dir.display()))?;
            for path in &written {
                println!("Copied content to: {}", path.display());
            }
            Ok(())
        }
    }
}

async fn fix(config: Config) -> Result<()> {
    tracing::info!(command = "fix", "Starting review pipeline");
    let api_key = api_key_from_env()?;
    let service = OpenAiCompletionService::new(&config.service, api_key)
        .context("Failed to construct completion service")?;
    let client = TransformationClient::with_instruction(service, config.service.instruction());
    let store = FsContentStore::new();
    let console = StdinConsole::new();

    let pipeline = Pipeline::new(
        &store,
        &client,
        &console,
        config.source.suffix.clone(),
        config.pipeline.clone(),
    );
    let report = pipeline
        .run(&config.source.root)
        .await
        .context("File discovery failed")?;

    println!(
        "Processed {} file(s): {} accepted, {} guided, {} rejected, {} failed.",
        report.items.len(),
        report.count(|o| matches!(o, ItemOutcome::Accepted)),
        report.count(|o| matches!(o, ItemOutcome::Guided)),
        report.count(|o| matches!(o, ItemOutcome::Rejected)),
        report.count(|o| matches!(o, ItemOutcome::ServiceFailed(_) | ItemOutcome::Faulted(_))),
    );
    tracing::info!(command = "fix", ?report, "Review pipeline complete");
    Ok(())
}
