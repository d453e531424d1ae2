//! Builds the chunk store from a ZIP archive of paper JSON.
//!
//! Usage:
//!   cord-ingest                                  # archive.zip -> vector_db
//!   cord-ingest --archive papers.zip --limit 100 # first 100 papers only

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use cord_chat::core::config::{AppPaths, ConfigService, ModelSettings, RagSettings};
use cord_chat::core::logging;
use cord_chat::llm::{LlmProvider, OpenAiCompatibleProvider};
use cord_chat::rag::{create_store, SqliteRagStore};

#[derive(Parser)]
#[command(
    name = "cord-ingest",
    version,
    about = "Load, chunk and embed a paper archive into the chunk store"
)]
struct Cli {
    /// ZIP archive holding the paper JSON files
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Folder the store is written to
    #[arg(long)]
    store_dir: Option<PathBuf>,

    /// Only ingest the first N matching files
    #[arg(long)]
    limit: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let paths = Arc::new(AppPaths::new());
    logging::init(&paths, "ingest");

    let config = ConfigService::new(paths.clone())
        .load_config()
        .context("Failed to load configuration")?;
    let rag = RagSettings::from_config(&config);
    let models = ModelSettings::from_config(&config);

    let archive = cli
        .archive
        .unwrap_or_else(|| paths.resolve(&rag.archive_file));
    let store_dir = cli
        .store_dir
        .unwrap_or_else(|| paths.resolve(&rag.store_dir));

    let store = SqliteRagStore::create(&store_dir)
        .await
        .with_context(|| format!("Failed to open store at {}", store_dir.display()))?;

    let credential = std::env::var(&models.credential_env)
        .ok()
        .filter(|value| !value.trim().is_empty());
    let embedder =
        OpenAiCompatibleProvider::new(models.embedding_model.base_url.clone(), credential);

    match embedder.health_check().await {
        Ok(true) => {}
        _ => tracing::warn!(
            "{} embedding endpoint {} did not answer; ingestion will likely fail",
            embedder.name(),
            embedder.base_url()
        ),
    }

    tracing::info!(
        "Ingesting {} into {} with {}",
        archive.display(),
        store.db_path().display(),
        models.embedding_model.id
    );

    let report = create_store(
        &archive,
        &store,
        &embedder,
        &models.embedding_model.id,
        &rag,
        cli.limit,
    )
    .await
    .with_context(|| format!("Failed to ingest {}", archive.display()))?;

    tracing::info!(
        "Ingested {} files, {} fragments, {} chunks",
        report.files,
        report.fragments,
        report.chunks
    );

    Ok(())
}
