//! CLI command implementations.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::VectorStore;
use crate::embeddings::OllamaClient;
use crate::ingest;
use crate::server;

/// Run the HTTP server, indexing the corpus first.
#[inline]
pub async fn serve(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let client = OllamaClient::new(&config.ollama)?;

    let store = match initialize_store(&config, &client).await {
        Ok(store) => store,
        Err(e) => {
            warn!("Starting without retrieval grounding: {e:#}");
            None
        }
    };

    server::serve(config, client, store)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Rebuild the vector index from the corpus directory without serving.
#[inline]
pub async fn ingest(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let client = OllamaClient::new(&config.ollama)?;

    client
        .ping()
        .context("Ollama is not reachable; embeddings require a running instance")?;

    let index_dir = &config.storage.index_dir;
    if index_dir.exists() {
        std::fs::remove_dir_all(index_dir).with_context(|| {
            format!("Failed to clear index directory: {}", index_dir.display())
        })?;
    }

    let chunks = ingest::scan_corpus(&config.storage.data_dir, &config.chunking);
    if chunks.is_empty() {
        println!(
            "No supported documents found in {}",
            config.storage.data_dir.display()
        );
        return Ok(());
    }

    let store = VectorStore::build(&config, client, &chunks).await?;
    let total = store.document_count().await?;
    println!(
        "Indexed {} chunks from {} ({} stored)",
        chunks.len(),
        config.storage.data_dir.display(),
        total
    );

    Ok(())
}

/// Print corpus and index statistics.
#[inline]
pub async fn status(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    let files = ingest::list_corpus_files(&config.storage.data_dir);
    println!("Corpus directory: {}", config.storage.data_dir.display());
    println!("Corpus files: {}", files.len());
    for file in &files {
        println!("  {} ({} bytes)", file.name, file.size);
    }

    if config.storage.index_dir.exists() {
        let client = OllamaClient::new(&config.ollama)?;
        let store = VectorStore::open(&config, client).await?;
        let total = store.document_count().await?;
        println!("Index directory: {}", config.storage.index_dir.display());
        println!("Stored chunks: {total}");
    } else {
        println!(
            "Index directory {} does not exist (run `ingest` to build it)",
            config.storage.index_dir.display()
        );
    }

    Ok(())
}

/// Print the effective configuration as TOML.
#[inline]
pub fn show_config(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}

/// Build or open the vector store at startup.
///
/// Corpus documents found on disk trigger a full wipe-and-rebuild so the
/// index always mirrors the corpus directory. With no documents, an existing
/// index is reopened as-is. With neither, the server starts uninitialized.
async fn initialize_store(config: &Config, client: &OllamaClient) -> Result<Option<VectorStore>> {
    let chunks = ingest::scan_corpus(&config.storage.data_dir, &config.chunking);

    if !chunks.is_empty() {
        let index_dir = &config.storage.index_dir;
        if index_dir.exists() {
            std::fs::remove_dir_all(index_dir).with_context(|| {
                format!("Failed to clear index directory: {}", index_dir.display())
            })?;
        }

        info!("Building index from {} chunks", chunks.len());
        let store = VectorStore::build(config, client.clone(), &chunks).await?;
        return Ok(Some(store));
    }

    if config.storage.index_dir.exists() {
        info!(
            "No corpus documents found, reopening existing index at {}",
            config.storage.index_dir.display()
        );
        let store = VectorStore::open(config, client.clone()).await?;
        return Ok(Some(store));
    }

    warn!(
        "No documents in {} and no existing index, starting uninitialized",
        config.storage.data_dir.display()
    );
    Ok(None)
}
