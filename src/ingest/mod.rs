// Document ingestion module
// Loading, chunking and corpus scanning for the retrieval pipeline


pub mod chunking;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{RagError, Result};

pub use chunking::{ChunkingConfig, split_documents, split_text};
pub use loader::{DocumentFormat, load};

/// One loaded unit before splitting. Produced by the loader, consumed
/// immediately by the chunker, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// Source metadata attached to a loaded document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub source: PathBuf,
    /// Page number for paginated formats, 1-based. Absent for text files.
    pub page: Option<u32>,
}

/// A bounded text segment after splitting, the unit that gets embedded and
/// indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Chunk metadata: the source document's metadata plus a sequence index
/// within that document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: PathBuf,
    pub page: Option<u32>,
    pub chunk_index: u32,
}

/// A corpus file as reported by the files endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub extension: String,
}

/// Load a single file and split it into chunks.
///
/// `NotFound` and `UnsupportedFormat` propagate unchanged since the caller
/// can act on them; any other loader failure is wrapped as `Processing` with
/// the original cause's message.
#[inline]
pub fn process_file(path: &Path, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let documents = match loader::load(path) {
        Ok(documents) => documents,
        Err(err @ (RagError::NotFound(_) | RagError::UnsupportedFormat(_))) => return Err(err),
        Err(err) => return Err(RagError::Processing(err.to_string())),
    };

    Ok(split_documents(&documents, config))
}

/// Scan a directory and chunk every supported file directly under it.
///
/// Files are processed in name order so chunk ordering is reproducible.
/// Per-file failures are logged and skipped; a missing or empty directory
/// yields an empty result rather than an error.
#[inline]
pub fn scan_corpus(directory: &Path, config: &ChunkingConfig) -> Vec<Chunk> {
    let files = discover_files(directory);
    if files.is_empty() {
        info!("No supported documents found in {}", directory.display());
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut failures = 0usize;

    for path in &files {
        match process_file(path, config) {
            Ok(file_chunks) => {
                debug!("{}: {} chunks", path.display(), file_chunks.len());
                chunks.extend(file_chunks);
            }
            Err(err) => {
                warn!("Skipping {}: {}", path.display(), err);
                failures += 1;
            }
        }
    }

    info!(
        "Scanned {}: {} files, {} chunks, {} failures",
        directory.display(),
        files.len(),
        chunks.len(),
        failures
    );

    chunks
}

/// List the supported files directly under the corpus directory, sorted by
/// name. Never fails; an absent directory yields an empty list.
#[inline]
pub fn list_corpus_files(directory: &Path) -> Vec<CorpusFile> {
    discover_files(directory)
        .into_iter()
        .filter_map(|path| {
            let size = std::fs::metadata(&path).ok()?.len();
            let name = path.file_name()?.to_str()?.to_string();
            let extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e.to_ascii_lowercase()))
                .unwrap_or_default();
            Some(CorpusFile {
                name,
                path,
                size,
                extension,
            })
        })
        .collect()
}

/// Supported files directly under `directory`, sorted by file name.
fn discover_files(directory: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(directory) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && DocumentFormat::is_supported(path))
        .collect();

    files.sort();
    files
}
