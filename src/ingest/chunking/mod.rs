
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use super::{Chunk, ChunkMetadata, RawDocument};

/// Separator hierarchy tried in order: paragraphs, lines, sentences, words.
/// Text with none of these falls through to raw character blocks.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Configuration for text chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub chunk_size: usize,
    /// Characters of the previous window repeated at the start of the next chunk
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
        }
    }
}

/// Split loaded documents into overlapping chunks, carrying each source
/// document's metadata onto every chunk derived from it.
#[inline]
pub fn split_documents(documents: &[RawDocument], config: &ChunkingConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();

    for document in documents {
        let splits = split_text(&document.text, config);
        debug!(
            "Split document {} (page {:?}) into {} chunks",
            document.metadata.source.display(),
            document.metadata.page,
            splits.len()
        );

        chunks.extend(splits.into_iter().enumerate().map(|(i, content)| Chunk {
            content,
            metadata: ChunkMetadata {
                source: document.metadata.source.clone(),
                page: document.metadata.page,
                chunk_index: i as u32,
            },
        }));
    }

    chunks
}

/// Split raw text into segments of at most `chunk_size` characters.
///
/// Splitting is hierarchical: paragraph boundaries are preferred, then line
/// and sentence boundaries, then word boundaries, and only text with no
/// natural boundaries at all is cut at arbitrary character positions. Each
/// window after the first starts with roughly `chunk_overlap` trailing
/// characters of the previous window.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    if text.chars().count() <= config.chunk_size {
        return vec![text.to_string()];
    }

    let units = decompose(text, &SEPARATORS, config);
    merge_units(units, config)
}

/// Break text into units no longer than `chunk_size`, trying each separator
/// in turn and recursing into oversized pieces with the finer separators.
fn decompose(text: &str, separators: &[&str], config: &ChunkingConfig) -> Vec<String> {
    if text.chars().count() <= config.chunk_size {
        return vec![text.to_string()];
    }

    let Some((separator, finer)) = separators.split_first() else {
        return char_blocks(text, config);
    };

    if !text.contains(separator) {
        return decompose(text, finer, config);
    }

    text.split_inclusive(separator)
        .flat_map(|piece| decompose(piece, finer, config))
        .collect()
}

/// Character-level fallback for text with no natural boundaries. Blocks are
/// sized to the overlap so the merge step can carry exactly one block from
/// window to window.
fn char_blocks(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let block_size = if config.chunk_overlap > 0 {
        config.chunk_overlap
    } else {
        config.chunk_size
    };

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(block_size)
        .map(|block| block.iter().collect())
        .collect()
}

/// Greedily pack units into windows of at most `chunk_size` characters,
/// retaining up to `chunk_overlap` trailing characters of each emitted
/// window as the start of the next.
fn merge_units(units: Vec<String>, config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<String> = VecDeque::new();
    let mut window_len = 0usize;

    for unit in units {
        let unit_len = unit.chars().count();

        if window_len + unit_len > config.chunk_size && !window.is_empty() {
            chunks.push(window.iter().map(String::as_str).collect::<String>());

            // Shrink the window to the overlap budget, popping further if the
            // incoming unit still would not fit.
            while window_len > config.chunk_overlap
                || (window_len + unit_len > config.chunk_size && window_len > 0)
            {
                let Some(popped) = window.pop_front() else {
                    break;
                };
                window_len -= popped.chars().count();
            }
        }

        window_len += unit_len;
        window.push_back(unit);
    }

    if !window.is_empty() {
        chunks.push(window.iter().map(String::as_str).collect::<String>());
    }

    chunks
}
