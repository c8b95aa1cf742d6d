// Vector database module
// Handles persistent storage and similarity search for embedded chunks

pub mod vector_store;

use serde::{Deserialize, Serialize};

pub use vector_store::VectorStore;

/// One persisted row in the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique identifier for this record
    pub id: String,
    /// The embedding vector
    pub vector: Vec<f32>,
    /// The chunk text this embedding represents
    pub content: String,
    /// Source file the chunk came from
    pub source: String,
    /// Page number for paginated sources
    pub page: Option<u32>,
    /// Index of the chunk within its source document
    pub chunk_index: u32,
    /// Timestamp when this record was created
    pub created_at: String,
}

/// A stored chunk projected back out of the index, without its vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    pub content: String,
    pub source: String,
    pub page: Option<u32>,
    pub chunk_index: u32,
}
