use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported document format: {0}. Supported formats are .pdf, .txt and .md")]
    UnsupportedFormat(String),

    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Failed to process document: {0}")]
    Processing(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Vector store error: {0}")]
    Store(String),

    #[error("Vector store is not initialized")]
    Uninitialized,

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Request to {0} timed out")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod commands;
pub mod config;
pub mod database;
pub mod embeddings;
pub mod ingest;
pub mod qa;
pub mod server;
