// Embeddings module
// Ollama integration for embedding and answer generation

pub mod ollama;

pub use ollama::OllamaClient;
