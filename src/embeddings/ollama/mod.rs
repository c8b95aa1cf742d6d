#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::config::OllamaConfig;
use crate::{RagError, Result};

/// Client for the Ollama HTTP API, covering both embedding and answer
/// generation. Calls are single-attempt with a global agent deadline; a
/// timed-out call surfaces as `RagError::Timeout`.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: Url,
    embedding_model: String,
    generation_model: String,
    batch_size: u32,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = config
            .ollama_url()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_seconds)))
            .build()
            .into();

        Ok(Self {
            base_url,
            embedding_model: config.embedding_model.clone(),
            generation_model: config.generation_model.clone(),
            batch_size: config.batch_size,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    /// Check that the Ollama server is reachable.
    #[inline]
    pub fn ping(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/api/tags")
            .map_err(|e| RagError::Config(format!("Failed to build ping URL: {e}")))?;

        debug!("Pinging Ollama server at {}", url);

        self.agent
            .get(url.as_str())
            .call()
            .map_err(|e| embed_error("/api/tags", e))?;

        Ok(())
    }

    /// Generate an embedding vector for a single text.
    #[inline]
    pub fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()])?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("Server returned no embedding".to_string()))
    }

    /// Generate embedding vectors for many texts, batched by the configured
    /// batch size. Returns one vector per input, in input order.
    #[inline]
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size as usize) {
            vectors.extend(self.embed_single_batch(batch)?);
        }

        Ok(vectors)
    }

    fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            model: self.embedding_model.clone(),
            input: texts.to_vec(),
        };

        let url = self
            .base_url
            .join("/api/embed")
            .map_err(|e| RagError::Config(format!("Failed to build embedding URL: {e}")))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Embedding(format!("Failed to serialize request: {e}")))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| embed_error("/api/embed", e))?;

        let response: EmbedResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Embedding(format!("Failed to parse response: {e}")))?;

        if response.embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "Requested {} embeddings but received {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings)
    }

    /// Complete a prompt with the generation model and return the response
    /// verbatim.
    #[inline]
    pub fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Generating completion for prompt ({} chars)", prompt.len());

        let request = GenerateRequest {
            model: self.generation_model.clone(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let url = self
            .base_url
            .join("/api/generate")
            .map_err(|e| RagError::Config(format!("Failed to build generation URL: {e}")))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Generation(format!("Failed to serialize request: {e}")))?;

        let response_text = self
            .agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(&request_json)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| generate_error("/api/generate", e))?;

        let response: GenerateResponse = serde_json::from_str(&response_text)
            .map_err(|e| RagError::Generation(format!("Failed to parse response: {e}")))?;

        Ok(response.response)
    }

    /// Async wrapper moving the blocking embedding call off the runtime.
    #[inline]
    pub async fn embed_async(&self, text: String) -> Result<Vec<f32>> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.embed(&text))
            .await
            .map_err(|e| RagError::Embedding(format!("Embedding task failed: {e}")))?
    }

    /// Async wrapper moving the blocking batch embedding call off the runtime.
    #[inline]
    pub async fn embed_batch_async(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.embed_batch(&texts))
            .await
            .map_err(|e| RagError::Embedding(format!("Embedding task failed: {e}")))?
    }

    /// Async wrapper moving the blocking generation call off the runtime.
    #[inline]
    pub async fn generate_async(&self, prompt: String) -> Result<String> {
        let client = self.clone();
        tokio::task::spawn_blocking(move || client.generate(&prompt))
            .await
            .map_err(|e| RagError::Generation(format!("Generation task failed: {e}")))?
    }
}

fn embed_error(endpoint: &str, error: ureq::Error) -> RagError {
    match error {
        ureq::Error::Timeout(_) => RagError::Timeout(format!("Ollama {endpoint}")),
        other => RagError::Embedding(format!("Request to {endpoint} failed: {other}")),
    }
}

fn generate_error(endpoint: &str, error: ureq::Error) -> RagError {
    match error {
        ureq::Error::Timeout(_) => RagError::Timeout(format!("Ollama {endpoint}")),
        other => RagError::Generation(format!("Request to {endpoint} failed: {other}")),
    }
}
