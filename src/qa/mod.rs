// Question answering module
// Retrieval-grounded prompt assembly and answer generation

#[cfg(test)]
mod tests;

use tracing::debug;

use crate::database::VectorStore;
use crate::embeddings::OllamaClient;
use crate::{RagError, Result};

/// Number of chunks retrieved to ground an answer.
pub const DEFAULT_TOP_K: usize = 3;

/// Produces answers, grounded in retrieved chunks when a vector store is
/// available and ungrounded otherwise.
#[derive(Debug, Clone)]
pub struct AnswerService {
    client: OllamaClient,
}

impl AnswerService {
    #[inline]
    pub fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    /// Assemble the prompt for a question. With an active store the top
    /// chunks are retrieved and folded into the grounding template; without
    /// one the raw question is returned unmodified. This is the only step
    /// that touches the store.
    #[inline]
    pub async fn prepare_prompt(
        &self,
        question: &str,
        store: Option<&VectorStore>,
    ) -> Result<String> {
        if question.trim().is_empty() {
            return Err(RagError::InvalidArgument(
                "question cannot be empty".to_string(),
            ));
        }

        match store {
            Some(store) => {
                let hits = store.search(question, DEFAULT_TOP_K).await?;
                debug!("Retrieved {} chunks for grounding", hits.len());

                let context = hits
                    .iter()
                    .map(|chunk| chunk.content.as_str())
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(build_grounded_prompt(&context, question))
            }
            None => {
                debug!("No vector store active, forwarding raw question");
                Ok(question.to_string())
            }
        }
    }

    /// Complete a prepared prompt. The model's response is returned verbatim.
    #[inline]
    pub async fn complete(&self, prompt: String) -> Result<String> {
        self.client.generate_async(prompt).await
    }

    /// Answer a question end to end: prepare the prompt, then complete it.
    #[inline]
    pub async fn answer(&self, question: &str, store: Option<&VectorStore>) -> Result<String> {
        let prompt = self.prepare_prompt(question, store).await?;
        self.complete(prompt).await
    }
}

/// Assemble the fixed grounding template around retrieved context.
#[inline]
pub fn build_grounded_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question based on the document content below.\n\
         If the answer is not in the document, say \"This information is not in the document.\"\n\
         \n\
         Document:\n\
         {context}\n\
         \n\
         Question: {question}"
    )
}
