use super::*;
use crate::config::{Config, OllamaConfig, StorageConfig};
use tempfile::TempDir;

fn create_test_service() -> AnswerService {
    let client = OllamaClient::new(&OllamaConfig::default()).expect("should create client");
    AnswerService::new(client)
}

#[test]
fn grounded_prompt_embeds_context_and_question() {
    let prompt = build_grounded_prompt("Chunk one.\nChunk two.", "What is the system?");

    assert!(prompt.contains("Document:\nChunk one.\nChunk two."));
    assert!(prompt.contains("Question: What is the system?"));
    assert!(prompt.contains("not in the document"));
}

#[test]
fn grounded_prompt_with_empty_context_keeps_the_instruction() {
    let prompt = build_grounded_prompt("", "Anything?");

    assert!(prompt.contains("Question: Anything?"));
    assert!(prompt.contains("If the answer is not in the document"));
}

#[tokio::test]
async fn empty_question_is_rejected_before_any_call() {
    let service = create_test_service();

    let err = service
        .answer("   ", None)
        .await
        .expect_err("blank question should fail");
    assert!(matches!(err, RagError::InvalidArgument(_)));
}

#[tokio::test]
async fn degraded_prompt_is_the_bare_question() {
    let service = create_test_service();

    let prompt = service
        .prepare_prompt("What is chunking?", None)
        .await
        .expect("should prepare prompt");
    assert_eq!(prompt, "What is chunking?");
}

#[tokio::test]
async fn grounded_prompt_against_an_empty_index_keeps_the_template() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config {
        storage: StorageConfig {
            data_dir: temp_dir.path().join("data"),
            index_dir: temp_dir.path().join("index"),
        },
        ..Config::default()
    };
    let client = OllamaClient::new(&config.ollama).expect("should create client");
    let store = VectorStore::open(&config, client)
        .await
        .expect("should open store");
    let service = create_test_service();

    let prompt = service
        .prepare_prompt("What is chunking?", Some(&store))
        .await
        .expect("should prepare prompt");
    assert!(prompt.contains("Document:"));
    assert!(prompt.contains("Question: What is chunking?"));
}
