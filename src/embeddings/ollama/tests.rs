use super::*;

#[test]
fn client_configuration() {
    let config = OllamaConfig {
        protocol: "http".to_string(),
        host: "test-host".to_string(),
        port: 1234,
        embedding_model: "test-embed".to_string(),
        generation_model: "test-gen".to_string(),
        batch_size: 8,
        ..OllamaConfig::default()
    };
    let client = OllamaClient::new(&config).expect("Failed to create client");

    assert_eq!(client.embedding_model, "test-embed");
    assert_eq!(client.generation_model, "test-gen");
    assert_eq!(client.batch_size, 8);
    assert_eq!(client.base_url.host_str(), Some("test-host"));
    assert_eq!(client.base_url.port(), Some(1234));
}

#[test]
fn client_timeout_builder() {
    let config = OllamaConfig::default();
    let _client = OllamaClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60));
}

#[test]
fn embed_batch_with_no_texts_is_empty() {
    let config = OllamaConfig::default();
    let client = OllamaClient::new(&config).expect("Failed to create client");

    let vectors = client
        .embed_batch(&[])
        .expect("empty batch should not touch the network");
    assert!(vectors.is_empty());
}

#[test]
fn request_serialization() {
    let request = EmbedRequest {
        model: "nomic-embed-text:latest".to_string(),
        input: vec!["alpha".to_string(), "beta".to_string()],
    };
    let json = serde_json::to_string(&request).expect("should serialize");
    assert!(json.contains("\"input\":[\"alpha\",\"beta\"]"));

    let request = GenerateRequest {
        model: "llama3.2".to_string(),
        prompt: "Question".to_string(),
        stream: false,
    };
    let json = serde_json::to_string(&request).expect("should serialize");
    assert!(json.contains("\"stream\":false"));
}

#[test]
fn response_parsing() {
    let response: EmbedResponse =
        serde_json::from_str(r#"{"embeddings": [[0.1, 0.2], [0.3, 0.4]]}"#)
            .expect("should parse embed response");
    assert_eq!(response.embeddings.len(), 2);
    assert_eq!(response.embeddings[0], vec![0.1, 0.2]);

    let response: GenerateResponse =
        serde_json::from_str(r#"{"model": "llama3.2", "response": "An answer.", "done": true}"#)
            .expect("should parse generate response");
    assert_eq!(response.response, "An answer.");
}

#[test]
fn timeout_maps_to_its_own_error_kind() {
    let err = embed_error("/api/embed", ureq::Error::Timeout(ureq::Timeout::Global));
    assert!(matches!(err, RagError::Timeout(_)));

    let err = generate_error("/api/generate", ureq::Error::ConnectionFailed);
    assert!(matches!(err, RagError::Generation(_)));
}
