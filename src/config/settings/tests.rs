use super::*;
use tempfile::TempDir;

#[test]
fn default_config() {
    let config = Config::default();
    assert_eq!(config.ollama.protocol, "http");
    assert_eq!(config.ollama.host, "localhost");
    assert_eq!(config.ollama.port, 11434);
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text:latest");
    assert_eq!(config.ollama.generation_model, "llama3.2");
    assert_eq!(config.ollama.batch_size, 16);
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.chunking.chunk_size, 1000);
    assert_eq!(config.chunking.chunk_overlap, 100);
    assert_eq!(config.storage.data_dir, PathBuf::from("data"));
    assert_eq!(config.storage.index_dir, PathBuf::from("vector_db"));
}

#[test]
fn config_validation() {
    let config = Config::default();
    assert!(config.validate().is_ok());

    let mut invalid_config = config.clone();
    invalid_config.ollama.protocol = "ftp".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.port = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.embedding_model = String::new();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.generation_model = "  ".to_string();
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.batch_size = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.ollama.timeout_seconds = 0;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config.clone();
    invalid_config.chunking.chunk_size = 10;
    assert!(invalid_config.validate().is_err());

    let mut invalid_config = config;
    invalid_config.chunking.chunk_overlap = 1000;
    assert!(matches!(
        invalid_config.validate(),
        Err(ConfigError::OverlapTooLarge(1000, 1000))
    ));
}

#[test]
fn ollama_url_generation() {
    let config = Config::default();
    let url = config
        .ollama_url()
        .expect("should generate ollama_url successfully");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn load_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config = Config::load(temp_dir.path().join("ragserve.toml"))
        .expect("should fall back to defaults");
    assert_eq!(config, Config::default());
}

#[test]
fn load_partial_file() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("ragserve.toml");
    fs::write(
        &path,
        r#"
[server]
port = 9090

[chunking]
chunk_size = 500
chunk_overlap = 50

[storage]
data_dir = "docs"
"#,
    )
    .expect("should write config file");

    let config = Config::load(&path).expect("should load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.chunking.chunk_size, 500);
    assert_eq!(config.chunking.chunk_overlap, 50);
    assert_eq!(config.storage.data_dir, PathBuf::from("docs"));
    assert_eq!(config.storage.index_dir, PathBuf::from("vector_db"));
}

#[test]
fn load_rejects_invalid_values() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("ragserve.toml");
    fs::write(
        &path,
        r#"
[chunking]
chunk_size = 200
chunk_overlap = 300
"#,
    )
    .expect("should write config file");

    assert!(Config::load(&path).is_err());
}

#[test]
fn bind_address_format() {
    let config = Config::default();
    assert_eq!(config.bind_address(), "127.0.0.1:8000");
}
