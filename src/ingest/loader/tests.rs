use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn format_dispatch_is_case_insensitive() {
    assert_eq!(
        DocumentFormat::from_path(Path::new("notes.TXT")).expect("should dispatch"),
        DocumentFormat::PlainText
    );
    assert_eq!(
        DocumentFormat::from_path(Path::new("manual.Pdf")).expect("should dispatch"),
        DocumentFormat::Pdf
    );
    assert_eq!(
        DocumentFormat::from_path(Path::new("README.md")).expect("should dispatch"),
        DocumentFormat::Markdown
    );
}

#[test]
fn unsupported_extension_is_named_in_the_error() {
    let err = DocumentFormat::from_path(Path::new("payload.exe"))
        .expect_err("exe should be rejected");
    match err {
        RagError::UnsupportedFormat(ext) => assert_eq!(ext, ".exe"),
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }

    assert!(!DocumentFormat::is_supported(Path::new("archive.tar.gz")));
    assert!(!DocumentFormat::is_supported(Path::new("no_extension")));
}

#[test]
fn missing_file_fails_before_dispatch() {
    let err = load(Path::new("data/no_such_file.pdf")).expect_err("should not load");
    assert!(matches!(err, RagError::NotFound(_)));

    // Existence is checked first, even for unsupported extensions
    let err = load(Path::new("data/no_such_file.exe")).expect_err("should not load");
    assert!(matches!(err, RagError::NotFound(_)));
}

#[test]
fn plain_text_loads_as_one_document() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("notes.txt");
    fs::write(&path, "Some notes about the system.").expect("should write file");

    let documents = load(&path).expect("should load");

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].text, "Some notes about the system.");
    assert_eq!(documents[0].metadata.source, path);
    assert_eq!(documents[0].metadata.page, None);
}

#[test]
fn empty_file_loads_without_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("empty.txt");
    fs::write(&path, "").expect("should write file");

    let documents = load(&path).expect("empty file should load");

    assert!(documents.len() <= 1);
    if let Some(document) = documents.first() {
        assert!(document.text.is_empty());
    }
}

#[test]
fn invalid_utf8_is_a_load_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("binary.txt");
    fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).expect("should write file");

    let err = load(&path).expect_err("invalid UTF-8 should fail");
    assert!(matches!(err, RagError::Load(_)));
}

#[test]
fn corrupt_pdf_is_a_load_error() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("broken.pdf");
    fs::write(&path, "this is not a pdf").expect("should write file");

    let err = load(&path).expect_err("corrupt PDF should fail");
    assert!(matches!(err, RagError::Load(_)));
}

#[test]
fn markdown_structure_is_flattened_to_text() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("guide.md");
    fs::write(
        &path,
        "# Setup\n\nInstall the service first.\n\n```sh\ncargo install ragserve\n```\n\n- step one\n- step two\n",
    )
    .expect("should write file");

    let documents = load(&path).expect("should load");

    assert_eq!(documents.len(), 1);
    let text = &documents[0].text;
    assert!(text.contains("Setup"));
    assert!(text.contains("Install the service first."));
    assert!(text.contains("cargo install ragserve"));
    assert!(text.contains("- step one"));
    assert!(!text.contains('#'));
    assert!(!text.contains("```"));
    assert_eq!(documents[0].metadata.page, None);
}

#[test]
fn markdown_without_headings_still_yields_a_document() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let path = temp_dir.path().join("plain.md");
    fs::write(&path, "Just a paragraph, nothing else.").expect("should write file");

    let documents = load(&path).expect("should load");

    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].text, "Just a paragraph, nothing else.");
}
