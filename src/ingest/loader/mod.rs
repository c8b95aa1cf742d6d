#[cfg(test)]
mod tests;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use std::path::Path;
use tracing::debug;

use crate::{RagError, Result};

use super::{DocumentMetadata, RawDocument};

/// The closed set of document formats the loader understands. Dispatch
/// happens once, at the boundary; unknown extensions are rejected before any
/// reader runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    PlainText,
    Markdown,
}

impl DocumentFormat {
    /// Select a format from the file extension, case-insensitively.
    #[inline]
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "txt" => Ok(Self::PlainText),
            "md" => Ok(Self::Markdown),
            _ => Err(RagError::UnsupportedFormat(format!(".{extension}"))),
        }
    }

    /// Whether a path carries a supported extension.
    #[inline]
    pub fn is_supported(path: &Path) -> bool {
        Self::from_path(path).is_ok()
    }
}

/// Load a document from disk, one `RawDocument` per page for PDFs and a
/// single `RawDocument` for text and Markdown files.
#[inline]
pub fn load(path: &Path) -> Result<Vec<RawDocument>> {
    if !path.exists() {
        return Err(RagError::NotFound(path.to_path_buf()));
    }

    let format = DocumentFormat::from_path(path)?;
    debug!("Loading {} as {:?}", path.display(), format);

    match format {
        DocumentFormat::Pdf => load_pdf(path),
        DocumentFormat::PlainText => load_plain_text(path),
        DocumentFormat::Markdown => load_markdown(path),
    }
}

/// Extract text from a PDF, page by page. Pages are numbered from 1.
fn load_pdf(path: &Path) -> Result<Vec<RawDocument>> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .map_err(|e| RagError::Load(format!("PDF extraction failed: {e}")))?;

    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| RawDocument {
            text,
            metadata: DocumentMetadata {
                source: path.to_path_buf(),
                page: Some(i as u32 + 1),
            },
        })
        .collect())
}

/// Read a UTF-8 text file as a single document.
fn load_plain_text(path: &Path) -> Result<Vec<RawDocument>> {
    let bytes = std::fs::read(path).map_err(|e| RagError::Load(format!("Read failed: {e}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| RagError::Load(format!("File is not valid UTF-8: {e}")))?;

    Ok(vec![RawDocument {
        text,
        metadata: DocumentMetadata {
            source: path.to_path_buf(),
            page: None,
        },
    }])
}

/// Read a Markdown file and flatten its structure to plain text, keeping
/// paragraph breaks and code block contents.
fn load_markdown(path: &Path) -> Result<Vec<RawDocument>> {
    let markdown = std::fs::read_to_string(path)
        .map_err(|e| RagError::Load(format!("Read failed: {e}")))?;

    Ok(vec![RawDocument {
        text: markdown_to_text(&markdown),
        metadata: DocumentMetadata {
            source: path.to_path_buf(),
            page: None,
        },
    }])
}

/// Walk the pulldown-cmark event stream and collect the visible text,
/// inserting paragraph breaks where the document structure has them.
fn markdown_to_text(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut text = String::new();

    for event in parser {
        match event {
            Event::Text(content) => text.push_str(&content),
            Event::Code(content) => text.push_str(&content),
            Event::SoftBreak => text.push(' '),
            Event::HardBreak => text.push('\n'),
            Event::Start(Tag::Item) => text.push_str("- "),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock | TagEnd::Item,
            ) => {
                text.push_str("\n\n");
            }
            Event::Rule => text.push_str("\n\n"),
            _ => {}
        }
    }

    text.trim().to_string()
}
