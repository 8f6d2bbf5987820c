//! Input documents and the metadata an ingestion run produces for them.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Declared format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    /// Plain text in an unknown byte encoding.
    Txt,
    /// EPUB archive. Handled by an external archive reader, not by this crate.
    Epub,
}

impl Format {
    /// Guess the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "txt" | "text" => Some(Format::Txt),
            "epub" => Some(Format::Epub),
            _ => None,
        }
    }

    /// The tag used by upload clients (`"TXT"`, `"EPUB"`).
    pub fn tag(self) -> &'static str {
        match self {
            Format::Txt => "TXT",
            Format::Epub => "EPUB",
        }
    }

    /// Parse an upload tag. Matching is case-insensitive.
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag.eq_ignore_ascii_case("TXT") {
            Some(Format::Txt)
        } else if tag.eq_ignore_ascii_case("EPUB") {
            Some(Format::Epub)
        } else {
            None
        }
    }
}

/// A byte buffer plus its declared format. Consumed by a single pipeline run.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub format: Format,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, format: Format) -> Self {
        Self { bytes, format }
    }

    /// Shorthand for a plain-text buffer.
    pub fn txt(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(bytes.into(), Format::Txt)
    }

    /// Read a document from disk, inferring the format from the extension.
    /// Files without a recognised extension are treated as plain text.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Format::from_extension)
            .unwrap_or(Format::Txt);
        let bytes = fs::read(path)?;
        Ok(Self { bytes, format })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fail unless this is a format the core pipeline handles.
    pub(crate) fn ensure_txt(&self) -> Result<()> {
        match self.format {
            Format::Txt => Ok(()),
            other => Err(Error::UnsupportedFormat(format!(
                "{} documents are handled by an external reader",
                other.tag()
            ))),
        }
    }
}

/// Per-document record written alongside the chapters.
///
/// Reading clients only need `total_pages` and `chars_per_page` to open a
/// session, so this is what [`DocumentStore::metadata`](crate::DocumentStore::metadata)
/// returns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentMeta {
    pub document_id: String,
    pub title: String,
    /// Label of the detected encoding (e.g. `"GBK"`).
    pub encoding: String,
    /// Size of the original upload in bytes.
    pub byte_len: usize,
    /// Length of the sanitized text in characters.
    pub total_chars: usize,
    pub total_pages: usize,
    pub chars_per_page: usize,
    pub chapter_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::from_extension("txt"), Some(Format::Txt));
        assert_eq!(Format::from_extension("TXT"), Some(Format::Txt));
        assert_eq!(Format::from_extension("epub"), Some(Format::Epub));
        assert_eq!(Format::from_extension("pdf"), None);
    }

    #[test]
    fn test_format_tags() {
        assert_eq!(Format::from_tag("txt"), Some(Format::Txt));
        assert_eq!(Format::from_tag("EPUB"), Some(Format::Epub));
        assert_eq!(Format::Txt.tag(), "TXT");
        assert_eq!(Format::from_tag("mobi"), None);
    }

    #[test]
    fn test_epub_is_rejected() {
        let doc = RawDocument::new(b"PK".to_vec(), Format::Epub);
        assert!(matches!(doc.ensure_txt(), Err(Error::UnsupportedFormat(_))));
        assert!(RawDocument::txt("abc").ensure_txt().is_ok());
    }

    #[test]
    fn test_open_reads_file() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        file.write_all("第一章 风起".as_bytes()).unwrap();

        let doc = RawDocument::open(file.path()).unwrap();
        assert_eq!(doc.format, Format::Txt);
        assert_eq!(doc.bytes, "第一章 风起".as_bytes());
    }
}
