//! Extension-based document loading
//!
//! Each supported format has a loader behind the [`DocumentLoader`] trait. Formats
//! whose parser is compiled out (cargo features `pdf` and `docx`) are read as raw
//! text instead, so an upload never fails just because a parser is missing.

use std::path::Path;

use crate::error::Result;
use crate::types::Document;

/// Loading strategy chosen from a file's extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    /// PDF text extraction
    Pdf,
    /// Plain UTF-8 text
    Text,
    /// Word document
    Word,
}

impl LoaderKind {
    /// Pick a strategy for `path` (case-insensitive; unknown extensions are text)
    pub fn for_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if name.ends_with(".pdf") {
            Self::Pdf
        } else if name.ends_with(".txt") || name.ends_with(".md") {
            Self::Text
        } else if name.ends_with(".docx") || name.ends_with(".doc") {
            Self::Word
        } else {
            Self::Text
        }
    }
}

/// Loads a file into one or more documents
pub trait DocumentLoader: Send + Sync {
    /// Load the file at `path`
    fn load(&self, path: &Path) -> Result<Vec<Document>>;

    /// Loader name for logging
    fn name(&self) -> &'static str;
}

/// Return the loader for `path`, degrading to [`TextLoader`] when the format's
/// parser is not compiled in
pub fn loader_for_path(path: &Path) -> Box<dyn DocumentLoader> {
    match LoaderKind::for_path(path) {
        LoaderKind::Pdf => pdf_loader(),
        LoaderKind::Word => word_loader(),
        LoaderKind::Text => Box::new(TextLoader),
    }
}

#[cfg(feature = "pdf")]
fn pdf_loader() -> Box<dyn DocumentLoader> {
    Box::new(PdfLoader)
}

#[cfg(not(feature = "pdf"))]
fn pdf_loader() -> Box<dyn DocumentLoader> {
    tracing::warn!("PDF support not compiled in, reading PDF as raw text");
    Box::new(TextLoader)
}

#[cfg(feature = "docx")]
fn word_loader() -> Box<dyn DocumentLoader> {
    Box::new(WordLoader)
}

#[cfg(not(feature = "docx"))]
fn word_loader() -> Box<dyn DocumentLoader> {
    tracing::warn!("Word support not compiled in, reading document as raw text");
    Box::new(TextLoader)
}

/// Decode UTF-8, dropping invalid byte sequences rather than replacing them
pub fn decode_utf8_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());

    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // `valid_up_to` marks a prefix that is valid UTF-8
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(len) => bytes = &rest[len..],
                    // Truncated sequence at the very end
                    None => return out,
                }
            }
        }
    }
}

fn source_of(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Reads a file as UTF-8 text
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let data = std::fs::read(path)?;
        let content = decode_utf8_ignoring_invalid(&data);
        Ok(vec![Document::new(source_of(path), content)])
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

/// Extracts text from PDFs with `pdf-extract`, falling back to `lopdf`
#[cfg(feature = "pdf")]
pub struct PdfLoader;

#[cfg(feature = "pdf")]
impl PdfLoader {
    /// Time allowed for `pdf-extract` before switching to the fallback
    ///
    /// A thread that overruns is detached, not stopped: it keeps its copy of the
    /// file and a CPU until `pdf-extract` returns on its own.
    const EXTRACT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

    /// Run `pdf-extract` on its own thread; it can hang or panic on unusual fonts
    fn extract_with_timeout(data: &[u8]) -> std::result::Result<String, String> {
        use std::sync::mpsc;

        let data_vec = data.to_vec();
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || {
            let result = pdf_extract::extract_text_from_mem(&data_vec).map_err(|e| e.to_string());
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Self::EXTRACT_TIMEOUT) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Err(format!("timed out after {:?}", Self::EXTRACT_TIMEOUT))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err("extraction thread crashed".into()),
        }
    }

    /// Page-by-page extraction with `lopdf`
    fn extract_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| {
            crate::error::Error::file_parse(filename, format!("Failed to load PDF: {}", e))
        })?;

        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut all_text = String::new();
        for page in pages {
            match doc.extract_text(&[page]) {
                Ok(text) => all_text.push_str(&text),
                Err(e) => tracing::debug!("Could not extract text from page {}: {}", page, e),
            }
        }

        if all_text.trim().is_empty() {
            return Err(crate::error::Error::file_parse(
                filename,
                "PDF appears to be image-based or has no extractable text",
            ));
        }

        Ok(all_text)
    }
}

#[cfg(feature = "pdf")]
impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let data = std::fs::read(path)?;
        let filename = source_of(path);

        let content = match Self::extract_with_timeout(&data) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("pdf-extract failed on '{}': {}, trying fallback", filename, e);
                Self::extract_fallback(&filename, &data)?
            }
        };

        let content = content.replace('\0', "");
        tracing::debug!("Extracted {} chars from '{}'", content.chars().count(), filename);

        Ok(vec![Document::new(filename, content)])
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}

/// Reads paragraph text from `.docx` files
///
/// Legacy binary `.doc` files are not DOCX containers; those are read as raw text.
#[cfg(feature = "docx")]
pub struct WordLoader;

#[cfg(feature = "docx")]
impl WordLoader {
    fn extract(data: &[u8]) -> std::result::Result<String, String> {
        let doc = docx_rs::read_docx(data).map_err(|e| e.to_string())?;

        let mut content = String::new();
        for child in doc.document.children {
            if let docx_rs::DocumentChild::Paragraph(p) = child {
                for child in p.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                content.push_str(&t.text);
                            }
                        }
                    }
                }
                content.push('\n');
            }
        }

        Ok(content)
    }
}

#[cfg(feature = "docx")]
impl DocumentLoader for WordLoader {
    fn load(&self, path: &Path) -> Result<Vec<Document>> {
        let data = std::fs::read(path)?;
        let filename = source_of(path);

        match Self::extract(&data) {
            Ok(content) => Ok(vec![Document::new(filename, content)]),
            Err(e) if filename.to_lowercase().ends_with(".doc") => {
                tracing::warn!(
                    "'{}' is not a DOCX container ({}), reading as raw text",
                    filename,
                    e
                );
                Ok(vec![Document::new(filename, decode_utf8_ignoring_invalid(&data))])
            }
            Err(e) => Err(crate::error::Error::file_parse(filename, e)),
        }
    }

    fn name(&self) -> &'static str {
        "word"
    }
}
