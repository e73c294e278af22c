//! Text splitting into overlapping chunks
//!
//! Two strategies sit behind [`TextSplitter`]:
//! - [`RecursiveSplitter`] splits on paragraph, line and word boundaries before
//!   falling back to single characters, then merges pieces up to `chunk_size`.
//! - [`CharacterSplitter`] cuts fixed windows of `chunk_size` characters every
//!   `chunk_size - chunk_overlap` characters.
//!
//! All lengths are counted in characters (Unicode scalar values), not bytes.

use std::collections::VecDeque;

use crate::config::{ChunkingConfig, SplitterKind};
use crate::types::{Chunk, Document};

/// Splits document text into chunks
pub trait TextSplitter: Send + Sync {
    /// Split a single text
    fn split_text(&self, text: &str) -> Vec<String>;

    /// Split every document, tagging chunks with their source
    fn split_documents(&self, docs: &[Document]) -> Vec<Chunk> {
        docs.iter()
            .flat_map(|doc| {
                self.split_text(&doc.content)
                    .into_iter()
                    .map(move |content| Chunk::new(content, doc.source.clone()))
            })
            .collect()
    }

    /// Splitter name for logging
    fn name(&self) -> &'static str;
}

/// Build the splitter selected in `config`
pub fn splitter_for(config: &ChunkingConfig) -> Box<dyn TextSplitter> {
    match config.splitter {
        SplitterKind::Recursive => Box::new(RecursiveSplitter::new(
            config.chunk_size,
            config.chunk_overlap,
        )),
        SplitterKind::Character => Box::new(CharacterSplitter::new(
            config.chunk_size,
            config.chunk_overlap,
        )),
    }
}

/// Fixed-window character splitter
#[derive(Debug, Clone, Copy)]
pub struct CharacterSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for CharacterSplitter {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl CharacterSplitter {
    /// Create a new splitter
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Distance between consecutive window starts (never below 1)
    pub fn step(&self) -> usize {
        self.chunk_size.saturating_sub(self.chunk_overlap).max(1)
    }
}

impl TextSplitter for CharacterSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        // Byte offset of every char start, plus the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let len = offsets.len() - 1;
        let byte_at = |char_pos: usize| offsets[char_pos.min(len)];

        // Floored at 1 so empty text still yields one (empty) chunk
        (0..len.max(1))
            .step_by(self.step())
            .map(|start| {
                let end = start.saturating_add(self.chunk_size);
                text[byte_at(start)..byte_at(end)].to_string()
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "character"
    }
}

/// Separator-aware recursive splitter
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(1000, 200)
    }
}

impl RecursiveSplitter {
    /// Create a splitter with the default paragraph/line/word/char separators
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: ["\n\n", "\n", " ", ""].iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the separator list (tried in order; `""` splits into characters)
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    fn split_recursive(&self, text: &str, separators: &[String]) -> Vec<String> {
        // First separator present in the text wins; "" always matches
        let mut separator = "";
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() {
                separator = "";
                break;
            }
            if text.contains(sep.as_str()) {
                separator = sep;
                remaining = &separators[i + 1..];
                break;
            }
        }

        let mut chunks = Vec::new();
        let mut fitting: Vec<&str> = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }

            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }

        chunks
    }

    /// Greedily join pieces up to `chunk_size`, carrying up to `chunk_overlap`
    /// trailing characters into the next chunk
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);

            if total + len > self.chunk_size && !window.is_empty() {
                push_trimmed(&mut chunks, &window);

                while total > self.chunk_overlap
                    || (total + len > self.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        push_trimmed(&mut chunks, &window);
        chunks
    }
}

impl TextSplitter for RecursiveSplitter {
    fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn name(&self) -> &'static str {
        "recursive"
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn push_trimmed(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split `text` before every occurrence of `separator`, so each piece after the
/// first starts with it; `""` splits into single characters
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(separator) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}
