//! Text splitting into overlapping, size-bounded chunks

use std::collections::VecDeque;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, PageText};

/// Separators tried coarsest-first when cutting text
const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Splits page text into chunks of at most `chunk_size` characters, with
/// `chunk_overlap` characters carried between consecutive chunks of the
/// same page.
///
/// Splitting is deterministic and partition-only: every produced chunk is a
/// contiguous substring of the input (separators stay attached to the piece
/// they follow), and identical input always yields the identical sequence.
#[derive(Debug)]
pub struct ChunkSplitter {
    /// Maximum chunk length in characters
    chunk_size: usize,
    /// Characters shared between neighboring chunks
    chunk_overlap: usize,
}

impl ChunkSplitter {
    /// Create a new splitter; fails when the overlap is not smaller than the size
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create a splitter from the chunking configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split every page of a document, preserving page order and attribution.
    /// Overlap never crosses a page boundary.
    pub fn split_pages(&self, source: &str, pages: &[PageText]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for page in pages {
            for text in self.split_text(&page.text) {
                chunks.push(Chunk::new(source, page.page, text));
            }
        }
        chunks
    }

    /// Split raw text into chunk strings
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if char_len(text) <= self.chunk_size {
            return vec![text.to_string()];
        }
        let pieces = self.fragment(text, &SEPARATORS);
        self.merge(pieces)
    }

    /// Cut text into pieces no longer than `chunk_size`, preferring the
    /// coarsest separator that still occurs in the text
    fn fragment(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let Some(pos) = separators.iter().position(|s| text.contains(s)) else {
            return self.hard_split(text);
        };
        let sep = separators[pos];
        let rest = &separators[pos + 1..];

        let mut pieces = Vec::new();
        let mut parts = text.split(sep).peekable();
        while let Some(part) = parts.next() {
            // the separator stays attached to the piece it follows so that
            // concatenating a window of pieces reproduces the original text
            let piece = if parts.peek().is_some() {
                format!("{}{}", part, sep)
            } else {
                part.to_string()
            };
            if piece.is_empty() {
                continue;
            }
            if char_len(&piece) <= self.chunk_size {
                pieces.push(piece);
            } else {
                pieces.extend(self.fragment(&piece, rest));
            }
        }
        pieces
    }

    /// Last resort for text without any separator: cut at character boundaries
    fn hard_split(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        chars
            .chunks(self.chunk_size)
            .map(|cell| cell.iter().collect())
            .collect()
    }

    /// Greedily pack pieces into chunks, keeping a tail window of at most
    /// `chunk_overlap` characters between neighbors
    fn merge(&self, pieces: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<String> = VecDeque::new();
        let mut window_len = 0usize;

        for piece in pieces {
            let piece_len = char_len(&piece);
            if !window.is_empty() && window_len + piece_len > self.chunk_size {
                chunks.push(concat(&window));
                while window_len > self.chunk_overlap
                    || (!window.is_empty() && window_len + piece_len > self.chunk_size)
                {
                    match window.pop_front() {
                        Some(front) => window_len -= char_len(&front),
                        None => break,
                    }
                }
            }
            window_len += piece_len;
            window.push_back(piece);
        }

        if !window.is_empty() {
            chunks.push(concat(&window));
        }
        chunks
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn concat(window: &VecDeque<String>) -> String {
    window.iter().map(String::as_str).collect()
}
