use std::ops::Range;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::{Chunk, Document};

/// Splits documents into overlapping character windows.
///
/// Adjacent windows share exactly `overlap` characters. Cuts land on a
/// paragraph break, then a line or sentence end, then any whitespace, as long
/// as one lies within the lookback window before the hard limit.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { config: ChunkingConfig::default() }
    }
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Chunk every document in order. The result's order defines chunk indices.
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut all_chunks = Vec::new();
        for doc in documents {
            all_chunks.extend(self.chunk(doc));
        }
        tracing::debug!(documents = documents.len(), chunks = all_chunks.len(), "chunked corpus");
        all_chunks
    }

    pub fn chunk(&self, doc: &Document) -> Vec<Chunk> {
        let offsets = char_byte_offsets(&doc.text);
        self.windows(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, range)| Chunk {
                doc_id: doc.id.clone(),
                meta: doc.meta.clone(),
                text: doc.text[offsets[range.start]..offsets[range.end]].to_string(),
                start: range.start,
                end: range.end,
                ordinal,
            })
            .collect()
    }

    /// Character ranges of the windows for `text`.
    pub fn windows(&self, text: &str) -> Vec<Range<usize>> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let ChunkingConfig { chunk_size, overlap } = self.config;
        if len == 0 {
            return Vec::new();
        }
        if len <= chunk_size {
            return vec![0..len];
        }

        let mut windows = Vec::new();
        let mut start = 0;
        loop {
            let hard_end = start + chunk_size;
            if hard_end >= len {
                windows.push(start..len);
                break;
            }
            let end = self.find_break(&chars, start, hard_end);
            windows.push(start..end);
            start = end - overlap;
        }
        windows
    }

    fn find_break(&self, chars: &[char], start: usize, hard_end: usize) -> usize {
        let floor = hard_end.saturating_sub(self.config.lookback()).max(start + self.config.overlap + 1);
        let candidates = || (floor..=hard_end).rev();

        let paragraph = |i: usize| i >= 2 && chars[i - 1] == '\n' && chars[i - 2] == '\n';
        let sentence = |i: usize| {
            chars[i - 1] == '\n' || (matches!(chars[i - 1], '.' | '!' | '?') && chars[i].is_whitespace())
        };
        let word = |i: usize| chars[i - 1].is_whitespace();

        candidates()
            .find(|&i| paragraph(i))
            .or_else(|| candidates().find(|&i| sentence(i)))
            .or_else(|| candidates().find(|&i| word(i)))
            .unwrap_or(hard_end)
    }
}

/// Byte offset of every char in `text`, plus `text.len()` as the final entry.
fn char_byte_offsets(text: &str) -> Vec<usize> {
    text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect()
}
