//! Domain types shared by the chunker, the scorers and the fusion stage.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Position of a chunk in the corpus-wide chunk sequence.
///
/// This is the chunk's identity for scoring, ranking and deduplication.
pub type ChunkIndex = usize;

/// Fixed-shape provenance carried from a document to each of its chunks.
///
/// - `source`: path of the file relative to the corpus root
/// - `file_id`: identifier unique to the file within one corpus load
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceMeta {
    pub source: String,
    pub file_id: String,
}

impl SourceMeta {
    pub fn new(source: impl Into<String>, file_id: impl Into<String>) -> Self {
        Self { source: source.into(), file_id: file_id.into() }
    }

    /// Final path component of `source`, or the whole string when it has none.
    pub fn basename(&self) -> &str {
        Path::new(&self.source)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.source)
    }
}

/// A loaded source file. Immutable once handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub meta: SourceMeta,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>, meta: SourceMeta) -> Self {
        Self { id: id.into(), text: text.into(), meta }
    }
}

/// A bounded window of a document's text, the unit of retrieval.
///
/// `start`/`end` are character (not byte) offsets into the parent document,
/// half-open. `ordinal` is the chunk's position within that document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub doc_id: String,
    pub meta: SourceMeta,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub ordinal: usize,
}

impl Chunk {
    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// One ranked result handed to downstream consumers.
///
/// `rank` is 1-based. `score` is the fused relevance; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub rank: usize,
    pub chunk_index: ChunkIndex,
    pub score: f32,
    pub chunk: Chunk,
}
