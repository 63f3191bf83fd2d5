//! repoqa-text
//!
//! Text normalization (regex cleanup + tantivy word tokenizers) and the BM25
//! lexical index built over the chunk corpus.

pub mod analyzer;
pub mod bm25;
pub mod normalize;

pub use bm25::Bm25Index;
pub use normalize::{clean, content_terms, normalize};
