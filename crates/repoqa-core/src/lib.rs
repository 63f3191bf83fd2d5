//! Core types, configuration and chunking for the repoqa retrieval engine.
//!
//! The [`Chunker`] turns loaded [`Document`]s into the corpus-wide [`Chunk`]
//! sequence that every scorer indexes by position.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::Chunker;
pub use config::{Bm25Config, ChunkingConfig, Config, FusionConfig, RetrievalConfig, TfidfConfig};
pub use error::{Error, Result};
pub use types::{Chunk, ChunkIndex, Document, SearchHit, SourceMeta};
