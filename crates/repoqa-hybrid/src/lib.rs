//! repoqa-hybrid
//!
//! Fuses BM25 and TF-IDF cosine scores into one ranking and selects the top-K
//! distinct chunks. [`IndexHandle`] publishes rebuilt engines by swapping in a
//! fresh immutable snapshot.
pub mod fusion;
pub mod handle;
pub mod render;

use repoqa_core::config::{FusionConfig, RetrievalConfig};
use repoqa_core::error::{Error, Result};
use repoqa_core::traits::{ChunkScorer, SearchEngine};
use repoqa_core::types::{Chunk, Document, SearchHit};
use repoqa_core::Chunker;
use repoqa_text::Bm25Index;
use repoqa_vector::TfidfScorer;

pub use fusion::{fuse, select_top_k};
pub use handle::IndexHandle;
pub use render::{clean_question, render_hits};

pub struct HybridSearchEngine<L = Bm25Index, V = TfidfScorer>
where
    L: ChunkScorer,
    V: ChunkScorer,
{
    chunks: Vec<Chunk>,
    lexical: L,
    vector: V,
    fusion: FusionConfig,
}

impl HybridSearchEngine {
    /// Chunk `documents` and build both scorers over the same chunk order.
    ///
    /// `Ok(None)` means the corpus produced no chunks: nothing to search.
    pub fn build(documents: &[Document], config: &RetrievalConfig) -> Result<Option<Self>> {
        config.validate()?;
        let chunks = Chunker::new(config.chunking)?.chunk_documents(documents);
        Self::from_chunks(chunks, config)
    }

    pub fn from_chunks(chunks: Vec<Chunk>, config: &RetrievalConfig) -> Result<Option<Self>> {
        let Some(lexical) = Bm25Index::build(&chunks, config.bm25) else {
            tracing::info!("no chunks to index");
            return Ok(None);
        };
        let vector = TfidfScorer::new(&chunks, config.tfidf);
        tracing::info!(chunks = chunks.len(), terms = lexical.vocabulary_len(), "built hybrid index");
        Self::with_scorers(chunks, lexical, vector, config.fusion).map(Some)
    }
}

impl<L, V> HybridSearchEngine<L, V>
where
    L: ChunkScorer,
    V: ChunkScorer,
{
    /// Assemble an engine from scorers built over `chunks`, in that order.
    pub fn with_scorers(chunks: Vec<Chunk>, lexical: L, vector: V, fusion: FusionConfig) -> Result<Self> {
        fusion.validate()?;
        ensure_built_over(&lexical, chunks.len())?;
        ensure_built_over(&vector, chunks.len())?;
        Ok(Self { chunks, lexical, vector, fusion })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn lexical(&self) -> &L {
        &self.lexical
    }

    /// Fused relevance of every chunk for `query`, aligned by chunk index.
    pub fn fused_scores(&self, query: &str) -> Result<Vec<f32>> {
        let bm25 = self.lexical.score(query);
        let cosine = self.vector.score(query);
        fuse(self.chunks.len(), &bm25, &cosine, &self.fusion)
    }

    /// The `k` most relevant distinct chunks, best first.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.chunks.is_empty() {
            return Ok(Vec::new());
        }
        let fused = self.fused_scores(query)?;
        let hits: Vec<SearchHit> = select_top_k(&fused, k)
            .into_iter()
            .enumerate()
            .map(|(i, chunk_index)| SearchHit {
                rank: i + 1,
                chunk_index,
                score: fused[chunk_index],
                chunk: self.chunks[chunk_index].clone(),
            })
            .collect();
        tracing::debug!(k, returned = hits.len(), top = ?hits.first().map(|h| h.score), "hybrid search");
        Ok(hits)
    }
}

fn ensure_built_over<S: ChunkScorer>(scorer: &S, chunk_count: usize) -> Result<()> {
    if scorer.len() == chunk_count {
        Ok(())
    } else {
        Err(Error::MisalignedScores { scorer: scorer.name(), expected: chunk_count, actual: scorer.len() })
    }
}

impl<L, V> SearchEngine for HybridSearchEngine<L, V>
where
    L: ChunkScorer,
    V: ChunkScorer,
{
    fn query(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.search(query, k)
    }
}
