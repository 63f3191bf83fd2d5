use crate::error::Result;
use crate::types::SearchHit;

/// A relevance model over a fixed chunk corpus.
///
/// Implementations return one score per chunk, aligned by chunk index, and
/// hold no query-time state, so one instance may serve concurrent readers.
pub trait ChunkScorer: Send + Sync {
    /// Short label used in logs and alignment errors.
    fn name(&self) -> &'static str;
    /// Number of chunks this scorer was built over.
    fn len(&self) -> usize;
    fn score(&self, query: &str) -> Vec<f32>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait SearchEngine: Send + Sync {
    fn query(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}
