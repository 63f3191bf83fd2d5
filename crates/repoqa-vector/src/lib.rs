//! repoqa-vector
//!
//! TF-IDF + cosine relevance over the chunk corpus. By default the vectorizer
//! is refit on every query; with `tfidf.cache_fit` the fit happens once at
//! build time and queries only pay for the transform. Both paths score
//! identically.
pub mod tfidf;

use repoqa_core::config::TfidfConfig;
use repoqa_core::traits::ChunkScorer;
use repoqa_core::types::Chunk;

pub use tfidf::{cosine_similarities, SparseVector, TfidfVectorizer};

enum Fit {
    PerQuery,
    Cached { vectorizer: TfidfVectorizer, rows: Vec<SparseVector> },
}

pub struct TfidfScorer {
    texts: Vec<String>,
    fit: Fit,
}

impl TfidfScorer {
    pub fn new(chunks: &[Chunk], config: TfidfConfig) -> Self {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let fit = if config.cache_fit && texts.len() > 1 {
            let (vectorizer, rows) = TfidfVectorizer::fit_transform(&texts);
            tracing::debug!(chunks = texts.len(), vocabulary = vectorizer.vocabulary_len(), "cached TF-IDF fit");
            Fit::Cached { vectorizer, rows }
        } else {
            Fit::PerQuery
        };
        Self { texts, fit }
    }

    pub fn is_cached(&self) -> bool {
        matches!(self.fit, Fit::Cached { .. })
    }

    /// Cosine similarity between `query` and every chunk, in [0, 1].
    ///
    /// A corpus of at most one chunk carries no inverse-document signal and
    /// scores all zeros.
    pub fn similarities(&self, query: &str) -> Vec<f32> {
        if self.texts.len() <= 1 {
            return vec![0.0; self.texts.len()];
        }
        match &self.fit {
            Fit::Cached { vectorizer, rows } => cosine_similarities(&vectorizer.transform(query), rows),
            Fit::PerQuery => {
                let (vectorizer, rows) = TfidfVectorizer::fit_transform(&self.texts);
                if vectorizer.vocabulary_len() == 0 {
                    tracing::debug!(chunks = self.texts.len(), "empty TF-IDF vocabulary, cosine scores are zero");
                    return vec![0.0; self.texts.len()];
                }
                cosine_similarities(&vectorizer.transform(query), &rows)
            }
        }
    }
}

impl ChunkScorer for TfidfScorer {
    fn name(&self) -> &'static str {
        "tfidf-cosine"
    }

    fn len(&self) -> usize {
        self.texts.len()
    }

    fn score(&self, query: &str) -> Vec<f32> {
        self.similarities(query)
    }
}
