//! BM25 Okapi lexical index over the corpus-wide chunk sequence.
//!
//! Built once per corpus load and read-only afterwards. Scores come back as a
//! dense vector aligned with chunk indices, so fusion can combine them with
//! other models position by position.

use std::collections::HashMap;

use repoqa_core::config::Bm25Config;
use repoqa_core::traits::ChunkScorer;
use repoqa_core::types::Chunk;

use crate::normalize::normalize;

/// A single entry in a term's postings list.
#[derive(Debug, Clone, Copy)]
struct Posting {
    chunk: u32,
    term_frequency: u32,
}

#[derive(Debug, Clone)]
struct TermEntry {
    idf: f32,
    postings: Vec<Posting>,
}

#[derive(Debug, Clone)]
pub struct Bm25Index {
    terms: HashMap<String, TermEntry>,
    chunk_lengths: Vec<u32>,
    avgdl: f32,
    config: Bm25Config,
}

impl Bm25Index {
    /// Normalize every chunk and build the index.
    ///
    /// Returns `None` for an empty chunk set: there is nothing to search, and
    /// callers answer such queries with an empty result.
    pub fn build(chunks: &[Chunk], config: Bm25Config) -> Option<Self> {
        Self::from_token_sequences(chunks.iter().map(|c| normalize(&c.text)).collect(), config)
    }

    /// Build from pre-tokenized chunks, one token sequence per chunk index.
    pub fn from_token_sequences(sequences: Vec<Vec<String>>, config: Bm25Config) -> Option<Self> {
        if sequences.is_empty() {
            return None;
        }

        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut chunk_lengths = Vec::with_capacity(sequences.len());
        let mut total_length: u64 = 0;
        for (chunk, tokens) in sequences.into_iter().enumerate() {
            chunk_lengths.push(tokens.len() as u32);
            total_length += tokens.len() as u64;

            let mut tf_map: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *tf_map.entry(token).or_insert(0) += 1;
            }
            for (term, term_frequency) in tf_map {
                postings.entry(term).or_default().push(Posting { chunk: chunk as u32, term_frequency });
            }
        }

        let n = chunk_lengths.len() as f64;
        let avgdl = (total_length as f64 / n) as f32;
        let raw_idf: Vec<(String, Vec<Posting>, f64)> = postings
            .into_iter()
            .map(|(term, list)| {
                let df = list.len() as f64;
                let idf = (n - df + 0.5).ln() - (df + 0.5).ln();
                (term, list, idf)
            })
            .collect();
        let mean_idf = if raw_idf.is_empty() {
            0.0
        } else {
            raw_idf.iter().map(|(_, _, idf)| idf).sum::<f64>() / raw_idf.len() as f64
        };
        // terms in more than half the chunks get a small positive weight instead of a penalty
        let floor = (f64::from(config.epsilon) * mean_idf).max(0.0);
        let terms: HashMap<String, TermEntry> = raw_idf
            .into_iter()
            .map(|(term, postings, idf)| {
                let idf = if idf < 0.0 { floor } else { idf };
                (term, TermEntry { idf: idf as f32, postings })
            })
            .collect();

        tracing::debug!(chunks = chunk_lengths.len(), terms = terms.len(), avgdl, "built BM25 index");
        Some(Self { terms, chunk_lengths, avgdl, config })
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_lengths.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.terms.len()
    }

    /// One score per chunk for a normalized query.
    ///
    /// Repeated query terms count once per occurrence; unknown terms add nothing.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let Bm25Config { k1, b, .. } = self.config;
        let mut scores = vec![0.0_f32; self.chunk_lengths.len()];
        for token in query_tokens {
            let Some(entry) = self.terms.get(token) else { continue };
            for posting in &entry.postings {
                let idx = posting.chunk as usize;
                let dl = self.chunk_lengths[idx] as f32;
                let tf = posting.term_frequency as f32;
                scores[idx] += entry.idf * (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * dl / self.avgdl));
            }
        }
        scores
    }
}

impl ChunkScorer for Bm25Index {
    fn name(&self) -> &'static str {
        "bm25"
    }

    fn len(&self) -> usize {
        self.chunk_count()
    }

    fn score(&self, query: &str) -> Vec<f32> {
        self.scores(&normalize(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(texts: &[&str]) -> Vec<Vec<String>> {
        texts.iter().map(|t| normalize(t)).collect()
    }

    fn build_corpus() -> Bm25Index {
        Bm25Index::from_token_sequences(
            seq(&[
                "rust programming systems language fast",
                "python programming scripting easy",
                "java enterprise programming verbose",
                "rust memory safety zero cost abstractions",
                "go concurrency channels goroutines",
            ]),
            Bm25Config::default(),
        )
        .expect("non-empty corpus")
    }

    #[test]
    fn empty_chunk_set_has_no_index() {
        assert!(Bm25Index::build(&[], Bm25Config::default()).is_none());
        assert!(Bm25Index::from_token_sequences(Vec::new(), Bm25Config::default()).is_none());
    }

    #[test]
    fn scores_are_aligned_with_chunks() {
        let idx = build_corpus();
        let scores = idx.score("rust");
        assert_eq!(scores.len(), 5);
        assert!(scores[0] > 0.0 && scores[3] > 0.0);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], 0.0);
        assert_eq!(scores[4], 0.0);
    }

    #[test]
    fn matches_okapi_formula() {
        let idx = build_corpus();
        // "python": df = 1, N = 5, doc 1 has 4 tokens, avgdl = 23 / 5
        let idf = ((5.0_f64 - 1.0 + 0.5).ln() - (1.0_f64 + 0.5).ln()) as f32;
        let avgdl = 23.0_f32 / 5.0;
        let expected = idf * (1.0 * 2.5) / (1.0 + 1.5 * (1.0 - 0.75 + 0.75 * 4.0 / avgdl));
        assert!((idx.avgdl - avgdl).abs() < 1e-6);
        let got = idx.score("python")[1];
        assert!((got - expected).abs() < 1e-5, "got {got}, expected {expected}");
    }

    #[test]
    fn common_terms_get_epsilon_floor_not_negative_idf() {
        let idx = build_corpus();
        // "programming" is in 3 of 5 chunks: raw idf = ln(2.5 / 3.5) < 0
        let idf = idx.terms.get("programming").map(|t| t.idf).expect("indexed");
        assert!(idf >= 0.0);
        for s in idx.score("programming language") {
            assert!(s >= 0.0, "BM25 scores must be non-negative, got {s}");
        }
    }

    #[test]
    fn repeated_query_terms_accumulate() {
        let idx = build_corpus();
        let once = idx.score("python")[1];
        let twice = idx.score("python python")[1];
        assert!((twice - 2.0 * once).abs() < 1e-5);
    }

    #[test]
    fn higher_term_frequency_ranks_first() {
        let idx = Bm25Index::from_token_sequences(
            seq(&["rust rust rust", "rust programming", "cooking recipes", "garden tools", "weather forecast"]),
            Bm25Config::default(),
        )
        .expect("index");
        let scores = idx.score("rust");
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn degenerate_query_scores_zero() {
        let idx = build_corpus();
        assert!(idx.score("?!? 1234 ...").iter().all(|&s| s == 0.0));
        assert!(idx.score("nonexistent").iter().all(|&s| s == 0.0));
    }

    #[test]
    fn chunks_without_tokens_are_tolerated() {
        let idx = Bm25Index::from_token_sequences(seq(&["1234", "!!!"]), Bm25Config::default()).expect("index");
        assert_eq!(idx.vocabulary_len(), 0);
        assert_eq!(idx.score("anything"), vec![0.0, 0.0]);
    }
}
