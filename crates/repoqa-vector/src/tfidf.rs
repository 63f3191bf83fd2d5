//! TF-IDF vectorizer with sublinear term frequency and smoothed IDF.
//!
//! Rows are L2-normalized, so cosine similarity reduces to a sparse dot product.

use std::collections::HashMap;

use repoqa_text::content_terms;

/// Sparse row of `(term id, weight)` pairs sorted by term id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0_f32);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and IDF weights from analyzed documents.
    ///
    /// idf(t) = ln((1 + n) / (1 + df(t))) + 1
    pub fn fit(documents: &[Vec<String>]) -> Self {
        let mut vocabulary: HashMap<String, u32> = HashMap::new();
        let mut df: Vec<u32> = Vec::new();
        for terms in documents {
            let mut seen: Vec<u32> = terms
                .iter()
                .map(|t| {
                    let next = vocabulary.len() as u32;
                    *vocabulary.entry(t.clone()).or_insert(next)
                })
                .collect();
            seen.sort_unstable();
            seen.dedup();
            for id in seen {
                if id as usize >= df.len() {
                    df.resize(id as usize + 1, 0);
                }
                df[id as usize] += 1;
            }
        }
        let n = documents.len() as f64;
        let idf = df.iter().map(|&d| (((1.0 + n) / (1.0 + f64::from(d))).ln() + 1.0) as f32).collect();
        Self { vocabulary, idf }
    }

    /// Analyze and fit raw texts, returning the vectorizer and one row per text.
    pub fn fit_transform<S: AsRef<str>>(texts: &[S]) -> (Self, Vec<SparseVector>) {
        let analyzed: Vec<Vec<String>> = texts.iter().map(|t| content_terms(t.as_ref())).collect();
        let vectorizer = Self::fit(&analyzed);
        let rows = analyzed.iter().map(|terms| vectorizer.transform_terms(terms)).collect();
        (vectorizer, rows)
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Analyze `text` and project it into the fitted feature space.
    pub fn transform(&self, text: &str) -> SparseVector {
        self.transform_terms(&content_terms(text))
    }

    /// Terms outside the vocabulary are ignored. A row with no known terms
    /// is the zero vector.
    pub fn transform_terms(&self, terms: &[String]) -> SparseVector {
        let mut counts: HashMap<u32, u32> = HashMap::new();
        for t in terms {
            if let Some(&id) = self.vocabulary.get(t) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        let mut entries: Vec<(u32, f32)> = counts
            .into_iter()
            .map(|(id, tf)| (id, (1.0 + (tf as f32).ln()) * self.idf[id as usize]))
            .collect();
        entries.sort_unstable_by_key(|&(id, _)| id);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }
        SparseVector { entries }
    }
}

/// Cosine similarity of `query` against each row, clamped to [0, 1].
///
/// Both sides must already be L2-normalized (or zero).
pub fn cosine_similarities(query: &SparseVector, rows: &[SparseVector]) -> Vec<f32> {
    if query.is_empty() {
        return vec![0.0; rows.len()];
    }
    rows.iter().map(|row| query.dot(row).clamp(0.0, 1.0)).collect()
}
