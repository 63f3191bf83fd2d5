use repoqa_core::config::FusionConfig;
use repoqa_core::error::{Error, Result};
use repoqa_core::types::ChunkIndex;

/// Weighted sum of the BM25 and cosine score vectors, position by position.
///
/// Both vectors must have exactly `chunk_count` entries. Anything else means
/// a scorer was built over a different chunk sequence, and the query aborts.
pub fn fuse(chunk_count: usize, bm25: &[f32], cosine: &[f32], weights: &FusionConfig) -> Result<Vec<f32>> {
    ensure_aligned("bm25", chunk_count, bm25)?;
    ensure_aligned("cosine", chunk_count, cosine)?;
    Ok(bm25
        .iter()
        .zip(cosine)
        .map(|(b, c)| weights.bm25_weight * b + weights.cosine_weight * c)
        .collect())
}

pub(crate) fn ensure_aligned(scorer: &'static str, expected: usize, scores: &[f32]) -> Result<()> {
    if scores.len() == expected {
        Ok(())
    } else {
        Err(Error::MisalignedScores { scorer, expected, actual: scores.len() })
    }
}

/// Indices of the `k` highest fused scores, best first.
///
/// Equal scores keep ascending chunk order. Selection is keyed on chunk index,
/// so two chunks with the same score both make it in.
pub fn select_top_k(fused: &[f32], k: usize) -> Vec<ChunkIndex> {
    let mut order: Vec<ChunkIndex> = (0..fused.len()).collect();
    order.sort_by(|&a, &b| fused[b].total_cmp(&fused[a]));

    let mut seen = vec![false; fused.len()];
    let mut picked = Vec::with_capacity(k.min(fused.len()));
    for idx in order {
        if picked.len() == k {
            break;
        }
        if std::mem::replace(&mut seen[idx], true) {
            continue;
        }
        picked.push(idx);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_weights_average_the_signals() {
        let fused = fuse(3, &[2.0, 0.0, 1.0], &[0.0, 1.0, 1.0], &FusionConfig::default()).expect("aligned");
        assert_eq!(fused, vec![1.0, 0.5, 1.0]);
    }

    #[test]
    fn misaligned_vectors_abort() {
        let err = fuse(3, &[1.0, 2.0], &[0.0, 0.0, 0.0], &FusionConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MisalignedScores { scorer: "bm25", expected: 3, actual: 2 }));
        let err = fuse(2, &[1.0, 2.0], &[0.0, 0.0, 0.0], &FusionConfig::default()).unwrap_err();
        assert!(matches!(err, Error::MisalignedScores { scorer: "cosine", expected: 2, actual: 3 }));
    }

    #[test]
    fn tied_scores_both_selected_in_index_order() {
        assert_eq!(select_top_k(&[0.9, 0.9, 0.1], 2), vec![0, 1]);
        assert_eq!(select_top_k(&[0.1, 0.5, 0.5, 0.5], 2), vec![1, 2]);
    }

    #[test]
    fn k_larger_than_corpus_returns_everything_ranked() {
        let picked = select_top_k(&[0.2, 0.7, 0.0, 0.7, 0.4], 10);
        assert_eq!(picked, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn zero_k_and_empty_scores() {
        assert!(select_top_k(&[0.3, 0.1], 0).is_empty());
        assert!(select_top_k(&[], 5).is_empty());
    }

    #[test]
    fn all_zero_scores_keep_input_order() {
        assert_eq!(select_top_k(&[0.0; 4], 3), vec![0, 1, 2]);
    }
}
