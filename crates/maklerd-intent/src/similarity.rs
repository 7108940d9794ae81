// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cosine similarity over embedding vectors.

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ, so a
/// degenerate embedding can never clear a routing threshold.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![0.5, -0.3, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn mismatched_lengths_score_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }

    proptest! {
        /// Scaling one vector by a positive factor leaves the score unchanged.
        #[test]
        fn scale_invariant(
            v in proptest::collection::vec(-10.0f32..10.0, 3..16),
            k in 0.1f32..100.0,
        ) {
            let w: Vec<f32> = v.iter().map(|x| x + 1.0).collect();
            let scaled: Vec<f32> = v.iter().map(|x| x * k).collect();
            let a = cosine_similarity(&v, &w);
            let b = cosine_similarity(&scaled, &w);
            prop_assert!((a - b).abs() < 1e-3, "a={a}, b={b}");
        }

        /// Scores stay within [-1, 1] up to float error.
        #[test]
        fn bounded(
            (v, w) in (3usize..16).prop_flat_map(|n| (
                proptest::collection::vec(-10.0f32..10.0, n),
                proptest::collection::vec(-10.0f32..10.0, n),
            )),
        ) {
            prop_assume!(v.len() == w.len());
            let s = cosine_similarity(&v, &w);
            prop_assert!(s.abs() <= 1.0 + 1e-4);
        }
    }
}
