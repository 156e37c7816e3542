//! String similarity between normalized names.
//!
//! The default measure is the LCS ratio `2 * LCS(a, b) / (|a| + |b|)` over
//! chars: symmetric, in [0, 1], and 1.0 only for equal strings. The strsim
//! measures are available for tuning.

use unify_core::config::SimilarityMeasure;

/// Similarity of `a` and `b` under `measure`, in [0, 1].
pub fn similarity(measure: SimilarityMeasure, a: &str, b: &str) -> f64 {
    match measure {
        SimilarityMeasure::Lcs => lcs_ratio(a, b),
        SimilarityMeasure::Levenshtein => strsim::normalized_levenshtein(a, b),
        SimilarityMeasure::JaroWinkler => strsim::jaro_winkler(a, b),
    }
}

/// LCS ratio of two strings. Two empty strings are identical (1.0).
pub fn lcs_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_len(&a, &b) as f64 / total as f64
}

/// Length of the longest common subsequence, two-row DP.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    // Iterate the longer string so the rows stay short.
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; inner.len() + 1];
    let mut curr = vec![0usize; inner.len() + 1];

    for &x in outer {
        for (j, &y) in inner.iter().enumerate() {
            curr[j + 1] = if x == y {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[inner.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_lcs_ratio_values() {
        assert_abs_diff_eq!(lcs_ratio("fed rate cuts", "fed rate cut"), 0.96, epsilon = 1e-12);
        assert_abs_diff_eq!(lcs_ratio("biden election", "trump election"), 9.0 / 14.0, epsilon = 1e-12);
        assert_abs_diff_eq!(
            lcs_ratio("federal reserve rate cut", "fed rate cut"),
            2.0 / 3.0,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(lcs_ratio("über", "uber"), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_lcs_ratio_edges() {
        assert_eq!(lcs_ratio("", ""), 1.0);
        assert_eq!(lcs_ratio("", "abc"), 0.0);
        assert_eq!(lcs_ratio("abc", "abc"), 1.0);
        assert_eq!(lcs_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_lcs_ratio_symmetric() {
        let pairs = [
            ("biden election", "presidential election democratic winner"),
            ("fed rate cut", "federal reserve rate cut"),
            ("abcd z", "abcd x"),
        ];
        for (a, b) in pairs {
            assert_eq!(lcs_ratio(a, b), lcs_ratio(b, a));
        }
    }

    #[test]
    fn test_strsim_measures() {
        assert_abs_diff_eq!(
            similarity(SimilarityMeasure::Levenshtein, "kitten", "sitting"),
            1.0 - 3.0 / 7.0,
            epsilon = 1e-12
        );
        assert_eq!(similarity(SimilarityMeasure::Levenshtein, "", ""), 1.0);
        let jw = similarity(SimilarityMeasure::JaroWinkler, "fed rate cut", "fed rate cuts");
        assert!(jw > 0.9 && jw <= 1.0);
        assert_eq!(
            similarity(SimilarityMeasure::Lcs, "fed rate cut", "fed rate cut"),
            1.0
        );
    }
}
