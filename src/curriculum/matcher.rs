//! Fuzzy name matching for curriculum lookups.
//! Case-insensitive normalized Levenshtein ratio on a 0-100 scale, gated by
//! a per-call threshold. No-match is a normal outcome, never an error.

use strsim::normalized_levenshtein;

/// A candidate accepted by [`find_best_match`], with its similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch<'a> {
    pub value: &'a str,
    /// Similarity on a 0-100 scale (100 = identical after lowercasing).
    pub score: u8,
}

/// Similarity between two strings on a 0-100 scale, ignoring case.
/// Character-ratio metric (Levenshtein-derived); the 70/75 thresholds used
/// across the service were tuned against this scale.
pub fn similarity_score(a: &str, b: &str) -> u8 {
    let ratio = normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase());
    (ratio * 100.0).round() as u8
}

/// Return the highest-scoring option with score >= `threshold`.
/// Ties keep the first option in iteration order, so callers must pass
/// options in a deterministic order. Empty query or empty options
/// short-circuit to `None` without scoring.
pub fn find_best_match<'a, S: AsRef<str>>(
    query: &str,
    options: &'a [S],
    threshold: u8,
) -> Option<FuzzyMatch<'a>> {
    if query.is_empty() || options.is_empty() {
        return None;
    }

    let mut best: Option<FuzzyMatch<'a>> = None;
    for option in options {
        let score = similarity_score(query, option.as_ref());
        match best {
            Some(current) if score <= current.score => {}
            _ => {
                best = Some(FuzzyMatch {
                    value: option.as_ref(),
                    score,
                });
            }
        }
    }

    best.filter(|m| m.score >= threshold)
}
