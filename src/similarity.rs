//! Near-duplicate detection for new submissions.
//!
//! Texts are compared as sets of words longer than three characters using
//! the Jaccard index. Repeated words count once.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::{Idea, SimilarityMatch};

/// Words of this many characters or fewer carry no signal
const MIN_TOKEN_CHARS: usize = 3;

/// Tuning knobs for [`find_similar`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarOptions {
    /// Candidates shorter than this (after trimming) are never compared
    pub min_length: usize,

    /// Matches must score strictly above this
    pub threshold: f64,

    /// Upper bound on returned matches
    pub max_results: usize,
}

impl Default for SimilarOptions {
    fn default() -> Self {
        Self {
            min_length: 20,
            threshold: 0.3,
            max_results: 3,
        }
    }
}

/// Lowercased whitespace-separated words longer than three characters
pub fn tokenize(text: &str) -> HashSet<String> {
    text.split_whitespace()
        .map(str::to_lowercase)
        .filter(|token| token.chars().count() > MIN_TOKEN_CHARS)
        .collect()
}

/// `|A ∩ B| / |A ∪ B|`, or 0 when either side is empty
pub fn jaccard_index(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.union(b).count();

    intersection as f64 / union as f64
}

/// Similarity of two raw texts
pub fn text_similarity(a: &str, b: &str) -> f64 {
    jaccard_index(&tokenize(a), &tokenize(b))
}

/// Existing ideas that look like `candidate`, best match first
pub fn find_similar(candidate: &str, ideas: &[Idea], options: &SimilarOptions) -> Vec<SimilarityMatch> {
    if candidate.trim().chars().count() < options.min_length {
        return Vec::new();
    }

    let candidate_tokens = tokenize(candidate);
    if candidate_tokens.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<SimilarityMatch> = ideas
        .iter()
        .filter_map(|idea| {
            let score = jaccard_index(&candidate_tokens, &tokenize(&idea.text));
            (score > 0.0 && score > options.threshold).then(|| SimilarityMatch::new(idea.clone(), score))
        })
        .collect();

    // Stable sort keeps input order among equal scores
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(options.max_results);

    tracing::debug!(
        candidates = ideas.len(),
        matches = matches.len(),
        threshold = options.threshold,
        "similarity check"
    );

    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn idea(id: &str, text: &str) -> Idea {
        Idea::new(id, text, Utc::now())
    }

    #[test]
    fn test_tokenize_drops_short_words_and_repeats() {
        let tokens = tokenize("The app for BIKE bike sharing in town");
        let mut sorted: Vec<_> = tokens.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, vec!["bike", "sharing", "town"]);
    }

    #[test]
    fn test_jaccard_empty_is_zero() {
        let empty = HashSet::new();
        let some = tokenize("distributed caching layer");
        assert_eq!(jaccard_index(&empty, &some), 0.0);
        assert_eq!(jaccard_index(&empty, &empty), 0.0);
    }

    #[test]
    fn test_repetition_does_not_inflate() {
        let base = "rust compiler plugin";
        let repeated = "rust rust rust rust compiler plugin";
        assert_eq!(text_similarity(base, repeated), 1.0);
        assert!((text_similarity("rust compiler", "rust rust rust linter") - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_candidate_guard() {
        let ideas = vec![idea("1", "short")];
        assert!(find_similar("short", &ideas, &SimilarOptions::default()).is_empty());
        // whitespace does not count toward the length
        assert!(find_similar("   tiny candidate   ", &ideas, &SimilarOptions::default()).is_empty());
    }

    #[test]
    fn test_exact_match_first() {
        let text = "Build a browser extension that summarizes articles";
        let ideas = vec![
            idea("partial", "browser extension for bookmarks"),
            idea("exact", text),
            idea("unrelated", "weekly pottery classes downtown"),
        ];

        let matches = find_similar(text, &ideas, &SimilarOptions::default());

        assert_eq!(matches[0].idea.id, "exact");
        assert_eq!(matches[0].score, 1.0);
        assert!(matches.iter().all(|m| m.idea.id != "unrelated"));
    }

    #[test]
    fn test_no_shared_tokens_excluded_even_with_negative_threshold() {
        let ideas = vec![idea("1", "weekly pottery classes downtown")];
        let options = SimilarOptions {
            threshold: -1.0,
            ..SimilarOptions::default()
        };

        assert!(find_similar("machine learning playlist generator", &ideas, &options).is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        // {habit, tracker} vs {habit, tracker, with, streaks}: 2/4 = 0.5
        let ideas = vec![idea("1", "habit tracker with streaks")];
        let at = SimilarOptions {
            threshold: 0.5,
            min_length: 5,
            ..SimilarOptions::default()
        };
        let below = SimilarOptions { threshold: 0.49, ..at };

        assert!(find_similar("habit tracker", &ideas, &at).is_empty());
        assert_eq!(find_similar("habit tracker", &ideas, &below).len(), 1);
    }

    #[test]
    fn test_order_and_truncation() {
        let candidate = "open source recipe manager with meal planning";
        let ideas = vec![
            idea("a", "recipe manager"),
            idea("b", "open source recipe manager with meal planning"),
            idea("c", "recipe manager with meal planning"),
            idea("d", "open source recipe manager"),
            idea("e", "source recipe manager with meal planning"),
        ];

        let matches = find_similar(candidate, &ideas, &SimilarOptions::default());

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].idea.id, "b");
        assert!(matches[0].score >= matches[1].score);
        assert!(matches[1].score >= matches[2].score);
    }

    #[test]
    fn test_equal_scores_keep_input_order() {
        let candidate = "collaborative whiteboard for remote teams";
        let ideas = vec![
            idea("first", "collaborative whiteboard"),
            idea("second", "remote teams"),
        ];
        let options = SimilarOptions {
            threshold: 0.1,
            ..SimilarOptions::default()
        };

        let matches = find_similar(candidate, &ideas, &options);
        let order: Vec<&str> = matches.iter().map(|m| m.idea.id.as_str()).collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn test_empty_ideas() {
        assert!(find_similar("a long enough candidate text", &[], &SimilarOptions::default()).is_empty());
    }
}
