use chrono::{DateTime, Utc};

use crate::core::Idea;
use crate::ranking::{by_votes_then_recency, Ranker};

/// Hours added to the age before decaying
const AGE_OFFSET_HOURS: f64 = 2.0;

/// Decay exponent. Persisted expectations depend on this exact value.
const GRAVITY: f64 = 1.5;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Age of `idea` at `now` in hours, clamped to zero for future timestamps
pub fn age_hours(idea: &Idea, now: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(idea.created_at).num_milliseconds();
    (millis as f64 / MILLIS_PER_HOUR).max(0.0)
}

/// `votes / (age_hours + 2)^1.5`
pub fn hot_score(idea: &Idea, now: DateTime<Utc>) -> f64 {
    idea.votes as f64 / (age_hours(idea, now) + AGE_OFFSET_HOURS).powf(GRAVITY)
}

/// Non-finite scores rank below everything else
fn sortable(score: f64) -> f64 {
    if score.is_finite() {
        score
    } else {
        f64::NEG_INFINITY
    }
}

/// Sort by score descending, non-finite last, ties by votes then recency
fn order_by_score<'a>(scored: impl IntoIterator<Item = (f64, &'a Idea)>) -> Vec<Idea> {
    let mut scored: Vec<(f64, &Idea)> = scored
        .into_iter()
        .map(|(score, idea)| (sortable(score), idea))
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .total_cmp(score_a)
            .then_with(|| by_votes_then_recency(a, b))
    });

    scored.into_iter().map(|(_, idea)| idea.clone()).collect()
}

/// Time-decayed popularity
pub struct HotRanker;

impl HotRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HotRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker for HotRanker {
    fn rank(&self, ideas: &[Idea], now: DateTime<Utc>) -> Vec<Idea> {
        order_by_score(ideas.iter().map(|idea| (hot_score(idea, now), idea)))
    }

    fn name(&self) -> &str {
        "hot"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn aged(id: &str, votes: i64, hours: i64) -> Idea {
        Idea::new(id, "text", now() - Duration::hours(hours)).with_votes(votes)
    }

    #[test]
    fn test_score_formula() {
        let a = hot_score(&aged("a", 3, 10), now());
        let b = hot_score(&aged("b", 1, 1), now());
        let c = hot_score(&aged("c", 10, 100), now());

        assert!((a - 3.0 / 12f64.powf(1.5)).abs() < 1e-12);
        assert!((b - 1.0 / 3f64.powf(1.5)).abs() < 1e-12);
        assert!((c - 10.0 / 102f64.powf(1.5)).abs() < 1e-12);
        assert!((a - 0.072).abs() < 0.001);
        assert!((b - 0.192).abs() < 0.001);
        assert!((c - 0.0097).abs() < 0.0001);
    }

    #[test]
    fn test_decays_with_age() {
        let mut previous = f64::INFINITY;
        for hours in [0, 1, 5, 24, 24 * 7, 24 * 365] {
            let score = hot_score(&aged("x", 4, hours), now());
            assert!(score < previous, "age {}h did not decay", hours);
            previous = score;
        }
    }

    #[test]
    fn test_future_timestamp_is_clamped() {
        let future = Idea::new("future", "text", now() + Duration::days(30)).with_votes(5);
        let fresh = aged("fresh", 5, 0);

        assert_eq!(age_hours(&future, now()), 0.0);
        assert_eq!(hot_score(&future, now()), hot_score(&fresh, now()));
    }

    #[test]
    fn test_ties_fall_back_to_top_order() {
        let ideas = vec![aged("zero-old", 0, 50), aged("zero-new", 0, 1)];

        let ranked = HotRanker::new().rank(&ideas, now());
        assert_eq!(ranked[0].id, "zero-new");
        assert_eq!(ranked[1].id, "zero-old");
    }

    #[test]
    fn test_sentinel_timestamp_is_finite_and_low() {
        let broken = Idea::new("broken", "text", DateTime::<Utc>::MIN_UTC).with_votes(100);
        let score = hot_score(&broken, now());
        assert!(score.is_finite());

        let ranked = HotRanker::new().rank(&[broken, aged("ok", 1, 3)], now());
        assert_eq!(ranked[0].id, "ok");
    }

    #[test]
    fn test_non_finite_sorts_lowest() {
        assert_eq!(sortable(f64::NAN), f64::NEG_INFINITY);
        assert_eq!(sortable(f64::INFINITY), f64::NEG_INFINITY);
        assert!(sortable(-1e9) > sortable(f64::NAN));
    }

    #[test]
    fn test_non_finite_scores_rank_last() {
        let ideas = vec![
            aged("nan", 50, 1),
            aged("negative", -3, 1),
            aged("inf-old", 7, 40),
            aged("positive", 2, 1),
            aged("inf-new", 7, 2),
            aged("neg-inf", 1, 1),
        ];
        let scores = [f64::NAN, -0.5, f64::INFINITY, 0.4, f64::INFINITY, f64::NEG_INFINITY];

        let ranked = order_by_score(scores.into_iter().zip(ideas.iter()));
        let ids: Vec<&str> = ranked.iter().map(|i| i.id.as_str()).collect();

        // finite scores lead; the non-finite tail is ordered by votes, then recency
        assert_eq!(ids, vec!["positive", "negative", "nan", "inf-new", "inf-old", "neg-inf"]);
    }
}
