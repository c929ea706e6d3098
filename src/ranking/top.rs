use chrono::{DateTime, Utc};

use crate::core::Idea;
use crate::ranking::{by_votes_then_recency, Ranker};

/// Highest net score first, newer ideas winning ties
pub struct TopRanker;

impl TopRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TopRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker for TopRanker {
    fn rank(&self, ideas: &[Idea], _now: DateTime<Utc>) -> Vec<Idea> {
        let mut ranked = ideas.to_vec();
        ranked.sort_by(by_votes_then_recency);
        ranked
    }

    fn name(&self) -> &str {
        "top"
    }
}
