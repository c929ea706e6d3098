use chrono::{DateTime, Utc};

use crate::core::Idea;
use crate::ranking::Ranker;

/// Newest first. Backs both `Chronological` and `New`.
pub struct ChronologicalRanker;

impl ChronologicalRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ChronologicalRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ranker for ChronologicalRanker {
    fn rank(&self, ideas: &[Idea], _now: DateTime<Utc>) -> Vec<Idea> {
        let mut ranked = ideas.to_vec();
        ranked.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        ranked
    }

    fn name(&self) -> &str {
        "chronological"
    }
}
