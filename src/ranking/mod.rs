pub mod chronological;
pub mod hot;
pub mod top;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::Idea;
use crate::error::IdeaBoardError;

pub use chronological::ChronologicalRanker;
pub use hot::{hot_score, HotRanker};
pub use top::TopRanker;

/// Trait for feed ordering strategies.
///
/// Implementations must return a permutation of `ideas` and rely on a
/// stable sort so that fully tied ideas keep their input order.
pub trait Ranker: Send + Sync {
    /// Order `ideas` best first, as of `now`
    fn rank(&self, ideas: &[Idea], now: DateTime<Utc>) -> Vec<Idea>;

    /// Get ranker name for logging
    fn name(&self) -> &str;
}

/// Feed sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankMode {
    #[default]
    Chronological,
    New,
    Top,
    Hot,
}

static CHRONOLOGICAL: ChronologicalRanker = ChronologicalRanker;
static TOP: TopRanker = TopRanker;
static HOT: HotRanker = HotRanker;

impl RankMode {
    pub const ALL: [RankMode; 4] = [RankMode::Chronological, RankMode::New, RankMode::Top, RankMode::Hot];

    /// Strategy implementing this mode. `Chronological` and `New` share one.
    pub fn ranker(self) -> &'static dyn Ranker {
        match self {
            RankMode::Chronological | RankMode::New => &CHRONOLOGICAL,
            RankMode::Top => &TOP,
            RankMode::Hot => &HOT,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankMode::Chronological => "chronological",
            RankMode::New => "new",
            RankMode::Top => "top",
            RankMode::Hot => "hot",
        }
    }
}

impl fmt::Display for RankMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankMode {
    type Err = IdeaBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chronological" => Ok(RankMode::Chronological),
            "new" => Ok(RankMode::New),
            "top" => Ok(RankMode::Top),
            "hot" => Ok(RankMode::Hot),
            other => Err(IdeaBoardError::Config(format!("unknown rank mode: {}", other))),
        }
    }
}

/// Order a snapshot of ideas. Never filters, never mutates the input.
pub fn rank(ideas: &[Idea], mode: RankMode, now: DateTime<Utc>) -> Vec<Idea> {
    let ranker = mode.ranker();
    let ranked = ranker.rank(ideas, now);

    tracing::debug!(mode = %mode, ranker = ranker.name(), count = ranked.len(), "ranked ideas");
    debug_assert_eq!(ranked.len(), ideas.len());

    ranked
}

/// Votes descending, then newest first
pub(crate) fn by_votes_then_recency(a: &Idea, b: &Idea) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::collections::HashSet;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn idea(id: &str, votes: i64, hours_ago: i64) -> Idea {
        Idea::new(id, format!("idea {}", id), now() - Duration::hours(hours_ago)).with_votes(votes)
    }

    fn ids(ideas: &[Idea]) -> Vec<&str> {
        ideas.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_permutation_all_modes() {
        let ideas = vec![
            idea("a", 3, 10),
            idea("b", -2, 1),
            idea("c", 10, 100),
            idea("d", 0, 0),
            idea("e", 3, 10),
        ];
        let expected: HashSet<&str> = ids(&ideas).into_iter().collect();

        for mode in RankMode::ALL {
            let ranked = rank(&ideas, mode, now());
            assert_eq!(ranked.len(), ideas.len(), "{}", mode);
            let got: HashSet<&str> = ids(&ranked).into_iter().collect();
            assert_eq!(got, expected, "{}", mode);
        }
    }

    #[test]
    fn test_empty_input() {
        for mode in RankMode::ALL {
            assert!(rank(&[], mode, now()).is_empty());
        }
    }

    #[test]
    fn test_full_ties_keep_input_order() {
        let ideas = vec![idea("x", 2, 5), idea("y", 2, 5), idea("z", 2, 5)];
        let reversed: Vec<Idea> = ideas.iter().rev().cloned().collect();

        for mode in RankMode::ALL {
            assert_eq!(ids(&rank(&ideas, mode, now())), vec!["x", "y", "z"], "{}", mode);
            assert_eq!(ids(&rank(&reversed, mode, now())), vec!["z", "y", "x"], "{}", mode);
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let ideas = vec![idea("A", 3, 10), idea("B", 1, 1), idea("C", 10, 100)];

        assert_eq!(ids(&rank(&ideas, RankMode::Top, now())), vec!["C", "A", "B"]);
        assert_eq!(ids(&rank(&ideas, RankMode::New, now())), vec!["B", "A", "C"]);
        assert_eq!(ids(&rank(&ideas, RankMode::Chronological, now())), vec!["B", "A", "C"]);
        assert_eq!(ids(&rank(&ideas, RankMode::Hot, now())), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_input_not_mutated() {
        let ideas = vec![idea("a", 1, 3), idea("b", 5, 2)];
        let before = ideas.clone();
        let _ = rank(&ideas, RankMode::Top, now());
        assert_eq!(ideas, before);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("HOT".parse::<RankMode>().unwrap(), RankMode::Hot);
        assert_eq!(" new ".parse::<RankMode>().unwrap(), RankMode::New);
        assert!("random".parse::<RankMode>().is_err());
        assert_eq!(RankMode::default(), RankMode::Chronological);
        assert_eq!(RankMode::Top.to_string(), "top");
    }
}
