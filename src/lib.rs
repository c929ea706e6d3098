//! # Idea Board Engine
//!
//! Pure ranking and duplicate detection for the Idea Board, with:
//! - Four feed orders: chronological, new, top and time-decayed hot
//! - Jaccard word-overlap duplicate detection
//! - Three-state vote toggling
//! - Boundary normalization of legacy backend documents
//! - A pluggable store, an HTTP API and a CLI on top
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, Utc};
//! use idea_board_engine::{find_similar, rank, Idea, RankMode, SimilarOptions};
//!
//! let now = Utc::now();
//! let ideas = vec![
//!     Idea::new("a", "Shared grocery list with barcode scanning", now - Duration::hours(10)).with_votes(3),
//!     Idea::new("b", "Podcast clip generator", now - Duration::hours(1)).with_votes(1),
//! ];
//!
//! let hot = rank(&ideas, RankMode::Hot, now);
//! assert_eq!(hot[0].id, "b");
//!
//! let dupes = find_similar("grocery list with barcode scanning", &ideas, &SimilarOptions::default());
//! assert_eq!(dupes[0].idea.id, "a");
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod ranking;
pub mod similarity;
pub mod store;
pub mod vote;

// Re-export primary types
pub use config::EngineConfig;
pub use crate::core::{Comment, Idea, NewComment, SimilarityMatch, VotedBy};
pub use engine::{FeedPage, FeedQuery, IdeaBoard};
pub use error::{IdeaBoardError, Result};
pub use filter::FeedFilter;
pub use normalize::{normalize_snapshot, RawIdea};
pub use ranking::{rank, RankMode, Ranker};
pub use similarity::{find_similar, SimilarOptions};
pub use store::{IdeaStore, MemoryStore, NewIdea};
pub use vote::{apply_vote, VoteOutcome, VoteState, VoteType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
