//! Vote toggling.
//!
//! Each (idea, user) pair is in one of three states. Pressing the same
//! button twice undoes the vote; pressing the opposite button flips it.
//!
//! | state     | upvote          | downvote          |
//! |-----------|-----------------|-------------------|
//! | Neutral   | Upvoted, +1     | Downvoted, -1     |
//! | Upvoted   | Neutral, -1     | Downvoted, -2     |
//! | Downvoted | Upvoted, +2     | Neutral, +1       |

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::core::Idea;
use crate::error::IdeaBoardError;

/// Button pressed by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteType::Upvote => f.write_str("upvote"),
            VoteType::Downvote => f.write_str("downvote"),
        }
    }
}

impl FromStr for VoteType {
    type Err = IdeaBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upvote" | "up" => Ok(VoteType::Upvote),
            "downvote" | "down" => Ok(VoteType::Downvote),
            other => Err(IdeaBoardError::Validation(format!("unknown vote type: {}", other))),
        }
    }
}

/// Where a user currently stands on an idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteState {
    Neutral,
    Upvoted,
    Downvoted,
}

impl VoteState {
    /// Next state and the change to the idea's net score
    pub fn transition(self, action: VoteType) -> (VoteState, i64) {
        match (self, action) {
            (VoteState::Neutral, VoteType::Upvote) => (VoteState::Upvoted, 1),
            (VoteState::Neutral, VoteType::Downvote) => (VoteState::Downvoted, -1),
            (VoteState::Upvoted, VoteType::Upvote) => (VoteState::Neutral, -1),
            (VoteState::Upvoted, VoteType::Downvote) => (VoteState::Downvoted, -2),
            (VoteState::Downvoted, VoteType::Downvote) => (VoteState::Neutral, 1),
            (VoteState::Downvoted, VoteType::Upvote) => (VoteState::Upvoted, 2),
        }
    }
}

/// New membership sets plus the score delta the caller must persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub new_upvoters: BTreeSet<String>,
    pub new_downvoters: BTreeSet<String>,
    pub vote_delta: i64,
    pub next_state: VoteState,
}

/// Apply one vote action for `user_id` without touching `idea`.
///
/// The returned sets never contain `user_id` twice, even if the input did.
pub fn apply_vote(idea: &Idea, user_id: &str, vote_type: VoteType) -> VoteOutcome {
    let current = idea.vote_state_of(user_id);
    let (next_state, vote_delta) = current.transition(vote_type);

    let mut new_upvoters = idea.voted_by.upvoters.clone();
    let mut new_downvoters = idea.voted_by.downvoters.clone();
    new_upvoters.remove(user_id);
    new_downvoters.remove(user_id);

    match next_state {
        VoteState::Upvoted => {
            new_upvoters.insert(user_id.to_string());
        }
        VoteState::Downvoted => {
            new_downvoters.insert(user_id.to_string());
        }
        VoteState::Neutral => {}
    }

    tracing::trace!(
        idea = %idea.id,
        user = user_id,
        action = %vote_type,
        ?current,
        ?next_state,
        vote_delta,
        "vote applied"
    );

    VoteOutcome {
        new_upvoters,
        new_downvoters,
        vote_delta,
        next_state,
    }
}

impl Idea {
    /// Write a [`VoteOutcome`] back into this idea
    pub fn commit_vote(&mut self, outcome: VoteOutcome) {
        self.votes += outcome.vote_delta;
        self.voted_by.upvoters = outcome.new_upvoters;
        self.voted_by.downvoters = outcome.new_downvoters;
    }
}
