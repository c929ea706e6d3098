use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::comment::ANONYMOUS;
use crate::vote::VoteState;

/// Longest accepted idea text, in characters
pub const MAX_TEXT_LEN: usize = 500;

/// Most tags an idea can carry
pub const MAX_TAGS: usize = 5;

/// Longest tag, in characters
pub const MAX_TAG_LEN: usize = 20;

/// Per-idea vote membership.
///
/// A user id is in at most one of the two sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotedBy {
    #[serde(rename = "upvotes", default)]
    pub upvoters: BTreeSet<String>,

    #[serde(rename = "downvotes", default)]
    pub downvoters: BTreeSet<String>,
}

impl VotedBy {
    pub fn new(upvoters: BTreeSet<String>, downvoters: BTreeSet<String>) -> Self {
        Self { upvoters, downvoters }
    }

    /// Current state of `user_id`; upvote membership wins if both sets hold it
    pub fn state_of(&self, user_id: &str) -> VoteState {
        if self.upvoters.contains(user_id) {
            VoteState::Upvoted
        } else if self.downvoters.contains(user_id) {
            VoteState::Downvoted
        } else {
            VoteState::Neutral
        }
    }

    pub fn is_empty(&self) -> bool {
        self.upvoters.is_empty() && self.downvoters.is_empty()
    }
}

/// A user-submitted idea in canonical shape
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    /// Backend document id
    pub id: String,

    /// Idea body (1-500 characters, enforced on submission)
    pub text: String,

    /// Creation instant
    pub created_at: DateTime<Utc>,

    /// Net vote score
    #[serde(default)]
    pub votes: i64,

    /// Who voted which way
    #[serde(default)]
    pub voted_by: VotedBy,

    /// Lowercase tags in display order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Username, display name or email of the submitter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Account id of the submitter, used for "my ideas" and owner deletes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Idea {
    /// Create a fresh idea with no votes and no tags
    pub fn new(id: impl Into<String>, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            created_at,
            votes: 0,
            voted_by: VotedBy::default(),
            tags: Vec::new(),
            author: None,
            user_id: None,
        }
    }

    pub fn with_owner(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id.as_deref() == Some(user_id)
    }

    /// Author name as shown on the card
    pub fn display_author(&self) -> &str {
        self.author.as_deref().unwrap_or(ANONYMOUS)
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_votes(mut self, votes: i64) -> Self {
        self.votes = votes;
        self
    }

    pub fn vote_state_of(&self, user_id: &str) -> VoteState {
        self.voted_by.state_of(user_id)
    }

    /// Signed score as shown next to the vote buttons ("+3", "0", "-2")
    pub fn score_label(&self) -> String {
        if self.votes > 0 {
            format!("+{}", self.votes)
        } else {
            self.votes.to_string()
        }
    }

    /// "1 vote" / "N votes" on the absolute score, `None` at zero
    pub fn vote_count_label(&self) -> Option<String> {
        match self.votes.unsigned_abs() {
            0 => None,
            1 => Some("1 vote".to_string()),
            n => Some(format!("{} votes", n)),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Clean up user-entered tags.
///
/// Trims, strips a leading `#`, lowercases, drops empties and duplicates,
/// truncates each tag to `max_tag_len` chars and keeps at most `max_tags`.
pub fn normalize_tags<S: AsRef<str>>(tags: &[S], max_tags: usize, max_tag_len: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    for raw in tags {
        if out.len() >= max_tags {
            break;
        }

        let cleaned: String = raw
            .as_ref()
            .trim()
            .trim_start_matches('#')
            .trim()
            .to_lowercase()
            .chars()
            .take(max_tag_len)
            .collect();

        if cleaned.is_empty() || out.contains(&cleaned) {
            continue;
        }
        out.push(cleaned);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_idea_creation() {
        let idea = Idea::new("abc", "Build a bike-sharing map", created());
        assert_eq!(idea.id, "abc");
        assert_eq!(idea.votes, 0);
        assert!(idea.voted_by.is_empty());
        assert!(idea.tags.is_empty());
    }

    #[test]
    fn test_score_labels() {
        let idea = Idea::new("a", "x", created());
        assert_eq!(idea.score_label(), "0");
        assert_eq!(idea.vote_count_label(), None);

        let idea = idea.with_votes(1);
        assert_eq!(idea.score_label(), "+1");
        assert_eq!(idea.vote_count_label().as_deref(), Some("1 vote"));

        let idea = idea.with_votes(-4);
        assert_eq!(idea.score_label(), "-4");
        assert_eq!(idea.vote_count_label().as_deref(), Some("4 votes"));
    }

    #[test]
    fn test_voted_by_state() {
        let mut voted_by = VotedBy::default();
        voted_by.upvoters.insert("alice".to_string());
        voted_by.downvoters.insert("bob".to_string());

        assert_eq!(voted_by.state_of("alice"), VoteState::Upvoted);
        assert_eq!(voted_by.state_of("bob"), VoteState::Downvoted);
        assert_eq!(voted_by.state_of("carol"), VoteState::Neutral);
    }

    #[test]
    fn test_wire_shape() {
        let mut idea = Idea::new("i1", "Offline-first notes", created()).with_tags(["rust"]);
        idea.voted_by.upvoters.insert("u1".to_string());

        let value: serde_json::Value = serde_json::from_str(&idea.to_json().unwrap()).unwrap();
        assert_eq!(value["createdAt"], "2025-03-01T12:00:00Z");
        assert_eq!(value["votedBy"]["upvotes"][0], "u1");
        assert!(value.get("author").is_none());
        assert!(value.get("userId").is_none());

        let back = Idea::from_json(&idea.to_json().unwrap()).unwrap();
        assert_eq!(back, idea);
    }

    #[test]
    fn test_owner_and_author() {
        let idea = Idea::new("i1", "x", created());
        assert_eq!(idea.display_author(), "Anonymous");
        assert!(!idea.is_owned_by("u1"));

        let idea = idea.with_owner("u1");
        assert!(idea.is_owned_by("u1"));
        assert!(!idea.is_owned_by("u2"));

        let value: serde_json::Value = serde_json::from_str(&idea.to_json().unwrap()).unwrap();
        assert_eq!(value["userId"], "u1");
    }

    #[test]
    fn test_normalize_tags() {
        let raw = ["  #Rust ", "rust", "", "WebAssembly-And-Friends-Forever", "cli", "db", "ai", "extra"];
        let tags = normalize_tags(&raw, 5, 20);

        assert_eq!(tags, vec!["rust", "webassembly-and-frie", "cli", "db", "ai"]);
    }
}
