//! Boundary adapter from backend documents to canonical [`Idea`]s.
//!
//! Older documents store `votedBy` as a flat array of upvoter ids, timestamps
//! come in several encodings, and most fields may be absent. Everything is
//! coerced here so the ranking code only ever sees the canonical shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

use crate::core::idea::{MAX_TAGS, MAX_TAG_LEN};
use crate::core::{normalize_tags, resolve_author, Idea, VotedBy};
use crate::error::{IdeaBoardError, Result};

/// Instant substituted for unreadable `createdAt` values
pub const OLDEST_INSTANT: DateTime<Utc> = DateTime::<Utc>::MIN_UTC;

/// `createdAt` in any encoding the backend has produced
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Firestore `Timestamp` object
    Firestore {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    /// Epoch milliseconds
    Millis(i64),
    FloatMillis(f64),
    /// RFC 3339, SQL-style datetime, or digits
    Text(String),
    Other(serde_json::Value),
}

/// `votedBy` in its legacy and current shapes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawVotedBy {
    /// Flat list of upvoters
    Legacy(Vec<String>),
    Split {
        #[serde(default)]
        upvotes: Vec<String>,
        #[serde(default)]
        downvotes: Vec<String>,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawVotes {
    Int(i64),
    Float(f64),
    Other(serde_json::Value),
}

/// Loosely-typed idea document.
///
/// String-ish fields are kept as raw JSON so one mistyped field degrades to
/// a default instead of rejecting the whole record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawIdea {
    pub id: Option<Value>,
    pub text: Option<Value>,
    pub created_at: Option<RawTimestamp>,
    pub votes: Option<RawVotes>,
    pub voted_by: Option<RawVotedBy>,
    pub tags: Option<Value>,
    pub user_id: Option<Value>,
    pub username: Option<Value>,
    pub user_display_name: Option<Value>,
    pub user_email: Option<Value>,
}

/// Convert a raw `createdAt` into an instant
pub fn parse_timestamp(id: &str, raw: Option<&RawTimestamp>) -> Result<DateTime<Utc>> {
    let invalid = |value: String| IdeaBoardError::InvalidTimestamp {
        id: id.to_string(),
        value,
    };

    match raw {
        None => Err(invalid("missing".to_string())),
        Some(RawTimestamp::Firestore { seconds, nanoseconds }) => DateTime::from_timestamp(*seconds, *nanoseconds)
            .ok_or_else(|| invalid(format!("{}s {}ns", seconds, nanoseconds))),
        Some(RawTimestamp::Millis(ms)) => {
            DateTime::from_timestamp_millis(*ms).ok_or_else(|| invalid(ms.to_string()))
        }
        Some(RawTimestamp::FloatMillis(ms)) => {
            if !ms.is_finite() {
                return Err(invalid(ms.to_string()));
            }
            DateTime::from_timestamp_millis(ms.trunc() as i64).ok_or_else(|| invalid(ms.to_string()))
        }
        Some(RawTimestamp::Text(text)) => parse_text_timestamp(text.trim()).ok_or_else(|| invalid(text.clone())),
        Some(RawTimestamp::Other(value)) => Err(invalid(value.to_string())),
    }
}

fn parse_text_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    text.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)
}

fn normalize_voted_by(id: &str, raw: Option<RawVotedBy>) -> VotedBy {
    let (upvotes, downvotes) = match raw {
        None => (Vec::new(), Vec::new()),
        Some(RawVotedBy::Legacy(upvotes)) => (upvotes, Vec::new()),
        Some(RawVotedBy::Split { upvotes, downvotes }) => (upvotes, downvotes),
        Some(RawVotedBy::Other(value)) => {
            tracing::warn!(idea = id, %value, "unrecognised votedBy shape, treating as empty");
            (Vec::new(), Vec::new())
        }
    };

    let upvoters: BTreeSet<String> = upvotes.into_iter().collect();
    // upvote wins when a user sits in both lists
    let downvoters: BTreeSet<String> = downvotes
        .into_iter()
        .filter(|user| !upvoters.contains(user))
        .collect();

    VotedBy::new(upvoters, downvoters)
}

fn normalize_votes(id: &str, raw: Option<RawVotes>) -> i64 {
    match raw {
        None => 0,
        Some(RawVotes::Int(votes)) => votes,
        Some(RawVotes::Float(votes)) if votes.is_finite() => votes.round() as i64,
        Some(other) => {
            tracing::warn!(idea = id, ?other, "unreadable vote count, using 0");
            0
        }
    }
}

/// Read a field that should be a string, stringifying scalars
fn coerce_string(id: &str, field: &'static str, raw: Option<Value>) -> Option<String> {
    match raw? {
        Value::Null => None,
        Value::String(text) => Some(text),
        scalar @ (Value::Number(_) | Value::Bool(_)) => {
            tracing::warn!(idea = id, field, %scalar, "non-string value, using its text form");
            Some(scalar.to_string())
        }
        other => {
            tracing::warn!(idea = id, field, %other, "unreadable value, ignoring");
            None
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keep the string entries of `tags`; a bare string counts as one tag
fn coerce_tags(id: &str, raw: Option<Value>) -> Vec<String> {
    match raw {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(tag)) => vec![tag],
        Some(Value::Array(items)) => {
            let total = items.len();
            let tags: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(tag) => Some(tag),
                    _ => None,
                })
                .collect();
            if tags.len() < total {
                tracing::warn!(idea = id, dropped = total - tags.len(), "dropping non-string tags");
            }
            tags
        }
        Some(other) => {
            tracing::warn!(idea = id, %other, "unrecognised tags shape, treating as empty");
            Vec::new()
        }
    }
}

/// Coerce one raw document into an [`Idea`].
///
/// Only a missing id is fatal. An unreadable `createdAt` becomes
/// [`OLDEST_INSTANT`] so the idea sorts last in time-based modes.
pub fn normalize(raw: RawIdea) -> Result<Idea> {
    let id = non_blank(coerce_string("?", "id", raw.id)).ok_or(IdeaBoardError::MissingField { field: "id" })?;

    let created_at = match parse_timestamp(&id, raw.created_at.as_ref()) {
        Ok(instant) => instant,
        Err(e) => {
            tracing::warn!("{}; substituting oldest instant", e);
            OLDEST_INSTANT
        }
    };

    let votes = normalize_votes(&id, raw.votes);
    let voted_by = normalize_voted_by(&id, raw.voted_by);
    let tags = normalize_tags(&coerce_tags(&id, raw.tags), MAX_TAGS, MAX_TAG_LEN);

    let username = coerce_string(&id, "username", raw.username);
    let display_name = coerce_string(&id, "userDisplayName", raw.user_display_name);
    let email = coerce_string(&id, "userEmail", raw.user_email);
    let author = resolve_author(username.as_deref(), display_name.as_deref(), email.as_deref());

    Ok(Idea {
        text: coerce_string(&id, "text", raw.text).unwrap_or_default(),
        user_id: non_blank(coerce_string(&id, "userId", raw.user_id)),
        id,
        created_at,
        votes,
        voted_by,
        tags,
        author,
    })
}

/// Normalize a single JSON document
pub fn normalize_value(value: serde_json::Value) -> Result<Idea> {
    let raw: RawIdea = serde_json::from_value(value)?;
    normalize(raw)
}

/// Normalize a whole snapshot, skipping documents that cannot be salvaged
pub fn normalize_snapshot(values: Vec<serde_json::Value>) -> Vec<Idea> {
    let total = values.len();

    let ideas: Vec<Idea> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match normalize_value(value) {
            Ok(idea) => Some(idea),
            Err(e) => {
                tracing::warn!(index, "skipping idea record: {}", e);
                None
            }
        })
        .collect();

    tracing::debug!(total, kept = ideas.len(), "normalized snapshot");
    ideas
}
