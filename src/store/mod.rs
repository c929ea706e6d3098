pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

use crate::core::{Comment, Idea, NewComment};
use crate::error::Result;
use crate::vote::{VoteOutcome, VoteType};

pub use memory::MemoryStore;

/// Full snapshot pushed to subscribers after every change
pub type Snapshot = Arc<Vec<Idea>>;

/// Submission payload before the store assigns an id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewIdea {
    pub text: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub author: Option<String>,

    /// Account id of the submitter
    #[serde(default)]
    pub user_id: Option<String>,
}

impl NewIdea {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn by_user(mut self, user_id: impl Into<String>, author: Option<String>) -> Self {
        self.user_id = Some(user_id.into());
        self.author = author;
        self
    }
}

/// Trait for idea persistence backends
#[async_trait]
pub trait IdeaStore: Send + Sync {
    /// Every idea, in insertion order
    async fn snapshot(&self) -> Result<Vec<Idea>>;

    /// Live feed of full snapshots
    fn subscribe(&self) -> watch::Receiver<Snapshot>;

    /// Persist a new idea and return it with its assigned id
    async fn insert(&self, idea: NewIdea, created_at: DateTime<Utc>) -> Result<Idea>;

    /// Atomically toggle `user_id`'s vote on `idea_id`
    async fn vote(&self, idea_id: &str, user_id: &str, vote_type: VoteType) -> Result<(Idea, VoteOutcome)>;

    /// Remove an idea along with its comments
    async fn delete(&self, idea_id: &str) -> Result<()>;

    /// Append to an idea's comment thread
    async fn add_comment(&self, idea_id: &str, comment: NewComment, timestamp: DateTime<Utc>) -> Result<Comment>;

    /// Comments on an idea, oldest first
    async fn comments(&self, idea_id: &str) -> Result<Vec<Comment>>;

    /// Get store name for logging
    fn name(&self) -> &str;
}
