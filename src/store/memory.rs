use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};

use crate::core::{Comment, Idea, NewComment};
use crate::error::{IdeaBoardError, Result};
use crate::store::{IdeaStore, NewIdea, Snapshot};
use crate::vote::{apply_vote, VoteOutcome, VoteType};

/// In-process store backed by a vector.
///
/// Mutations hold the write lock for the whole read-modify-write, so two
/// votes on the same idea can never interleave. Locks are taken ideas first,
/// then comments.
pub struct MemoryStore {
    ideas: RwLock<Vec<Idea>>,
    next_id: AtomicU64,
    snapshots: watch::Sender<Snapshot>,
    comments: RwLock<HashMap<String, Vec<Comment>>>,
    next_comment_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_ideas(Vec::new())
    }

    /// Seed with existing ideas; ids `idea-N` continue after the seed count
    pub fn with_ideas(ideas: Vec<Idea>) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(ideas.clone()));
        Self {
            next_id: AtomicU64::new(ideas.len() as u64 + 1),
            ideas: RwLock::new(ideas),
            snapshots,
            comments: RwLock::new(HashMap::new()),
            next_comment_id: AtomicU64::new(1),
        }
    }

    fn publish(&self, ideas: &[Idea]) {
        // send_replace never fails, even with no receivers
        self.snapshots.send_replace(Arc::new(ideas.to_vec()));
    }

    fn allocate_id(&self, existing: &[Idea]) -> String {
        loop {
            let id = format!("idea-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
            if !existing.iter().any(|idea| idea.id == id) {
                return id;
            }
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdeaStore for MemoryStore {
    async fn snapshot(&self) -> Result<Vec<Idea>> {
        Ok(self.ideas.read().await.clone())
    }

    fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    async fn insert(&self, new_idea: NewIdea, created_at: DateTime<Utc>) -> Result<Idea> {
        let mut ideas = self.ideas.write().await;

        let mut idea = Idea::new(self.allocate_id(&ideas), new_idea.text, created_at).with_tags(new_idea.tags);
        idea.author = new_idea.author;
        idea.user_id = new_idea.user_id;

        ideas.push(idea.clone());
        self.publish(&ideas);

        tracing::debug!(id = %idea.id, total = ideas.len(), "idea inserted");
        Ok(idea)
    }

    async fn vote(&self, idea_id: &str, user_id: &str, vote_type: VoteType) -> Result<(Idea, VoteOutcome)> {
        let mut ideas = self.ideas.write().await;

        let idea = ideas
            .iter_mut()
            .find(|idea| idea.id == idea_id)
            .ok_or_else(|| IdeaBoardError::NotFound(idea_id.to_string()))?;

        let outcome = apply_vote(idea, user_id, vote_type);
        idea.commit_vote(outcome.clone());
        let updated = idea.clone();

        self.publish(&ideas);

        tracing::debug!(id = idea_id, delta = outcome.vote_delta, votes = updated.votes, "vote stored");
        Ok((updated, outcome))
    }

    async fn delete(&self, idea_id: &str) -> Result<()> {
        let mut ideas = self.ideas.write().await;

        let position = ideas
            .iter()
            .position(|idea| idea.id == idea_id)
            .ok_or_else(|| IdeaBoardError::NotFound(idea_id.to_string()))?;

        ideas.remove(position);
        let dropped = self
            .comments
            .write()
            .await
            .remove(idea_id)
            .map_or(0, |thread| thread.len());
        self.publish(&ideas);

        tracing::debug!(id = idea_id, total = ideas.len(), dropped, "idea deleted");
        Ok(())
    }

    async fn add_comment(&self, idea_id: &str, comment: NewComment, timestamp: DateTime<Utc>) -> Result<Comment> {
        let ideas = self.ideas.read().await;
        if !ideas.iter().any(|idea| idea.id == idea_id) {
            return Err(IdeaBoardError::NotFound(idea_id.to_string()));
        }

        let stored = Comment {
            id: format!("comment-{}", self.next_comment_id.fetch_add(1, Ordering::Relaxed)),
            idea_id: idea_id.to_string(),
            author: comment.author(),
            text: comment.text,
            timestamp,
        };

        let mut comments = self.comments.write().await;
        comments.entry(idea_id.to_string()).or_default().push(stored.clone());

        tracing::debug!(id = idea_id, comment = %stored.id, "comment stored");
        Ok(stored)
    }

    async fn comments(&self, idea_id: &str) -> Result<Vec<Comment>> {
        if !self.ideas.read().await.iter().any(|idea| idea.id == idea_id) {
            return Err(IdeaBoardError::NotFound(idea_id.to_string()));
        }

        let mut thread = self.comments.read().await.get(idea_id).cloned().unwrap_or_default();
        // stable, so equal timestamps keep insertion order
        thread.sort_by_key(|comment| comment.timestamp);
        Ok(thread)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
