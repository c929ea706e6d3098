use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::core::{normalize_tags, Comment, Idea, NewComment, SimilarityMatch};
use crate::error::{IdeaBoardError, Result};
use crate::filter::{tag_counts, FeedFilter};
use crate::ranking::{rank, RankMode};
use crate::similarity::find_similar;
use crate::store::{IdeaStore, MemoryStore, NewIdea};
use crate::vote::VoteType;

/// Main idea board orchestrator
pub struct IdeaBoard {
    store: Arc<dyn IdeaStore>,
    config: EngineConfig,
}

/// Feed request parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedQuery {
    /// Sort order; the configured default when absent
    #[serde(default)]
    pub mode: Option<RankMode>,

    #[serde(default)]
    pub filter: FeedFilter,

    /// Page length; the configured page size when absent
    #[serde(default)]
    pub limit: Option<usize>,

    #[serde(default)]
    pub offset: usize,
}

impl FeedQuery {
    pub fn mode(mode: RankMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }
}

/// One window of the ranked feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPage {
    pub ideas: Vec<Idea>,

    /// Ideas matching the filter, across all pages
    pub total: usize,

    pub offset: usize,
    pub has_more: bool,
    pub mode: RankMode,
}

impl IdeaBoard {
    pub fn new(store: Arc<dyn IdeaStore>, config: EngineConfig) -> Self {
        tracing::info!("Idea board using '{}' store ({})", store.name(), config);
        Self { store, config }
    }

    /// Board over an empty [`MemoryStore`] with default config
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn IdeaStore> {
        &self.store
    }

    /// Filter, rank and window the current snapshot
    pub async fn feed(&self, query: &FeedQuery, now: DateTime<Utc>) -> Result<FeedPage> {
        let start = Instant::now();
        let mode = query.mode.unwrap_or(self.config.default_mode);
        let limit = query.limit.unwrap_or(self.config.page_size);

        let snapshot = self.store.snapshot().await?;
        let filtered = query.filter.apply(&snapshot);
        let total = filtered.len();

        let ideas: Vec<Idea> = rank(&filtered, mode, now)
            .into_iter()
            .skip(query.offset)
            .take(limit)
            .collect();
        let has_more = query.offset.saturating_add(ideas.len()) < total;

        tracing::debug!(
            "feed mode={} total={} offset={} returned={} in {:.2}ms",
            mode,
            total,
            query.offset,
            ideas.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        Ok(FeedPage {
            ideas,
            total,
            offset: query.offset,
            has_more,
            mode,
        })
    }

    /// Existing ideas that look like `text`
    pub async fn check_duplicates(&self, text: &str) -> Result<Vec<SimilarityMatch>> {
        let snapshot = self.store.snapshot().await?;
        Ok(find_similar(text, &snapshot, &self.config.similarity))
    }

    /// Validate and store a new idea
    pub async fn submit(&self, new_idea: NewIdea, now: DateTime<Utc>) -> Result<Idea> {
        let text = new_idea.text.trim().to_string();
        if text.is_empty() {
            return Err(IdeaBoardError::Validation("idea text is empty".to_string()));
        }

        let len = text.chars().count();
        if len > self.config.max_text_len {
            return Err(IdeaBoardError::Validation(format!(
                "idea text is {} characters, limit is {}",
                len, self.config.max_text_len
            )));
        }

        let tags = normalize_tags(&new_idea.tags, self.config.max_tags, self.config.max_tag_len);
        let author = trimmed(new_idea.author);
        let user_id = trimmed(new_idea.user_id);

        let idea = self
            .store
            .insert(
                NewIdea {
                    text,
                    tags,
                    author,
                    user_id,
                },
                now,
            )
            .await?;
        tracing::info!("💡 New idea {} ({} tags)", idea.id, idea.tags.len());
        Ok(idea)
    }

    /// Toggle a user's vote and return the updated idea
    pub async fn vote(&self, idea_id: &str, user_id: &str, vote_type: VoteType) -> Result<Idea> {
        if user_id.trim().is_empty() {
            return Err(IdeaBoardError::Validation("user id is empty".to_string()));
        }

        let (idea, outcome) = self.store.vote(idea_id, user_id, vote_type).await?;
        tracing::debug!(
            "vote {} on {} by {} → {:?} ({:+})",
            vote_type,
            idea_id,
            user_id,
            outcome.next_state,
            outcome.vote_delta
        );
        Ok(idea)
    }

    pub async fn delete(&self, idea_id: &str) -> Result<()> {
        self.store.delete(idea_id).await
    }

    /// Delete on behalf of `user_id`, who must have submitted the idea
    pub async fn delete_owned(&self, idea_id: &str, user_id: &str) -> Result<()> {
        let snapshot = self.store.snapshot().await?;
        let idea = snapshot
            .iter()
            .find(|idea| idea.id == idea_id)
            .ok_or_else(|| IdeaBoardError::NotFound(idea_id.to_string()))?;

        if !idea.is_owned_by(user_id.trim()) {
            tracing::warn!("🚫 {} tried to delete {} owned by {:?}", user_id, idea_id, idea.user_id);
            return Err(IdeaBoardError::Forbidden {
                idea_id: idea_id.to_string(),
                user_id: user_id.to_string(),
            });
        }

        self.store.delete(idea_id).await
    }

    /// Validate and append a comment
    pub async fn comment(&self, idea_id: &str, comment: NewComment, now: DateTime<Utc>) -> Result<Comment> {
        let text = comment.text.trim().to_string();
        if text.is_empty() {
            return Err(IdeaBoardError::Validation("comment text is empty".to_string()));
        }

        let len = text.chars().count();
        if len > self.config.max_text_len {
            return Err(IdeaBoardError::Validation(format!(
                "comment text is {} characters, limit is {}",
                len, self.config.max_text_len
            )));
        }

        let stored = self
            .store
            .add_comment(idea_id, NewComment { text, ..comment }, now)
            .await?;
        tracing::info!("💬 Comment {} on {} by {}", stored.id, idea_id, stored.author);
        Ok(stored)
    }

    /// An idea's comment thread, oldest first
    pub async fn comments(&self, idea_id: &str) -> Result<Vec<Comment>> {
        self.store.comments(idea_id).await
    }

    /// Tag categories with counts
    pub async fn tags(&self) -> Result<Vec<(String, usize)>> {
        let snapshot = self.store.snapshot().await?;
        Ok(tag_counts(&snapshot))
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_submit_validation() {
        let board = IdeaBoard::in_memory();

        assert!(matches!(
            board.submit(NewIdea::new("   "), Utc::now()).await,
            Err(IdeaBoardError::Validation(_))
        ));
        assert!(matches!(
            board.submit(NewIdea::new("x".repeat(501)), Utc::now()).await,
            Err(IdeaBoardError::Validation(_))
        ));

        let idea = board
            .submit(NewIdea::new(format!("  {}  ", "y".repeat(500))).with_tags(["#AI"]), Utc::now())
            .await
            .unwrap();
        assert_eq!(idea.text.len(), 500);
        assert_eq!(idea.tags, vec!["ai"]);
    }

    #[tokio::test]
    async fn test_feed_paging() {
        let board = IdeaBoard::in_memory();
        let now = Utc::now();
        for n in 0..5 {
            board
                .submit(NewIdea::new(format!("idea number {}", n)), now - Duration::hours(n))
                .await
                .unwrap();
        }

        let query = FeedQuery {
            limit: Some(2),
            offset: 2,
            ..FeedQuery::mode(RankMode::New)
        };
        let page = board.feed(&query, now).await.unwrap();

        assert_eq!(page.total, 5);
        assert_eq!(page.ideas.len(), 2);
        assert_eq!(page.ideas[0].text, "idea number 2");
        assert!(page.has_more);

        let last = FeedQuery { offset: 4, ..query };
        let page = board.feed(&last, now).await.unwrap();
        assert_eq!(page.ideas.len(), 1);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_comment_validation() {
        let board = IdeaBoard::in_memory();
        let idea = board.submit(NewIdea::new("talk about me"), Utc::now()).await.unwrap();

        assert!(matches!(
            board.comment(&idea.id, NewComment::new("  \n "), Utc::now()).await,
            Err(IdeaBoardError::Validation(_))
        ));
        assert!(matches!(
            board.comment("missing", NewComment::new("hello"), Utc::now()).await,
            Err(IdeaBoardError::NotFound(_))
        ));

        let comment = board
            .comment(&idea.id, NewComment::new("  great idea  ").by_email("fan@example.com"), Utc::now())
            .await
            .unwrap();
        assert_eq!(comment.text, "great idea");
        assert_eq!(comment.author, "fan@example.com");
        assert_eq!(board.comments(&idea.id).await.unwrap(), vec![comment]);
    }

    #[tokio::test]
    async fn test_owner_scoped_feed_and_delete() {
        let board = IdeaBoard::in_memory();
        let now = Utc::now();
        let mine = board
            .submit(NewIdea::new("mine").by_user(" uid-1 ", Some("Sam".to_string())), now)
            .await
            .unwrap();
        let theirs = board
            .submit(NewIdea::new("theirs").by_user("uid-2", None), now)
            .await
            .unwrap();
        assert_eq!(mine.user_id.as_deref(), Some("uid-1"));

        let query = FeedQuery {
            filter: FeedFilter::default().with_owner(Some("uid-1".to_string())),
            ..FeedQuery::default()
        };
        let page = board.feed(&query, now).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.ideas[0].id, mine.id);

        assert!(matches!(
            board.delete_owned(&theirs.id, "uid-1").await,
            Err(IdeaBoardError::Forbidden { .. })
        ));
        board.delete_owned(&mine.id, "uid-1").await.unwrap();
        assert_eq!(board.store().snapshot().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_vote_requires_user() {
        let board = IdeaBoard::in_memory();
        let idea = board.submit(NewIdea::new("needs votes"), Utc::now()).await.unwrap();
        assert!(board.vote(&idea.id, " ", VoteType::Upvote).await.is_err());
    }
}
