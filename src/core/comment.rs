use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Shown when nobody left a name
pub const ANONYMOUS: &str = "Anonymous";

/// First non-blank of username, display name, email
pub fn resolve_author(
    username: Option<&str>,
    display_name: Option<&str>,
    email: Option<&str>,
) -> Option<String> {
    [username, display_name, email]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}

/// One entry in an idea's comment thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,

    /// Idea this comment belongs to
    pub idea_id: String,

    pub text: String,

    /// Resolved author name, never blank
    pub author: String,

    pub timestamp: DateTime<Utc>,
}

/// Comment payload with the identity fields the author is picked from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub text: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl NewComment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn by_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn by_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn by_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Author name with the "Anonymous" fallback
    pub fn author(&self) -> String {
        resolve_author(
            self.username.as_deref(),
            self.display_name.as_deref(),
            self.email.as_deref(),
        )
        .unwrap_or_else(|| ANONYMOUS.to_string())
    }
}
