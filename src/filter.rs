use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::Idea;

/// Search box and tag-category constraints applied before ranking
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedFilter {
    /// Case-insensitive substring of the text or of any tag
    #[serde(default)]
    pub search: Option<String>,

    /// Exact tag category
    #[serde(default)]
    pub tag: Option<String>,

    /// Only ideas submitted by this user id ("my ideas")
    #[serde(default)]
    pub owner: Option<String>,
}

impl FeedFilter {
    pub fn new(search: Option<String>, tag: Option<String>) -> Self {
        Self {
            search,
            tag,
            owner: None,
        }
    }

    /// Restrict to one submitter; a blank id disables the constraint
    pub fn with_owner(mut self, owner: Option<String>) -> Self {
        self.owner = owner;
        self
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn tag_needle(&self) -> Option<String> {
        self.tag
            .as_deref()
            .map(|t| t.trim().trim_start_matches('#').to_lowercase())
            .filter(|t| !t.is_empty())
    }

    fn owner_needle(&self) -> Option<&str> {
        self.owner.as_deref().map(str::trim).filter(|o| !o.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.search_needle().is_none() && self.tag_needle().is_none() && self.owner_needle().is_none()
    }

    /// Ideas passing every constraint, in input order
    pub fn apply(&self, ideas: &[Idea]) -> Vec<Idea> {
        let search = self.search_needle();
        let tag = self.tag_needle();
        let owner = self.owner_needle();

        ideas
            .iter()
            .filter(|idea| match owner {
                Some(owner) => idea.is_owned_by(owner),
                None => true,
            })
            .filter(|idea| match &tag {
                Some(tag) => idea.has_tag(tag),
                None => true,
            })
            .filter(|idea| match &search {
                Some(needle) => {
                    idea.text.to_lowercase().contains(needle.as_str())
                        || idea.tags.iter().any(|t| t.contains(needle.as_str()))
                }
                None => true,
            })
            .cloned()
            .collect()
    }
}

/// Tag categories with usage counts, most used first, then alphabetical
pub fn tag_counts(ideas: &[Idea]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for idea in ideas {
        for tag in &idea.tags {
            *counts.entry(tag.as_str()).or_default() += 1;
        }
    }

    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}
