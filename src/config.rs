//! Engine configuration with per-key fallbacks to defaults.
//!
//! ```
//! use std::collections::HashMap;
//! use idea_board_engine::{EngineConfig, RankMode};
//!
//! let mut values = HashMap::new();
//! values.insert("default_mode".to_string(), "hot".to_string());
//! values.insert("similarity_threshold".to_string(), "0.5".to_string());
//!
//! let config = EngineConfig::from_map(&values).unwrap();
//! assert_eq!(config.default_mode, RankMode::Hot);
//! assert_eq!(config.similarity.threshold, 0.5);
//! assert_eq!(config.page_size, 20); // default
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::idea::{MAX_TAGS, MAX_TAG_LEN, MAX_TEXT_LEN};
use crate::error::{IdeaBoardError, Result};
use crate::ranking::RankMode;
use crate::similarity::SimilarOptions;

/// Prefix for environment overrides, e.g. `IDEA_BOARD_PAGE_SIZE`
pub const ENV_PREFIX: &str = "IDEA_BOARD_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mode used when a feed request names none
    pub default_mode: RankMode,

    /// Ideas per feed page
    pub page_size: usize,

    /// Duplicate detection tuning
    pub similarity: SimilarOptions,

    pub max_text_len: usize,
    pub max_tags: usize,
    pub max_tag_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_mode: RankMode::Chronological,
            page_size: 20,
            similarity: SimilarOptions::default(),
            max_text_len: MAX_TEXT_LEN,
            max_tags: MAX_TAGS,
            max_tag_len: MAX_TAG_LEN,
        }
    }
}

fn parse_key<T>(values: &HashMap<String, String>, key: &str, fallback: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match values.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| IdeaBoardError::Config(format!("{}={:?}: {}", key, raw, e))),
        None => Ok(fallback),
    }
}

impl EngineConfig {
    /// Build from flat string values, falling back to defaults per key
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            default_mode: parse_key(values, "default_mode", defaults.default_mode)?,
            page_size: parse_key(values, "page_size", defaults.page_size)?,
            similarity: SimilarOptions {
                min_length: parse_key(values, "similarity_min_length", defaults.similarity.min_length)?,
                threshold: parse_key(values, "similarity_threshold", defaults.similarity.threshold)?,
                max_results: parse_key(values, "similarity_max_results", defaults.similarity.max_results)?,
            },
            max_text_len: parse_key(values, "max_text_len", defaults.max_text_len)?,
            max_tags: parse_key(values, "max_tags", defaults.max_tags)?,
            max_tag_len: parse_key(values, "max_tag_len", defaults.max_tag_len)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Read `IDEA_BOARD_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_map(&collect_prefixed(std::env::vars()))
    }

    /// Parse a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(IdeaBoardError::Config("page_size must be at least 1".to_string()));
        }
        if !self.similarity.threshold.is_finite() {
            return Err(IdeaBoardError::Config("similarity_threshold must be finite".to_string()));
        }
        if self.max_text_len == 0 {
            return Err(IdeaBoardError::Config("max_text_len must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mode={}, page_size={}, similarity(min_length={}, threshold={}, max_results={}), text<={}, tags<={}x{}",
            self.default_mode,
            self.page_size,
            self.similarity.min_length,
            self.similarity.threshold,
            self.similarity.max_results,
            self.max_text_len,
            self.max_tags,
            self.max_tag_len
        )
    }
}

/// Keep `IDEA_BOARD_*` pairs, prefix stripped and key lowercased
fn collect_prefixed<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .map(|rest| (rest.to_lowercase(), value))
        })
        .collect()
}
