use serde::{Deserialize, Serialize};
use crate::core::Idea;

/// An existing idea that looks like a duplicate of a candidate text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityMatch {
    /// The matching idea
    pub idea: Idea,

    /// Jaccard similarity in [0, 1], unrounded
    pub score: f64,
}

impl SimilarityMatch {
    pub fn new(idea: Idea, score: f64) -> Self {
        Self { idea, score }
    }

    /// Score as a whole percentage, for display
    pub fn percent(&self) -> u32 {
        (self.score * 100.0).round() as u32
    }
}
