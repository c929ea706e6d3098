pub mod comment;
pub mod idea;
pub mod similarity_match;

pub use comment::{resolve_author, Comment, NewComment, ANONYMOUS};
pub use idea::{normalize_tags, Idea, VotedBy};
pub use similarity_match::SimilarityMatch;
