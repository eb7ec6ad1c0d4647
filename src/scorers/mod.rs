//! Per-algorithm scorers.
//!
//! Each scorer reads immutable input snapshots and produces a private list
//! of `RecommendationScore`s; the orchestrators weight and merge them.
//! Scorers are stateless aside from algorithm constants and the injected
//! keyword table.

pub mod collaborative;
pub mod content;
pub mod membership;
pub mod popularity;

pub use collaborative::CollaborativeScorer;
pub use content::ContentScorer;
pub use membership::MembershipScorer;
pub use popularity::PopularityScorer;
