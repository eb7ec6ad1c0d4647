//! Convoke recommendation engine.
//!
//! Ranks candidate communities and events for a user by blending
//! collaborative filtering, content-based filtering, and popularity
//! signals, then applying diversity re-ranking.
//!
//! ## Architecture
//!
//! 1. **Scorers** - independent algorithms producing per-candidate scores
//!    with confidence and human-readable reasons
//! 2. **Strategy** - per-user weight adjustment (cold start, collaborative
//!    trust, data richness)
//! 3. **Merge** - confidence-weighted blending into one entry per candidate
//! 4. **Diversity** - timing boost (events) and category/community novelty
//!    re-ranking
//!
//! Entry points are [`CommunityRecommender`] and [`EventRecommender`]. Both
//! are pure functions of their inputs plus an explicit clock: the `_at`
//! variants take a fixed `now` and are fully deterministic.
//!
//! ## Score semantics
//!
//! `RecommendationScore::score` is an unbounded ranking weight. Boosts
//! (personalization, timing, diversity) intentionally push it past 1.0; do
//! not treat it as a probability.

pub mod community;
pub mod diversity;
pub mod error;
pub mod event;
pub mod keywords;
pub mod merge;
pub mod metrics;
pub mod model;
pub mod scorers;
pub mod similarity;
pub mod strategy;

// Re-export commonly used types
pub use community::CommunityRecommender;
pub use error::{Error, Result};
pub use event::EventRecommender;
pub use model::{
    AlgorithmWeights, Community, DateRangeFilter, Event, EventRecommendOptions, Method,
    RecommendOptions, RecommendationResult, RecommendationScore, User,
};
