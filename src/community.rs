//! Community recommendation orchestrator.
//!
//! Wires the scorers into one pipeline: filter → strategy selection →
//! scorers → merge → diversity → sort/truncate. Stateless aside from the
//! scorer constants; one instance can serve any number of calls.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::diversity::{apply_community_diversity, sort_by_score, CandidateTraits};
use crate::error::Result;
use crate::merge::{merge_scores, scale_scores};
use crate::metrics::{PerformanceTimer, QualityAnalyzer};
use crate::model::{
    AlgorithmWeights, Community, Method, RecommendOptions, RecommendationResult, RecommendationScore,
    ResultMetadata, User,
};
use crate::scorers::{CollaborativeScorer, ContentScorer, PopularityScorer};
use crate::strategy::select_community_strategy;

/// Adjusted weights below this are treated as switched off.
pub(crate) const MIN_EFFECTIVE_WEIGHT: f64 = 1e-6;
/// The collaborative pass is the only unbounded term; log when it crawls.
pub(crate) const SLOW_COLLABORATIVE_MS: u64 = 500;

#[derive(Debug, Default, Clone)]
pub struct CommunityRecommender {
    popularity: PopularityScorer,
    content: ContentScorer,
    collaborative: CollaborativeScorer,
}

impl CommunityRecommender {
    pub fn new() -> Self {
        Self {
            popularity: PopularityScorer::new(),
            content: ContentScorer::new(),
            collaborative: CollaborativeScorer::new(),
        }
    }

    /// Generate community recommendations with the current wall clock.
    pub fn recommend(
        &self,
        user: &User,
        all_users: &[User],
        communities: &[Community],
        options: &RecommendOptions,
    ) -> Result<RecommendationResult> {
        self.recommend_at(user, all_users, communities, options, Utc::now())
    }

    /// Deterministic variant: all time-based terms (activity decay,
    /// personalization) derive from the supplied `now`.
    pub fn recommend_at(
        &self,
        user: &User,
        all_users: &[User],
        communities: &[Community],
        options: &RecommendOptions,
        now: DateTime<Utc>,
    ) -> Result<RecommendationResult> {
        options.validate()?;
        let timer = PerformanceTimer::new("community_recommendations");
        let request_id = Uuid::new_v4();

        let candidates: Vec<&Community> = communities
            .iter()
            .filter(|c| !user.joined_communities.contains(&c.id))
            .collect();
        let total_candidates = candidates.len();
        debug!(
            %request_id,
            user_id = %user.id,
            total_candidates,
            "generating community recommendations"
        );

        let base = options
            .weights
            .unwrap_or_else(AlgorithmWeights::community_defaults);
        let decision = select_community_strategy(user, all_users, base);
        let weights = decision.weights;

        let mut score_lists: Vec<Vec<RecommendationScore>> = Vec::new();
        let mut algorithms_used: Vec<Method> = Vec::new();

        if decision.use_collaborative && weights.collaborative > MIN_EFFECTIVE_WEIGHT {
            let collab_timer = PerformanceTimer::new("community_collaborative_scoring");
            let mut scores = self
                .collaborative
                .recommend_communities(user, all_users, communities);
            collab_timer.log_if_slow(SLOW_COLLABORATIVE_MS);
            scale_scores(&mut scores, weights.collaborative);
            score_lists.push(scores);
            algorithms_used.push(Method::Collaborative);
        }

        if weights.content_based > MIN_EFFECTIVE_WEIGHT {
            let mut scores = self.content.score_communities(user, &candidates);
            scale_scores(&mut scores, weights.content_based);
            score_lists.push(scores);
            algorithms_used.push(Method::ContentBased);
        }

        if options.include_popular && weights.popularity > MIN_EFFECTIVE_WEIGHT {
            let mut scores = self.popularity.score_communities(user, &candidates, now);
            scale_scores(&mut scores, weights.popularity);
            score_lists.push(scores);
            algorithms_used.push(Method::Popularity);
        }

        let mut merged = merge_scores(score_lists);

        let traits: HashMap<&str, CandidateTraits<'_>> = candidates
            .iter()
            .map(|c| {
                (
                    c.id.as_str(),
                    CandidateTraits {
                        category: &c.category,
                        community_id: None,
                    },
                )
            })
            .collect();

        apply_community_diversity(&mut merged, &traits, options.diversity_weight);
        sort_by_score(&mut merged);
        merged.truncate(options.max_recommendations);

        let unique_categories = merged
            .iter()
            .filter_map(|s| traits.get(s.candidate_id.as_str()))
            .map(|t| t.category.to_lowercase())
            .collect::<HashSet<_>>()
            .len();
        let diversity_score = QualityAnalyzer::community_diversity(unique_categories, merged.len());

        debug!(
            %request_id,
            returned = merged.len(),
            diversity_score,
            "community recommendations ready"
        );

        Ok(RecommendationResult {
            recommendations: merged,
            metadata: ResultMetadata {
                total_candidates,
                algorithms_used,
                processing_time_ms: timer.elapsed_ms(),
                diversity_score,
            },
        })
    }
}
