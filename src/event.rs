//! Event recommendation orchestrator.
//!
//! Same pipeline shape as the community engine plus event-specific
//! pre-filters (future-only, date range, online/in-person), the
//! community-membership scorer, and the timing boost stage.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::community::{MIN_EFFECTIVE_WEIGHT, SLOW_COLLABORATIVE_MS};
use crate::diversity::{apply_event_diversity, apply_timing_boost, sort_by_score, CandidateTraits};
use crate::error::Result;
use crate::merge::{merge_scores, scale_scores};
use crate::metrics::{PerformanceTimer, QualityAnalyzer};
use crate::model::{
    AlgorithmWeights, DateRangeFilter, Event, EventRecommendOptions, Method, RecommendationResult,
    RecommendationScore, ResultMetadata, User,
};
use crate::scorers::{CollaborativeScorer, ContentScorer, MembershipScorer, PopularityScorer};
use crate::strategy::select_event_strategy;

#[derive(Debug, Default, Clone)]
pub struct EventRecommender {
    popularity: PopularityScorer,
    content: ContentScorer,
    collaborative: CollaborativeScorer,
    membership: MembershipScorer,
}

impl EventRecommender {
    pub fn new() -> Self {
        Self {
            popularity: PopularityScorer::new(),
            content: ContentScorer::new(),
            collaborative: CollaborativeScorer::new(),
            membership: MembershipScorer::new(),
        }
    }

    /// Generate event recommendations with the current wall clock.
    pub fn recommend(
        &self,
        user: &User,
        all_users: &[User],
        events: &[Event],
        user_community_ids: &HashSet<String>,
        options: &EventRecommendOptions,
    ) -> Result<RecommendationResult> {
        self.recommend_at(user, all_users, events, user_community_ids, options, Utc::now())
    }

    /// Deterministic variant: the future-only filter, date-range cutoffs,
    /// new-event boost, and timing boost all derive from the supplied `now`.
    pub fn recommend_at(
        &self,
        user: &User,
        all_users: &[User],
        events: &[Event],
        user_community_ids: &HashSet<String>,
        options: &EventRecommendOptions,
        now: DateTime<Utc>,
    ) -> Result<RecommendationResult> {
        options.validate()?;
        let timer = PerformanceTimer::new("event_recommendations");
        let request_id = Uuid::new_v4();

        let candidates: Vec<&Event> = events
            .iter()
            .filter(|e| e.start_time >= now)
            .filter(|e| within_date_range(e, options.date_range, now))
            .filter(|e| !options.include_online_only || e.is_online)
            .filter(|e| !options.include_in_person_only || !e.is_online)
            .filter(|e| !user.attended_events.contains(&e.id))
            .collect();
        let total_candidates = candidates.len();
        debug!(
            %request_id,
            user_id = %user.id,
            total_candidates,
            "generating event recommendations"
        );

        let base = options
            .weights
            .unwrap_or_else(AlgorithmWeights::event_defaults);
        let decision = select_event_strategy(user, all_users, base);
        let weights = decision.weights;

        let mut score_lists: Vec<Vec<RecommendationScore>> = Vec::new();
        let mut algorithms_used: Vec<Method> = Vec::new();

        if decision.use_collaborative && weights.collaborative > MIN_EFFECTIVE_WEIGHT {
            let collab_timer = PerformanceTimer::new("event_collaborative_scoring");
            let mut scores = self.collaborative.recommend_events(user, all_users, &candidates);
            collab_timer.log_if_slow(SLOW_COLLABORATIVE_MS);
            scale_scores(&mut scores, weights.collaborative);
            score_lists.push(scores);
            algorithms_used.push(Method::Collaborative);
        }

        if weights.content_based > MIN_EFFECTIVE_WEIGHT {
            let mut scores = self.content.score_events(user, &candidates);
            scale_scores(&mut scores, weights.content_based);
            score_lists.push(scores);
            algorithms_used.push(Method::ContentBased);
        }

        if options.include_popular && weights.popularity > MIN_EFFECTIVE_WEIGHT {
            let mut scores = self.popularity.score_events(user, &candidates, now);
            scale_scores(&mut scores, weights.popularity);
            score_lists.push(scores);
            algorithms_used.push(Method::Popularity);
        }

        if weights.community_membership > MIN_EFFECTIVE_WEIGHT && !user_community_ids.is_empty() {
            let mut scores = self.membership.score_events(user_community_ids, &candidates);
            scale_scores(&mut scores, weights.community_membership);
            score_lists.push(scores);
            algorithms_used.push(Method::CommunityBased);
        }

        let mut merged = merge_scores(score_lists);

        let events_by_id: HashMap<&str, &Event> =
            candidates.iter().map(|e| (e.id.as_str(), *e)).collect();
        apply_timing_boost(&mut merged, &events_by_id, now);

        let traits: HashMap<&str, CandidateTraits<'_>> = candidates
            .iter()
            .map(|e| {
                (
                    e.id.as_str(),
                    CandidateTraits {
                        category: &e.category,
                        community_id: Some(&e.community_id),
                    },
                )
            })
            .collect();
        apply_event_diversity(&mut merged, &traits, options.diversity_weight);

        sort_by_score(&mut merged);
        merged.truncate(options.max_recommendations);

        let mut categories: HashSet<String> = HashSet::new();
        let mut communities: HashSet<&str> = HashSet::new();
        for entry in &merged {
            if let Some(event) = events_by_id.get(entry.candidate_id.as_str()) {
                categories.insert(event.category.to_lowercase());
                communities.insert(event.community_id.as_str());
            }
        }
        let diversity_score =
            QualityAnalyzer::event_diversity(categories.len(), communities.len(), merged.len());

        debug!(
            %request_id,
            returned = merged.len(),
            diversity_score,
            "event recommendations ready"
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

fn within_date_range(event: &Event, range: DateRangeFilter, now: DateTime<Utc>) -> bool {
    match range {
        DateRangeFilter::All => true,
        DateRangeFilter::Today => event.start_time.date_naive() == now.date_naive(),
        DateRangeFilter::Week => event.start_time <= now + Duration::days(7),
        DateRangeFilter::Month => event.start_time <= now + Duration::days(30),
    }
}
