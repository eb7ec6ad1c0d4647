//! Flat boost for events hosted by communities the user already joined.
//! Deliberately undiscriminating: the diversity and timing stages
//! differentiate among these events later.

use serde_json::json;
use std::collections::HashSet;

use crate::model::{Event, Method, Reason, RecommendationScore};

const MEMBERSHIP_SCORE: f64 = 0.7;
const MEMBERSHIP_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Default, Clone)]
pub struct MembershipScorer;

impl MembershipScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_events(
        &self,
        user_community_ids: &HashSet<String>,
        candidates: &[&Event],
    ) -> Vec<RecommendationScore> {
        candidates
            .iter()
            .filter(|e| user_community_ids.contains(&e.community_id))
            .map(|e| {
                let host = e
                    .community_name
                    .clone()
                    .unwrap_or_else(|| e.community_id.clone());
                RecommendationScore {
                    candidate_id: e.id.clone(),
                    score: MEMBERSHIP_SCORE,
                    confidence: MEMBERSHIP_CONFIDENCE,
                    method: Method::CommunityBased,
                    reasons: vec![Reason::new(
                        "community_membership",
                        format!("Hosted by {host}, a community you're in"),
                        MEMBERSHIP_SCORE,
                    )
                    .with_evidence(json!({ "community_id": e.community_id }))],
                }
            })
            .collect()
    }
}
