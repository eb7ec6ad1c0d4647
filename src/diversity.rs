//! Diversity and timing post-processing.
//!
//! Runs after the merge stage: a timing boost for events starting soon, then
//! a deterministic novelty pass that rewards the first appearance of each
//! category (and host community, for events) in score order.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::{HashMap, HashSet};

use crate::model::{Event, Reason, RecommendationScore};

const TIMING_WINDOW_DAYS: f64 = 14.0;
const MAX_TIMING_BOOST: f64 = 0.1;
/// Boosts above this are worth explaining to the user.
const TIMING_REASON_THRESHOLD: f64 = 0.05;

/// Category / host-community traits the diversity pass needs per candidate.
#[derive(Debug, Clone, Copy)]
pub struct CandidateTraits<'a> {
    pub category: &'a str,
    pub community_id: Option<&'a str>,
}

/// Boost events starting within the next two weeks, up to +0.1 for the
/// soonest. Added directly to the score, not re-normalized.
pub fn apply_timing_boost(
    scores: &mut [RecommendationScore],
    events_by_id: &HashMap<&str, &Event>,
    now: DateTime<Utc>,
) {
    for entry in scores.iter_mut() {
        let Some(event) = events_by_id.get(entry.candidate_id.as_str()) else {
            continue;
        };
        let days_until = (event.start_time - now).num_seconds() as f64 / 86_400.0;
        if days_until > TIMING_WINDOW_DAYS {
            continue;
        }
        let boost = (MAX_TIMING_BOOST * (1.0 - days_until / TIMING_WINDOW_DAYS)).max(0.0);
        entry.score += boost;
        if boost > TIMING_REASON_THRESHOLD {
            let description = if days_until <= 1.0 {
                "Happening very soon".to_string()
            } else {
                format!("Coming up in {} days", days_until.ceil() as i64)
            };
            entry.reasons.push(
                Reason::new("timing", description, boost)
                    .with_evidence(json!({ "days_until_start": days_until })),
            );
        }
    }
}

/// Community-engine diversity pass: walking the list in score order, the
/// first candidate of each category earns a flat `diversity_weight` bonus.
/// A weight of 0 disables the stage entirely.
pub fn apply_community_diversity(
    scores: &mut Vec<RecommendationScore>,
    traits: &HashMap<&str, CandidateTraits<'_>>,
    diversity_weight: f64,
) {
    if diversity_weight == 0.0 {
        return;
    }
    sort_by_score(scores);
    let mut seen_categories: HashSet<String> = HashSet::new();
    for entry in scores.iter_mut() {
        let Some(t) = traits.get(entry.candidate_id.as_str()) else {
            continue;
        };
        let category = t.category.to_lowercase();
        if seen_categories.insert(category) {
            entry.score += diversity_weight;
        }
    }
    sort_by_score(scores);
}

/// Event-engine diversity pass: category novelty earns 60% of the weight,
/// host-community novelty 40%.
pub fn apply_event_diversity(
    scores: &mut Vec<RecommendationScore>,
    traits: &HashMap<&str, CandidateTraits<'_>>,
    diversity_weight: f64,
) {
    if diversity_weight == 0.0 {
        return;
    }
    sort_by_score(scores);
    let mut seen_categories: HashSet<String> = HashSet::new();
    let mut seen_communities: HashSet<String> = HashSet::new();
    for entry in scores.iter_mut() {
        let Some(t) = traits.get(entry.candidate_id.as_str()) else {
            continue;
        };
        let category = t.category.to_lowercase();
        if seen_categories.insert(category) {
            entry.score += diversity_weight * 0.6;
        }
        if let Some(community_id) = t.community_id {
            if seen_communities.insert(community_id.to_string()) {
                entry.score += diversity_weight * 0.4;
            }
        }
    }
    sort_by_score(scores);
}

pub fn sort_by_score(scores: &mut [RecommendationScore]) {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
}
