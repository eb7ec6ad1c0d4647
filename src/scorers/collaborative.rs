//! Collaborative filtering: find users similar to the target and score
//! candidates by how many (and how similar) neighbors engaged with them.
//!
//! The similarity scan is the only O(users × candidates) term in the engine,
//! so it runs on rayon and is wrapped in a slow-call timer by the
//! orchestrators.

use rayon::prelude::*;
use serde_json::json;
use std::collections::{HashMap, HashSet};

use crate::model::{Community, Event, Method, Reason, RecommendationScore, User};
use crate::similarity::{
    community_similarity, user_similarity_for_communities, user_similarity_for_events,
};

const COMMUNITY_SIM_THRESHOLD: f64 = 0.1;
const EVENT_SIM_THRESHOLD: f64 = 0.15;
const COMMUNITY_NEIGHBOR_CAP: usize = 50;
const EVENT_NEIGHBOR_CAP: usize = 30;
/// Event collaborative output is capped before it reaches the merge stage.
const EVENT_RESULT_CAP: usize = 30;
/// Minimum pairwise community similarity for an item-based match.
const ITEM_MATCH_THRESHOLD: f64 = 0.3;

struct Neighbor<'a> {
    user: &'a User,
    similarity: f64,
}

#[derive(Debug, Default, Clone)]
pub struct CollaborativeScorer;

impl CollaborativeScorer {
    pub fn new() -> Self {
        Self
    }

    /// Community recommendations: user-based and item-based signals combined
    /// at a fixed 0.6/0.4 split. Takes the full community catalog; already
    /// joined communities inform the item-based pass but are never scored.
    pub fn recommend_communities(
        &self,
        user: &User,
        all_users: &[User],
        catalog: &[Community],
    ) -> Vec<RecommendationScore> {
        let neighbors = find_neighbors(
            user,
            all_users,
            user_similarity_for_communities,
            COMMUNITY_SIM_THRESHOLD,
            COMMUNITY_NEIGHBOR_CAP,
        );
        let user_based = self.user_based_communities(user, &neighbors, catalog);
        let item_based = self.item_based_communities(user, all_users, catalog);
        combine_collaborative(user_based, item_based)
    }

    fn user_based_communities(
        &self,
        user: &User,
        neighbors: &[Neighbor<'_>],
        catalog: &[Community],
    ) -> Vec<RecommendationScore> {
        if neighbors.is_empty() {
            return Vec::new();
        }
        let mut scores = Vec::new();
        for community in catalog {
            if user.joined_communities.contains(&community.id) {
                continue;
            }
            let joined: Vec<&Neighbor<'_>> = neighbors
                .iter()
                .filter(|n| n.user.joined_communities.contains(&community.id))
                .collect();
            if joined.is_empty() {
                continue;
            }
            let count = joined.len();
            let avg_similarity =
                joined.iter().map(|n| n.similarity).sum::<f64>() / count as f64;
            let score = avg_similarity * (count as f64 / 5.0).min(1.0);
            let confidence = ((count as f64 / 10.0) * avg_similarity).min(0.9);
            scores.push(RecommendationScore {
                candidate_id: community.id.clone(),
                score,
                confidence,
                method: Method::CollaborativeUserBased,
                reasons: vec![Reason::new(
                    "similar_users",
                    format!("{count} people with similar taste joined"),
                    score,
                )
                .with_evidence(json!({
                    "neighbor_count": count,
                    "avg_similarity": avg_similarity,
                }))],
            });
        }
        scores
    }

    fn item_based_communities(
        &self,
        user: &User,
        all_users: &[User],
        catalog: &[Community],
    ) -> Vec<RecommendationScore> {
        let joined: Vec<&Community> = catalog
            .iter()
            .filter(|c| user.joined_communities.contains(&c.id))
            .collect();
        if joined.is_empty() {
            return Vec::new();
        }

        let members = membership_index(all_users);
        let empty = HashSet::new();
        let member_set = |id: &str| members.get(id).unwrap_or(&empty);

        let mut scores = Vec::new();
        for candidate in catalog {
            if user.joined_communities.contains(&candidate.id) {
                continue;
            }
            let mut best = 0.0;
            let mut best_name = "";
            let mut matched = 0usize;
            for own in &joined {
                let sim = community_similarity(
                    &candidate.category,
                    &own.category,
                    &candidate.tags,
                    &own.tags,
                    member_set(&candidate.id),
                    member_set(&own.id),
                );
                if sim > ITEM_MATCH_THRESHOLD {
                    matched += 1;
                }
                if sim > best {
                    best = sim;
                    best_name = &own.name;
                }
            }
            if best <= ITEM_MATCH_THRESHOLD {
                continue;
            }
            let confidence = (matched as f64 / joined.len() as f64).min(0.9);
            scores.push(RecommendationScore {
                candidate_id: candidate.id.clone(),
                score: best,
                confidence,
                method: Method::CollaborativeItemBased,
                reasons: vec![Reason::new(
                    "similar_community",
                    format!("Similar to {best_name}, which you joined"),
                    best,
                )
                .with_evidence(json!({
                    "best_similarity": best,
                    "matched_communities": matched,
                }))],
            });
        }
        scores
    }

    /// Event recommendations from neighbor attendance.
    ///
    /// Accumulated similarity is divided by the TOTAL neighbor count, not by
    /// the count of neighbors who attended; sparse attendance among many
    /// similar users deliberately dilutes the score.
    pub fn recommend_events(
        &self,
        user: &User,
        all_users: &[User],
        candidates: &[&Event],
    ) -> Vec<RecommendationScore> {
        let neighbors = find_neighbors(
            user,
            all_users,
            user_similarity_for_events,
            EVENT_SIM_THRESHOLD,
            EVENT_NEIGHBOR_CAP,
        );
        if neighbors.is_empty() {
            return Vec::new();
        }
        let total_neighbors = neighbors.len() as f64;

        let mut scores = Vec::new();
        for event in candidates {
            if user.attended_events.contains(&event.id) {
                continue;
            }
            let attendees: Vec<&Neighbor<'_>> = neighbors
                .iter()
                .filter(|n| n.user.attended_events.contains(&event.id))
                .collect();
            if attendees.is_empty() {
                continue;
            }
            let similarity_sum: f64 = attendees.iter().map(|n| n.similarity).sum();
            let score = similarity_sum / total_neighbors;
            let confidence = (attendees.len() as f64 / 5.0).min(0.8);
            scores.push(RecommendationScore {
                candidate_id: event.id.clone(),
                score,
                confidence,
                method: Method::Collaborative,
                reasons: vec![Reason::new(
                    "similar_users",
                    format!("{} people with similar taste are going", attendees.len()),
                    score,
                )
                .with_evidence(json!({
                    "attendee_neighbors": attendees.len(),
                    "total_neighbors": neighbors.len(),
                }))],
            });
        }

        scores.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scores.truncate(EVENT_RESULT_CAP);
        scores
    }
}

fn find_neighbors<'a>(
    target: &User,
    all_users: &'a [User],
    similarity: fn(&User, &User) -> f64,
    threshold: f64,
    cap: usize,
) -> Vec<Neighbor<'a>> {
    let mut neighbors: Vec<Neighbor<'a>> = all_users
        .par_iter()
        .filter(|u| u.id != target.id)
        .map(|u| Neighbor {
            user: u,
            similarity: similarity(target, u),
        })
        .filter(|n| n.similarity > threshold)
        .collect();
    neighbors.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    neighbors.truncate(cap);
    neighbors
}

/// community id -> ids of users who joined it, over the whole population.
fn membership_index(all_users: &[User]) -> HashMap<String, HashSet<String>> {
    let mut index: HashMap<String, HashSet<String>> = HashMap::new();
    for user in all_users {
        for community_id in &user.joined_communities {
            index
                .entry(community_id.clone())
                .or_default()
                .insert(user.id.clone());
        }
    }
    index
}

/// Fixed-weight pre-merge of the two community collaborative signals:
/// user-based carries 0.6, item-based 0.4, a missing side contributes 0.
fn combine_collaborative(
    user_based: Vec<RecommendationScore>,
    item_based: Vec<RecommendationScore>,
) -> Vec<RecommendationScore> {
    let mut combined: HashMap<String, RecommendationScore> = HashMap::new();
    for mut entry in user_based {
        entry.score *= 0.6;
        combined.insert(entry.candidate_id.clone(), entry);
    }
    for mut entry in item_based {
        entry.score *= 0.4;
        match combined.get_mut(&entry.candidate_id) {
            Some(existing) => {
                existing.score += entry.score;
                existing.confidence = existing.confidence.max(entry.confidence);
                existing.reasons.append(&mut entry.reasons);
                existing.method = Method::Collaborative;
            }
            None => {
                combined.insert(entry.candidate_id.clone(), entry);
            }
        }
    }
    combined.into_values().collect()
}
