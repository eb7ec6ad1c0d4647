//! Popularity scoring from intrinsic candidate metrics, with light
//! personalization nudges on top of the blended base.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::model::{Community, Event, Method, Reason, RecommendationScore, User};
use crate::similarity::{haversine_distance_km, WeightedBlend};

const MEMBER_COUNT_CAP: f64 = 5000.0;
const ACTIVITY_DECAY_DAYS: f64 = 30.0;
const NEW_EVENT_WINDOW_DAYS: i64 = 7;
/// Event scores at or below this floor are noise and get dropped.
const EVENT_SCORE_FLOOR: f64 = 0.1;

#[derive(Debug, Default, Clone)]
pub struct PopularityScorer;

impl PopularityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn score_communities(
        &self,
        user: &User,
        candidates: &[&Community],
        now: DateTime<Utc>,
    ) -> Vec<RecommendationScore> {
        candidates
            .iter()
            .map(|c| self.score_community(user, c, now))
            .collect()
    }

    fn score_community(
        &self,
        user: &User,
        community: &Community,
        now: DateTime<Utc>,
    ) -> RecommendationScore {
        let mut blend = WeightedBlend::new();
        blend.push((community.member_count as f64 / MEMBER_COUNT_CAP).min(1.0), 0.30);
        blend.push((community.growth_rate * 2.0).min(1.0), 0.25);
        blend.push(community.engagement_score / 100.0, 0.35);

        let days_idle = (now - community.last_activity).num_seconds() as f64 / 86_400.0;
        blend.push((1.0 - days_idle / ACTIVITY_DECAY_DAYS).max(0.0), 0.10);

        let base = blend.value();
        let mut reasons = vec![Reason::new(
            "popularity",
            format!(
                "Active community with {} members and {:.0}% engagement",
                community.member_count, community.engagement_score
            ),
            base,
        )
        .with_evidence(json!({
            "member_count": community.member_count,
            "growth_rate": community.growth_rate,
            "engagement_score": community.engagement_score,
        }))];

        // Personalization boosts are added on top, un-normalized.
        let mut boost = 0.0;
        if preferred_category(user, &community.category) {
            boost += 0.2;
            reasons.push(Reason::new(
                "category_preference",
                format!("Matches your preferred category '{}'", community.category),
                0.2,
            ));
        }
        if let (Some(ul), Some(cl)) = (&user.location, &community.location) {
            let distance = haversine_distance_km(ul.lat, ul.lng, cl.lat, cl.lng);
            let max_distance = user.preferences.max_distance_km;
            if max_distance > 0.0 && distance <= max_distance {
                let proximity = 0.1 * (1.0 - distance / max_distance);
                boost += proximity;
                reasons.push(
                    Reason::new(
                        "proximity",
                        format!("About {distance:.0} km from you"),
                        proximity,
                    )
                    .with_evidence(json!({ "distance_km": distance })),
                );
            }
        }

        RecommendationScore {
            candidate_id: community.id.clone(),
            score: base + boost,
            confidence: 0.8,
            method: Method::Popularity,
            reasons,
        }
    }

    /// Event variant. Events whose score lands at or below the floor are
    /// dropped entirely.
    pub fn score_events(
        &self,
        user: &User,
        candidates: &[&Event],
        now: DateTime<Utc>,
    ) -> Vec<RecommendationScore> {
        candidates
            .iter()
            .filter_map(|e| self.score_event(user, e, now))
            .collect()
    }

    fn score_event(
        &self,
        user: &User,
        event: &Event,
        now: DateTime<Utc>,
    ) -> Option<RecommendationScore> {
        let mut blend = WeightedBlend::new();
        let mut reasons = Vec::new();

        match event.max_attendees {
            Some(cap) if cap > 0 => {
                let fill_rate = event.current_attendees as f64 / cap as f64;
                if fill_rate > 0.5 {
                    blend.push(fill_rate.min(1.0), 0.4);
                    reasons.push(
                        Reason::new(
                            "popularity",
                            format!("{:.0}% full already", fill_rate.min(1.0) * 100.0),
                            0.4,
                        )
                        .with_evidence(json!({
                            "current_attendees": event.current_attendees,
                            "max_attendees": cap,
                        })),
                    );
                }
            }
            _ => {
                blend.push((event.current_attendees as f64 / 100.0).min(1.0), 0.3);
                if event.current_attendees > 0 {
                    reasons.push(Reason::new(
                        "popularity",
                        format!("{} people are attending", event.current_attendees),
                        0.3,
                    ));
                }
            }
        }

        let mut score = blend.value();

        if (now - event.created_at).num_days() < NEW_EVENT_WINDOW_DAYS {
            score += 0.15;
            reasons.push(Reason::new("new_event", "Recently announced", 0.15));
        }
        if preferred_category(user, &event.category) {
            score += 0.1;
            reasons.push(Reason::new(
                "category_preference",
                format!("Matches your preferred category '{}'", event.category),
                0.1,
            ));
        }

        if score <= EVENT_SCORE_FLOOR {
            return None;
        }

        Some(RecommendationScore {
            candidate_id: event.id.clone(),
            score,
            confidence: score.min(0.75),
            method: Method::Popularity,
            reasons,
        })
    }
}

fn preferred_category(user: &User, category: &str) -> bool {
    user.preferences
        .preferred_categories
        .iter()
        .any(|c| c.eq_ignore_ascii_case(category))
}
