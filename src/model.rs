//! Core value objects for the recommendation engine.
//!
//! Everything here is read-only input or engine-local output for the duration
//! of a single recommendation call; nothing persists between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Coarse activity bucket for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Low,
    Medium,
    High,
}

impl ActivityLevel {
    /// Ordinal rank (low=1, medium=2, high=3) used for closeness scoring.
    pub fn rank(self) -> f64 {
        match self {
            ActivityLevel::Low => 1.0,
            ActivityLevel::Medium => 2.0,
            ActivityLevel::High => 3.0,
        }
    }

    /// Closeness of two levels in [0, 1]: identical levels score 1.0,
    /// opposite ends score 0.0.
    pub fn closeness(self, other: ActivityLevel) -> f64 {
        1.0 - (self.rank() - other.rank()).abs() / 2.0
    }
}

/// Community size brackets users can express a preference for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunitySize {
    Small,
    Medium,
    Large,
}

impl CommunitySize {
    /// Bracket a raw member count. Small < 100, Medium < 1000, Large otherwise.
    pub fn bracket(member_count: u32) -> Self {
        match member_count {
            0..=99 => CommunitySize::Small,
            100..=999 => CommunitySize::Medium,
            _ => CommunitySize::Large,
        }
    }

    fn ordinal(self) -> i8 {
        match self {
            CommunitySize::Small => 0,
            CommunitySize::Medium => 1,
            CommunitySize::Large => 2,
        }
    }

    /// Preference match score: exact bracket hit 1.0, adjacent bracket 0.5,
    /// otherwise 0.0.
    pub fn match_score(self, other: CommunitySize) -> f64 {
        match (self.ordinal() - other.ordinal()).abs() {
            0 => 1.0,
            1 => 0.5,
            _ => 0.0,
        }
    }
}

/// A point on the globe, optionally labeled with a city name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            city: None,
        }
    }
}

/// Stated preferences on a user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub preferred_categories: HashSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_size: Option<CommunitySize>,
    /// Maximum distance (km) the user is willing to travel.
    pub max_distance_km: f64,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            preferred_categories: HashSet::new(),
            preferred_size: None,
            max_distance_km: 50.0,
        }
    }
}

/// A user profile snapshot, as materialized by the upstream repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub interests: HashSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub preferences: UserPreferences,
    pub activity_level: ActivityLevel,
    pub joined_communities: HashSet<String>,
    pub attended_events: HashSet<String>,
    /// Length of the user's interaction log. The log itself is opaque to the
    /// engine; only its size feeds the data-richness heuristics.
    #[serde(default)]
    pub interaction_count: usize,
}

/// A candidate community.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub name: String,
    pub category: String,
    pub tags: HashSet<String>,
    pub content_topics: HashSet<String>,
    pub member_count: u32,
    /// Fractional month-over-month growth; can be negative.
    pub growth_rate: f64,
    /// Engagement on a 0-100 scale.
    pub engagement_score: f64,
    pub last_activity: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub created_at: DateTime<Utc>,
}

impl Community {
    /// Communities carry no explicit activity level; derive one from the
    /// engagement scale for activity-match scoring.
    pub fn activity_level(&self) -> ActivityLevel {
        if self.engagement_score >= 66.0 {
            ActivityLevel::High
        } else if self.engagement_score >= 33.0 {
            ActivityLevel::Medium
        } else {
            ActivityLevel::Low
        }
    }
}

/// A candidate event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: HashSet<String>,
    pub content_topics: HashSet<String>,
    pub community_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    pub is_online: bool,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<u32>,
    pub current_attendees: u32,
    pub created_at: DateTime<Utc>,
}

/// Which algorithm produced a score. Labels are part of the API contract:
/// downstream consumers match on the serialized strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    ContentBased,
    Collaborative,
    CollaborativeUserBased,
    CollaborativeItemBased,
    Popularity,
    CommunityBased,
    Hybrid,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::ContentBased => "content_based",
            Method::Collaborative => "collaborative",
            Method::CollaborativeUserBased => "collaborative_user_based",
            Method::CollaborativeItemBased => "collaborative_item_based",
            Method::Popularity => "popularity",
            Method::CommunityBased => "community_based",
            Method::Hybrid => "hybrid",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a candidate was recommended. `evidence` is free-form diagnostic data;
/// different scorers populate different shapes and consumers must not rely on
/// a closed schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reason {
    pub kind: String,
    pub description: String,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub evidence: serde_json::Value,
}

impl Reason {
    pub fn new(kind: &str, description: impl Into<String>, weight: f64) -> Self {
        Self {
            kind: kind.to_string(),
            description: description.into(),
            weight,
            evidence: serde_json::Value::Null,
        }
    }

    pub fn with_evidence(mut self, evidence: serde_json::Value) -> Self {
        self.evidence = evidence;
        self
    }
}

/// A scored candidate, for either domain.
///
/// `score` is an unbounded ranking weight, comparable only relative to peers
/// in the same result set. Boosts (personalization, timing, diversity) push
/// it above 1.0 deliberately; it is NOT a probability. `confidence` is
/// intended to be 0-1 and is used only as a merge weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationScore {
    pub candidate_id: String,
    pub score: f64,
    pub confidence: f64,
    pub method: Method,
    pub reasons: Vec<Reason>,
}

/// Per-call metadata reported alongside the ranked list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Candidate count after pre-filtering, before scoring.
    pub total_candidates: usize,
    pub algorithms_used: Vec<Method>,
    pub processing_time_ms: u64,
    /// Diversity of the final truncated list, in [0, 1].
    pub diversity_score: f64,
}

/// Final output of one recommendation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<RecommendationScore>,
    pub metadata: ResultMetadata,
}

/// Blend weights across the scoring algorithms. The strategy stage adjusts
/// and re-normalizes these per user before any scorer runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmWeights {
    pub collaborative: f64,
    pub content_based: f64,
    pub popularity: f64,
    /// Community-membership boost weight; only the event engine uses it.
    pub community_membership: f64,
}

impl AlgorithmWeights {
    /// Default blend for the community engine: 40/40/20.
    pub fn community_defaults() -> Self {
        Self {
            collaborative: 0.4,
            content_based: 0.4,
            popularity: 0.2,
            community_membership: 0.0,
        }
    }

    /// Default blend for the event engine: 25/35/15/25.
    pub fn event_defaults() -> Self {
        Self {
            collaborative: 0.25,
            content_based: 0.35,
            popularity: 0.15,
            community_membership: 0.25,
        }
    }

    pub fn sum(&self) -> f64 {
        self.collaborative + self.content_based + self.popularity + self.community_membership
    }

    /// Clamp each weight to >= 0 and rescale so the weights sum to 1.
    /// A degenerate all-zero set is left untouched.
    pub fn normalize(&mut self) {
        self.collaborative = self.collaborative.max(0.0);
        self.content_based = self.content_based.max(0.0);
        self.popularity = self.popularity.max(0.0);
        self.community_membership = self.community_membership.max(0.0);
        let total = self.sum();
        if total > 0.0 {
            self.collaborative /= total;
            self.content_based /= total;
            self.popularity /= total;
            self.community_membership /= total;
        }
    }

    fn validate(&self) -> Result<()> {
        let all = [
            ("collaborative", self.collaborative),
            ("content_based", self.content_based),
            ("popularity", self.popularity),
            ("community_membership", self.community_membership),
        ];
        for (name, w) in all {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::invalid_option(
                    "weights",
                    format!("weight '{name}' must be a finite non-negative number"),
                ));
            }
        }
        if self.sum() <= 0.0 {
            return Err(Error::invalid_option(
                "weights",
                "at least one algorithm weight must be positive",
            ));
        }
        Ok(())
    }
}

/// Date-range pre-filter for the event engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeFilter {
    #[default]
    All,
    Today,
    Week,
    Month,
}

/// Options for the community engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendOptions {
    pub max_recommendations: usize,
    pub include_popular: bool,
    pub diversity_weight: f64,
    /// Override the default algorithm blend. Adjusted per user by the
    /// strategy stage either way.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<AlgorithmWeights>,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        Self {
            max_recommendations: 20,
            include_popular: true,
            diversity_weight: 0.3,
            weights: None,
        }
    }
}

impl RecommendOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_common(
            self.max_recommendations,
            self.diversity_weight,
            self.weights.as_ref(),
        )
    }
}

/// Options for the event engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecommendOptions {
    pub max_recommendations: usize,
    pub include_popular: bool,
    pub diversity_weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<AlgorithmWeights>,
    #[serde(default)]
    pub date_range: DateRangeFilter,
    #[serde(default)]
    pub include_online_only: bool,
    #[serde(default)]
    pub include_in_person_only: bool,
}

impl Default for EventRecommendOptions {
    fn default() -> Self {
        Self {
            max_recommendations: 20,
            include_popular: true,
            diversity_weight: 0.3,
            weights: None,
            date_range: DateRangeFilter::All,
            include_online_only: false,
            include_in_person_only: false,
        }
    }
}

impl EventRecommendOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.include_online_only && self.include_in_person_only {
            return Err(Error::ConflictingFilters {
                first: "include_online_only",
                second: "include_in_person_only",
            });
        }
        validate_common(
            self.max_recommendations,
            self.diversity_weight,
            self.weights.as_ref(),
        )
    }
}

fn validate_common(
    max_recommendations: usize,
    diversity_weight: f64,
    weights: Option<&AlgorithmWeights>,
) -> Result<()> {
    if max_recommendations == 0 {
        return Err(Error::invalid_option(
            "max_recommendations",
            "must be at least 1",
        ));
    }
    if !diversity_weight.is_finite() || diversity_weight < 0.0 {
        return Err(Error::invalid_option(
            "diversity_weight",
            "must be a finite non-negative number",
        ));
    }
    if let Some(w) = weights {
        w.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bracket_and_match() {
        assert_eq!(CommunitySize::bracket(50), CommunitySize::Small);
        assert_eq!(CommunitySize::bracket(100), CommunitySize::Medium);
        assert_eq!(CommunitySize::bracket(5000), CommunitySize::Large);

        assert_eq!(
            CommunitySize::Small.match_score(CommunitySize::Small),
            1.0
        );
        assert_eq!(
            CommunitySize::Small.match_score(CommunitySize::Medium),
            0.5
        );
        assert_eq!(
            CommunitySize::Small.match_score(CommunitySize::Large),
            0.0
        );
    }

    #[test]
    fn test_activity_closeness() {
        assert_eq!(ActivityLevel::High.closeness(ActivityLevel::High), 1.0);
        assert_eq!(ActivityLevel::Low.closeness(ActivityLevel::High), 0.0);
        assert_eq!(ActivityLevel::Low.closeness(ActivityLevel::Medium), 0.5);
    }

    #[test]
    fn test_method_labels() {
        assert_eq!(Method::ContentBased.as_str(), "content_based");
        assert_eq!(
            Method::CollaborativeUserBased.as_str(),
            "collaborative_user_based"
        );
        assert_eq!(
            serde_json::to_string(&Method::Hybrid).unwrap(),
            "\"hybrid\""
        );
    }

    #[test]
    fn test_weight_normalization() {
        let mut w = AlgorithmWeights {
            collaborative: -0.1,
            content_based: 0.6,
            popularity: 0.2,
            community_membership: 0.2,
        };
        w.normalize();
        assert_eq!(w.collaborative, 0.0);
        assert!((w.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_conflicting_event_filters_rejected() {
        let opts = EventRecommendOptions {
            include_online_only: true,
            include_in_person_only: true,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_zero_max_recommendations_rejected() {
        let opts = RecommendOptions {
            max_recommendations: 0,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }
}
