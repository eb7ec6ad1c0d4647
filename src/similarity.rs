//! Similarity primitives shared by every scorer.
//!
//! Pure functions, no state. Division-by-zero guards are mandatory here:
//! an empty union, an empty weight sum, or a missing location must produce
//! 0 (or an omitted term), never NaN.

use std::collections::HashSet;
use std::hash::Hash;

use crate::model::User;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Jaccard set similarity: |A ∩ B| / |A ∪ B|. Empty union yields 0.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Great-circle distance between two points, in kilometers.
pub fn haversine_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Accumulate-score/accumulate-weight blender.
///
/// Every scorer that combines sub-signals uses this so that missing signals
/// (no location on either side, no stated preference) drop out of the
/// denominator instead of biasing the result toward zero.
#[derive(Debug, Default, Clone)]
pub struct WeightedBlend {
    score_sum: f64,
    weight_sum: f64,
}

impl WeightedBlend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one `score * weight` term to the blend.
    pub fn push(&mut self, score: f64, weight: f64) {
        self.score_sum += score * weight;
        self.weight_sum += weight;
    }

    /// Total weight actually accumulated. Feeds confidence in the
    /// content-based scorer.
    pub fn weight_sum(&self) -> f64 {
        self.weight_sum
    }

    /// Weighted average, or 0 if no term was pushed.
    pub fn value(&self) -> f64 {
        if self.weight_sum > 0.0 {
            self.score_sum / self.weight_sum
        } else {
            0.0
        }
    }
}

/// User-to-user similarity as seen by the community engine: shared
/// memberships dominate, with interests, proximity, and activity level as
/// secondary signals.
pub fn user_similarity_for_communities(a: &User, b: &User) -> f64 {
    let mut blend = WeightedBlend::new();
    blend.push(jaccard(&a.joined_communities, &b.joined_communities), 0.4);
    blend.push(jaccard(&a.interests, &b.interests), 0.3);
    if let (Some(la), Some(lb)) = (&a.location, &b.location) {
        let distance = haversine_distance_km(la.lat, la.lng, lb.lat, lb.lng);
        blend.push((1.0 - distance / 100.0).max(0.0), 0.2);
    }
    blend.push(a.activity_level.closeness(b.activity_level), 0.1);
    blend.value()
}

/// User-to-user similarity as seen by the event engine: shared attendance
/// first, then memberships and interests.
pub fn user_similarity_for_events(a: &User, b: &User) -> f64 {
    let mut blend = WeightedBlend::new();
    blend.push(jaccard(&a.attended_events, &b.attended_events), 0.4);
    blend.push(jaccard(&a.joined_communities, &b.joined_communities), 0.3);
    blend.push(jaccard(&a.interests, &b.interests), 0.3);
    blend.value()
}

/// Pairwise community similarity for item-based recommendation:
/// category equality (0.3), tag overlap (0.4), and member overlap across
/// the whole user population (0.3).
pub fn community_similarity(
    category_a: &str,
    category_b: &str,
    tags_a: &HashSet<String>,
    tags_b: &HashSet<String>,
    members_a: &HashSet<String>,
    members_b: &HashSet<String>,
) -> f64 {
    let category_score = if category_a.eq_ignore_ascii_case(category_b) {
        1.0
    } else {
        0.0
    };
    category_score * 0.3 + jaccard(tags_a, tags_b) * 0.4 + jaccard(members_a, members_b) * 0.3
}
