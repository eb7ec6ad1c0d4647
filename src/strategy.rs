//! Strategy selection: decide per user whether collaborative signal is
//! trustworthy and redistribute the algorithm weights accordingly.
//!
//! The rules apply in order, each mutating the running weight set; the
//! final set is clamped to >= 0 and normalized to sum to 1.

use tracing::debug;

use crate::model::{AlgorithmWeights, User};

const COMMUNITY_NEW_USER_INTERACTIONS: usize = 5;
const EVENT_NEW_USER_INTERACTIONS: usize = 3;
const COMMUNITY_MIN_OWN_SIGNAL: usize = 2;
const EVENT_MIN_OWN_SIGNAL: usize = 2;
const COMMUNITY_MIN_OVERLAP_USERS: usize = 5;
const EVENT_MIN_OVERLAP_USERS: usize = 3;
const COMMUNITY_RICHNESS_NORMALIZER: f64 = 20.0;
const EVENT_RICHNESS_NORMALIZER: f64 = 15.0;
const LOW_RICHNESS_THRESHOLD: f64 = 0.3;

/// Outcome of the per-user strategy pass.
#[derive(Debug, Clone)]
pub struct StrategyDecision {
    pub weights: AlgorithmWeights,
    pub use_collaborative: bool,
    pub is_new_user: bool,
    pub data_richness: f64,
}

/// Weight adjustment for the community engine.
pub fn select_community_strategy(
    user: &User,
    all_users: &[User],
    base: AlgorithmWeights,
) -> StrategyDecision {
    let mut weights = base;

    let is_new_user = user.joined_communities.is_empty()
        && user.interaction_count < COMMUNITY_NEW_USER_INTERACTIONS;

    let overlap_users = all_users
        .iter()
        .filter(|u| u.id != user.id)
        .filter(|u| !u.joined_communities.is_disjoint(&user.joined_communities))
        .count();
    let use_collaborative = user.joined_communities.len() >= COMMUNITY_MIN_OWN_SIGNAL
        && overlap_users >= COMMUNITY_MIN_OVERLAP_USERS;

    if !use_collaborative {
        let freed = weights.collaborative;
        weights.collaborative = 0.0;
        weights.content_based += freed * 0.7;
        weights.popularity += freed * 0.3;
    }

    if is_new_user {
        weights.content_based -= 0.1;
        weights.collaborative -= 0.1;
        weights.popularity += 0.2;
    }

    let data_richness = ((user.joined_communities.len() + user.interaction_count) as f64
        / COMMUNITY_RICHNESS_NORMALIZER)
        .min(1.0);
    if data_richness < LOW_RICHNESS_THRESHOLD {
        weights.content_based -= 0.05;
        weights.collaborative -= 0.05;
        weights.popularity += 0.1;
    }

    weights.normalize();
    debug!(
        user_id = %user.id,
        use_collaborative,
        is_new_user,
        data_richness,
        ?weights,
        "community strategy selected"
    );

    StrategyDecision {
        weights,
        use_collaborative,
        is_new_user,
        data_richness,
    }
}

/// Weight adjustment for the event engine. The freed collaborative weight
/// and the cold-start/low-richness shifts also feed the community-membership
/// algorithm.
pub fn select_event_strategy(
    user: &User,
    all_users: &[User],
    base: AlgorithmWeights,
) -> StrategyDecision {
    let mut weights = base;

    let is_new_user =
        user.attended_events.is_empty() && user.interaction_count < EVENT_NEW_USER_INTERACTIONS;

    let overlap_users = all_users
        .iter()
        .filter(|u| u.id != user.id)
        .filter(|u| !u.attended_events.is_disjoint(&user.attended_events))
        .count();
    let use_collaborative = user.attended_events.len() >= EVENT_MIN_OWN_SIGNAL
        && overlap_users >= EVENT_MIN_OVERLAP_USERS;

    if !use_collaborative {
        let freed = weights.collaborative;
        weights.collaborative = 0.0;
        weights.content_based += freed * 0.5;
        weights.popularity += freed * 0.2;
        weights.community_membership += freed * 0.3;
    }

    if is_new_user {
        weights.content_based -= 0.075;
        weights.collaborative -= 0.075;
        weights.popularity += 0.075;
        weights.community_membership += 0.075;
    }

    let data_richness = ((user.attended_events.len()
        + user.interaction_count
        + user.joined_communities.len()) as f64
        / EVENT_RICHNESS_NORMALIZER)
        .min(1.0);
    if data_richness < LOW_RICHNESS_THRESHOLD {
        weights.content_based -= 0.05;
        weights.collaborative -= 0.05;
        weights.popularity += 0.05;
        weights.community_membership += 0.05;
    }

    weights.normalize();
    debug!(
        user_id = %user.id,
        use_collaborative,
        is_new_user,
        data_richness,
        ?weights,
        "event strategy selected"
    );

    StrategyDecision {
        weights,
        use_collaborative,
        is_new_user,
        data_richness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActivityLevel, UserPreferences};
    use std::collections::HashSet;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn user(id: &str, joined: &[&str], attended: &[&str], interactions: usize) -> User {
        User {
            id: id.to_string(),
            interests: HashSet::new(),
            location: None,
            preferences: UserPreferences::default(),
            activity_level: ActivityLevel::Medium,
            joined_communities: set(joined),
            attended_events: set(attended),
            interaction_count: interactions,
        }
    }

    #[test]
    fn test_new_user_gets_popularity_boost() {
        let target = user("t", &[], &[], 0);
        let decision = select_community_strategy(
            &target,
            &[],
            AlgorithmWeights::community_defaults(),
        );
        assert!(decision.is_new_user);
        assert!(!decision.use_collaborative);
        // Popularity must end strictly above its unadjusted 0.2 default.
        assert!(decision.weights.popularity > 0.2);
        assert_eq!(decision.weights.collaborative, 0.0);
    }

    #[test]
    fn test_weights_always_normalized() {
        let cases = [
            user("a", &[], &[], 0),
            user("b", &["c1", "c2", "c3"], &[], 30),
            user("c", &["c1"], &[], 2),
        ];
        let population: Vec<User> = (0..8)
            .map(|i| user(&format!("p{i}"), &["c1", "c2"], &["e1"], 10))
            .collect();
        for target in &cases {
            let d = select_community_strategy(
                target,
                &population,
                AlgorithmWeights::community_defaults(),
            );
            assert!((d.weights.sum() - 1.0).abs() < 1e-9);
            assert!(d.weights.collaborative >= 0.0);
            assert!(d.weights.content_based >= 0.0);
            assert!(d.weights.popularity >= 0.0);
        }
    }

    #[test]
    fn test_rich_user_keeps_collaborative() {
        let target = user("t", &["c1", "c2"], &[], 15);
        let population: Vec<User> = (0..6)
            .map(|i| user(&format!("p{i}"), &["c1"], &[], 5))
            .collect();
        let d = select_community_strategy(
            &target,
            &population,
            AlgorithmWeights::community_defaults(),
        );
        assert!(d.use_collaborative);
        assert!(d.weights.collaborative > 0.0);
        assert!(!d.is_new_user);
    }

    #[test]
    fn test_event_strategy_redistributes_to_membership() {
        let target = user("t", &["c1"], &[], 1);
        let d = select_event_strategy(&target, &[], AlgorithmWeights::event_defaults());
        assert!(!d.use_collaborative);
        assert_eq!(d.weights.collaborative, 0.0);
        // Freed collaborative weight flows partly to the membership scorer.
        assert!(d.weights.community_membership > 0.25);
        assert!((d.weights.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_requirement_gates_collaborative() {
        let target = user("t", &["c1", "c2"], &[], 15);
        // Plenty of own signal but nobody shares a community.
        let population: Vec<User> = (0..6)
            .map(|i| user(&format!("p{i}"), &["other"], &[], 5))
            .collect();
        let d = select_community_strategy(
            &target,
            &population,
            AlgorithmWeights::community_defaults(),
        );
        assert!(!d.use_collaborative);
    }

    #[test]
    fn test_data_richness_scaling() {
        let sparse = user("s", &["c1"], &[], 1);
        let rich = user("r", &["c1", "c2", "c3"], &[], 25);
        let d_sparse =
            select_community_strategy(&sparse, &[], AlgorithmWeights::community_defaults());
        let d_rich = select_community_strategy(&rich, &[], AlgorithmWeights::community_defaults());
        assert!(d_sparse.data_richness < LOW_RICHNESS_THRESHOLD);
        assert_eq!(d_rich.data_richness, 1.0);
        // The sparse user's popularity weight gets the extra low-richness shift.
        assert!(d_sparse.weights.popularity > d_rich.weights.popularity);
    }
}
