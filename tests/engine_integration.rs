//! End-to-end pipeline tests for both recommendation engines.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

use convoke::model::{ActivityLevel, GeoPoint, UserPreferences};
use convoke::{
    Community, CommunityRecommender, Event, EventRecommendOptions, EventRecommender, Method,
    RecommendOptions, User,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("convoke=debug")
        .with_test_writer()
        .try_init();
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn user(id: &str, joined: &[&str], attended: &[&str], interests: &[&str]) -> User {
    User {
        id: id.to_string(),
        interests: set(interests),
        location: None,
        preferences: UserPreferences::default(),
        activity_level: ActivityLevel::Medium,
        joined_communities: set(joined),
        attended_events: set(attended),
        interaction_count: 8,
    }
}

fn community(id: &str, category: &str, tags: &[&str], members: u32) -> Community {
    let now = Utc::now();
    Community {
        id: id.to_string(),
        name: format!("{id} community"),
        category: category.to_string(),
        tags: set(tags),
        content_topics: HashSet::new(),
        member_count: members,
        growth_rate: 0.1,
        engagement_score: 55.0,
        last_activity: now - Duration::days(2),
        location: None,
        created_at: now - Duration::days(300),
    }
}

fn event(id: &str, category: &str, community_id: &str, start: DateTime<Utc>) -> Event {
    Event {
        id: id.to_string(),
        title: format!("{id} gathering"),
        description: format!("A {category} get-together"),
        category: category.to_string(),
        tags: set(&[category]),
        content_topics: HashSet::new(),
        community_id: community_id.to_string(),
        community_name: Some(format!("{community_id} community")),
        location: None,
        is_online: true,
        start_time: start,
        end_time: None,
        max_attendees: Some(80),
        current_attendees: 50,
        created_at: start - Duration::days(15),
    }
}

fn population() -> Vec<User> {
    let mut users = Vec::new();
    for i in 0..12 {
        let joined: Vec<&str> = if i % 2 == 0 {
            vec!["c_tech", "c_music"]
        } else {
            vec!["c_tech", "c_food"]
        };
        let attended: Vec<&str> = if i % 3 == 0 {
            vec!["e_past_1", "e_future_synth"]
        } else {
            vec!["e_past_1"]
        };
        users.push(user(
            &format!("member{i}"),
            &joined,
            &attended,
            &["music", "tech & innovation"],
        ));
    }
    users
}

fn catalog() -> Vec<Community> {
    vec![
        community("c_tech", "Technology", &["tech", "ai"], 2000),
        community("c_music", "Music", &["music", "concerts"], 800),
        community("c_food", "Food", &["cooking"], 300),
        community("c_books", "Books", &["reading"], 150),
        community("c_games", "Gaming", &["games"], 600),
    ]
}

fn upcoming_events(now: DateTime<Utc>) -> Vec<Event> {
    vec![
        event("e_future_synth", "Music", "c_music", now + Duration::days(2)),
        event("e_ai_demo", "Technology", "c_tech", now + Duration::days(5)),
        event("e_supper", "Food", "c_food", now + Duration::days(9)),
        event("e_book_club", "Books", "c_books", now + Duration::days(12)),
        event("e_lan_party", "Gaming", "c_games", now + Duration::days(20)),
        event("e_past_1", "Music", "c_music", now - Duration::days(30)),
    ]
}

#[test]
fn joined_and_attended_never_appear_in_output() {
    init_tracing();
    let now = Utc::now();
    let target = user(
        "target",
        &["c_tech", "c_music"],
        &["e_past_1", "e_future_synth"],
        &["music", "tech & innovation"],
    );
    let users = population();

    let community_result = CommunityRecommender::new()
        .recommend_at(&target, &users, &catalog(), &RecommendOptions::default(), now)
        .unwrap();
    for rec in &community_result.recommendations {
        assert!(!target.joined_communities.contains(&rec.candidate_id));
    }

    let event_result = EventRecommender::new()
        .recommend_at(
            &target,
            &users,
            &upcoming_events(now),
            &target.joined_communities.clone(),
            &EventRecommendOptions::default(),
            now,
        )
        .unwrap();
    for rec in &event_result.recommendations {
        assert!(!target.attended_events.contains(&rec.candidate_id));
    }
}

#[test]
fn event_pipeline_is_deterministic_for_fixed_now() {
    init_tracing();
    let now = Utc::now();
    let target = user("target", &["c_tech"], &["e_past_1"], &["music"]);
    let users = population();
    let events = upcoming_events(now);
    let joined = target.joined_communities.clone();
    let engine = EventRecommender::new();
    let options = EventRecommendOptions::default();

    let a = engine
        .recommend_at(&target, &users, &events, &joined, &options, now)
        .unwrap();
    let b = engine
        .recommend_at(&target, &users, &events, &joined, &options, now)
        .unwrap();

    assert_eq!(a.recommendations.len(), b.recommendations.len());
    for (ra, rb) in a.recommendations.iter().zip(&b.recommendations) {
        assert_eq!(ra.candidate_id, rb.candidate_id);
        assert_eq!(ra.score, rb.score);
        assert_eq!(ra.confidence, rb.confidence);
    }
    assert_eq!(a.metadata.diversity_score, b.metadata.diversity_score);
}

#[test]
fn truncation_respects_max_recommendations() {
    let now = Utc::now();
    let target = user("target", &[], &[], &["tech & innovation"]);
    let catalog: Vec<Community> = (0..50)
        .map(|i| community(&format!("c{i}"), "Technology", &["tech"], 100 + i))
        .collect();
    let options = RecommendOptions {
        max_recommendations: 7,
        ..Default::default()
    };
    let result = CommunityRecommender::new()
        .recommend_at(&target, &[], &catalog, &options, now)
        .unwrap();
    assert!(result.recommendations.len() <= 7);
}

#[test]
fn diversity_weight_does_not_hurt_diversity_score() {
    // With at least 3 distinct categories in the pool, raising the
    // diversity weight from 0 to 0.5 must not lower the reported metric.
    let now = Utc::now();
    let target = user("target", &[], &[], &["music", "tech & innovation"]);
    let users = population();
    let events = upcoming_events(now);
    let engine = EventRecommender::new();

    let low = engine
        .recommend_at(
            &target,
            &users,
            &events,
            &HashSet::new(),
            &EventRecommendOptions {
                diversity_weight: 0.0,
                max_recommendations: 4,
                ..Default::default()
            },
            now,
        )
        .unwrap();
    let high = engine
        .recommend_at(
            &target,
            &users,
            &events,
            &HashSet::new(),
            &EventRecommendOptions {
                diversity_weight: 0.5,
                max_recommendations: 4,
                ..Default::default()
            },
            now,
        )
        .unwrap();

    assert!(high.metadata.diversity_score >= low.metadata.diversity_score);
}

#[test]
fn merged_candidates_carry_hybrid_method_and_reasons() {
    let now = Utc::now();
    let target = user("target", &["c_tech"], &[], &["music"]);
    let users = population();
    let result = CommunityRecommender::new()
        .recommend_at(&target, &users, &catalog(), &RecommendOptions::default(), now)
        .unwrap();

    let music = result
        .recommendations
        .iter()
        .find(|r| r.candidate_id == "c_music")
        .expect("music community should be recommended");
    // Scored by content and popularity at least; collaborative likely too.
    assert_eq!(music.method, Method::Hybrid);
    assert!(music.reasons.len() >= 2);
}

#[test]
fn metadata_reports_invoked_algorithms_and_counts() {
    let now = Utc::now();
    let target = user("target", &["c_tech", "c_music"], &["e_past_1"], &["music"]);
    let users = population();
    let result = CommunityRecommender::new()
        .recommend_at(&target, &users, &catalog(), &RecommendOptions::default(), now)
        .unwrap();

    assert_eq!(result.metadata.total_candidates, 3);
    assert!(result.metadata.algorithms_used.contains(&Method::ContentBased));
    assert!(result.metadata.algorithms_used.contains(&Method::Popularity));
    // Target shares communities with the whole population: collaborative on.
    assert!(result.metadata.algorithms_used.contains(&Method::Collaborative));
    assert!((0.0..=1.0).contains(&result.metadata.diversity_score));
}

#[test]
fn empty_population_and_pool_yield_valid_empty_result() {
    let now = Utc::now();
    let target = user("target", &[], &[], &[]);
    let result = EventRecommender::new()
        .recommend_at(
            &target,
            &[],
            &[],
            &HashSet::new(),
            &EventRecommendOptions::default(),
            now,
        )
        .unwrap();
    assert!(result.recommendations.is_empty());
    assert_eq!(result.metadata.total_candidates, 0);
    assert_eq!(result.metadata.diversity_score, 0.0);
}

#[test]
fn scores_serialize_with_contract_labels() {
    let now = Utc::now();
    let target = user("target", &[], &[], &["tech & innovation"]);
    let result = CommunityRecommender::new()
        .recommend_at(&target, &[], &catalog(), &RecommendOptions::default(), now)
        .unwrap();
    let json = serde_json::to_value(&result).unwrap();
    let methods: Vec<&str> = json["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["method"].as_str().unwrap())
        .collect();
    for m in methods {
        assert!(
            [
                "content_based",
                "collaborative",
                "collaborative_user_based",
                "collaborative_item_based",
                "popularity",
                "community_based",
                "hybrid"
            ]
            .contains(&m)
        );
    }
}

#[test]
fn nearby_user_sees_distance_reasons() {
    let now = Utc::now();
    let mut target = user("target", &[], &[], &["music"]);
    target.location = Some(GeoPoint::new(52.52, 13.405));
    let mut close = community("c_close", "Music", &["music"], 400);
    close.location = Some(GeoPoint::new(52.5, 13.4));

    let result = CommunityRecommender::new()
        .recommend_at(&target, &[], &[close], &RecommendOptions::default(), now)
        .unwrap();
    let rec = &result.recommendations[0];
    assert!(rec
        .reasons
        .iter()
        .any(|r| r.kind == "proximity"));
}
