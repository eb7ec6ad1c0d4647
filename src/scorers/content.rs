//! Content-based scoring: match user interests and preferences against
//! candidate attributes (tags, category, keywords, location, size).

use regex::Regex;
use serde_json::json;

use crate::keywords::{KeywordTable, INTEREST_KEYWORDS};
use crate::model::{Community, CommunitySize, Event, Method, Reason, RecommendationScore, User};
use crate::similarity::{haversine_distance_km, WeightedBlend};

/// Interest tokens shorter than this are too generic to match on.
const MIN_TOKEN_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct ContentScorer {
    keywords: &'static KeywordTable,
}

impl Default for ContentScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentScorer {
    pub fn new() -> Self {
        Self {
            keywords: &INTEREST_KEYWORDS,
        }
    }

    /// Inject an alternative keyword table (tests, experiments).
    pub fn with_keywords(keywords: &'static KeywordTable) -> Self {
        Self { keywords }
    }

    // ---- Community variant ----

    pub fn score_communities(
        &self,
        user: &User,
        candidates: &[&Community],
    ) -> Vec<RecommendationScore> {
        let interests = lowercase_all(user.interests.iter());
        candidates
            .iter()
            .map(|c| self.score_community(user, &interests, c))
            .collect()
    }

    fn score_community(
        &self,
        user: &User,
        interests: &[String],
        community: &Community,
    ) -> RecommendationScore {
        let mut terms: Vec<String> = Vec::with_capacity(1 + community.tags.len() + community.content_topics.len());
        terms.push(community.category.to_lowercase());
        terms.extend(lowercase_all(community.tags.iter()));
        terms.extend(lowercase_all(community.content_topics.iter()));

        let mut blend = WeightedBlend::new();
        let mut reasons = Vec::new();

        let (interest_score, matched_interests) = interest_term_match(interests, &terms);
        if !interests.is_empty() && !terms.is_empty() {
            blend.push(interest_score, 0.4);
            if !matched_interests.is_empty() {
                reasons.push(
                    Reason::new(
                        "interest_match",
                        format!("Matches your interests: {}", matched_interests.join(", ")),
                        0.4,
                    )
                    .with_evidence(json!({ "matched_interests": matched_interests })),
                );
            }
        }

        if !user.preferences.preferred_categories.is_empty() {
            let matched = user
                .preferences
                .preferred_categories
                .iter()
                .any(|c| c.eq_ignore_ascii_case(&community.category));
            blend.push(if matched { 0.8 } else { 0.0 }, 0.2);
            if matched {
                reasons.push(Reason::new(
                    "category_preference",
                    format!("In your preferred category '{}'", community.category),
                    0.2,
                ));
            }
        }

        match (&user.location, &community.location) {
            (Some(_), None) | (None, None) => {
                // No geo data on the candidate: treat it as online-capable
                // and lean on the interest signal at reduced weight instead
                // of penalizing it for missing location.
                blend.push(interest_score, 0.1);
            }
            (Some(ul), Some(cl)) => {
                let distance = haversine_distance_km(ul.lat, ul.lng, cl.lat, cl.lng);
                let max_distance = user.preferences.max_distance_km;
                if max_distance > 0.0 {
                    let proximity = (1.0 - distance / max_distance).max(0.0);
                    blend.push(proximity, 0.2);
                    if proximity > 0.0 {
                        reasons.push(
                            Reason::new(
                                "proximity",
                                format!("About {distance:.0} km from you"),
                                0.2,
                            )
                            .with_evidence(json!({ "distance_km": distance })),
                        );
                    }
                }
            }
            (None, Some(_)) => {}
        }

        blend.push(
            user.activity_level.closeness(community.activity_level()),
            0.1,
        );

        if let Some(preferred) = user.preferences.preferred_size {
            blend.push(
                preferred.match_score(CommunitySize::bracket(community.member_count)),
                0.1,
            );
        }

        RecommendationScore {
            candidate_id: community.id.clone(),
            score: blend.value(),
            confidence: blend.weight_sum().min(0.9),
            method: Method::ContentBased,
            reasons,
        }
    }

    // ---- Event variant ----

    pub fn score_events(&self, user: &User, candidates: &[&Event]) -> Vec<RecommendationScore> {
        let matcher = InterestMatcher::build(user, self.keywords);
        candidates
            .iter()
            .map(|e| self.score_event(user, &matcher, e))
            .collect()
    }

    fn score_event(
        &self,
        user: &User,
        matcher: &InterestMatcher,
        event: &Event,
    ) -> RecommendationScore {
        let mut blend = WeightedBlend::new();
        let mut reasons = Vec::new();

        if !matcher.is_empty() {
            let (category_score, via) = matcher.category_match(&event.category);
            blend.push(category_score, 0.4);
            if category_score > 0.0 {
                reasons.push(
                    Reason::new(
                        "category_match",
                        format!("'{}' lines up with your interest in {via}", event.category),
                        0.4,
                    )
                    .with_evidence(json!({ "category": event.category, "interest": via })),
                );
            }

            let text = event_text(event);
            let matched = matcher.matched_interests(&text);
            let keyword_score = matched.len() as f64 / matcher.len() as f64;
            blend.push(keyword_score, 0.35);
            if !matched.is_empty() {
                reasons.push(
                    Reason::new(
                        "keyword_match",
                        format!("Mentions topics you follow: {}", matched.join(", ")),
                        0.35,
                    )
                    .with_evidence(json!({ "matched_interests": matched })),
                );
            }
        }

        if !event.is_online {
            if let (Some(ul), Some(el)) = (&user.location, &event.location) {
                let distance = haversine_distance_km(ul.lat, ul.lng, el.lat, el.lng);
                let max_distance = user.preferences.max_distance_km;
                if max_distance > 0.0 {
                    let proximity = (1.0 - distance / max_distance).max(0.0);
                    blend.push(proximity, 0.15);
                    if proximity > 0.0 {
                        reasons.push(
                            Reason::new(
                                "proximity",
                                format!("About {distance:.0} km from you"),
                                0.15,
                            )
                            .with_evidence(json!({ "distance_km": distance })),
                        );
                    }
                }
            }
        }

        let mut score = blend.value();
        // Online events stay reachable for users without geo data; flat
        // boost outside the blend so strong matches can exceed 1.0.
        if event.is_online && user.location.is_none() {
            score += 0.1;
            reasons.push(Reason::new("online", "Online event, join from anywhere", 0.1));
        }

        RecommendationScore {
            candidate_id: event.id.clone(),
            score,
            confidence: blend.weight_sum().min(0.9),
            method: Method::ContentBased,
            reasons,
        }
    }
}

/// Match user interests against a candidate's label set. Exact term hits
/// earn full credit, substring/token hits half credit; the total is
/// normalized by the larger of the two sides so sprawling tag lists don't
/// inflate the score.
fn interest_term_match(interests: &[String], terms: &[String]) -> (f64, Vec<String>) {
    if interests.is_empty() || terms.is_empty() {
        return (0.0, Vec::new());
    }
    let mut credit = 0.0;
    let mut matched = Vec::new();
    for interest in interests {
        let tokens = tokens_of(interest);
        let mut best: f64 = 0.0;
        for term in terms {
            if term == interest {
                best = 1.0;
                break;
            }
            if term.contains(interest.as_str())
                || interest.contains(term.as_str())
                || tokens
                    .iter()
                    .any(|t| term.contains(t.as_str()) || t.contains(term.as_str()))
            {
                best = best.max(0.5);
            }
        }
        if best > 0.0 {
            credit += best;
            matched.push(interest.clone());
        }
    }
    let denominator = interests.len().max(terms.len()) as f64;
    (credit / denominator, matched)
}

/// Per-user compiled matcher: one entry per interest carrying its keyword
/// expansion (table entries plus the interest's own word tokens) as
/// word-boundary regexes. Built once per recommendation call.
struct InterestMatcher {
    entries: Vec<InterestEntry>,
}

struct InterestEntry {
    interest: String,
    patterns: Vec<Regex>,
}

impl InterestMatcher {
    fn build(user: &User, table: &KeywordTable) -> Self {
        let entries = user
            .interests
            .iter()
            .map(|raw| {
                let interest = raw.to_lowercase();
                let mut keywords: Vec<String> = tokens_of(&interest);
                if let Some(expansion) = table.get(interest.as_str()) {
                    keywords.extend(expansion.iter().map(|k| k.to_string()));
                }
                keywords.sort();
                keywords.dedup();
                let patterns = keywords
                    .iter()
                    .filter_map(|kw| {
                        Regex::new(&format!(r"\b{}\b", regex::escape(kw))).ok()
                    })
                    .collect();
                InterestEntry { interest, patterns }
            })
            .collect();
        Self { entries }
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// Best category affinity across all interests: exact label match 1.0,
    /// substring or keyword-expansion hit 0.7. Returns the interest that
    /// produced the best hit for the reason text.
    fn category_match(&self, category: &str) -> (f64, String) {
        let category = category.to_lowercase();
        let mut best = 0.0;
        let mut via = String::new();
        for entry in &self.entries {
            let score = if entry.interest == category {
                1.0
            } else if category.contains(entry.interest.as_str())
                || entry.interest.contains(category.as_str())
                || entry.patterns.iter().any(|p| p.is_match(&category))
            {
                0.7
            } else {
                0.0
            };
            if score > best {
                best = score;
                via = entry.interest.clone();
            }
            if best == 1.0 {
                break;
            }
        }
        (best, via)
    }

    /// Interests with at least one keyword hit in the text. Each interest is
    /// counted at most once no matter how many of its keywords match.
    fn matched_interests(&self, text: &str) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.patterns.iter().any(|p| p.is_match(text)))
            .map(|e| e.interest.clone())
            .collect()
    }
}

fn event_text(event: &Event) -> String {
    let mut text = String::with_capacity(
        event.title.len() + event.description.len() + event.category.len() + 64,
    );
    text.push_str(&event.title);
    text.push(' ');
    text.push_str(&event.description);
    text.push(' ');
    text.push_str(&event.category);
    for tag in &event.tags {
        text.push(' ');
        text.push_str(tag);
    }
    for topic in &event.content_topics {
        text.push(' ');
        text.push_str(topic);
    }
    text.to_lowercase()
}

fn tokens_of(interest: &str) -> Vec<String> {
    interest
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .map(|t| t.to_string())
        .collect()
}

fn lowercase_all<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    items.map(|s| s.to_lowercase()).collect()
}
