//! Interest keyword expansion table.
//!
//! Maps canonical interest labels to the keyword lists the content-based
//! event scorer matches against free text. Loaded once, immutable; the
//! scorer takes it by reference so alternative tables can be injected in
//! tests.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub type KeywordTable = HashMap<&'static str, &'static [&'static str]>;

pub static INTEREST_KEYWORDS: Lazy<KeywordTable> = Lazy::new(|| {
    let mut table: KeywordTable = HashMap::new();
    table.insert(
        "tech & innovation",
        &[
            "tech",
            "technology",
            "software",
            "programming",
            "coding",
            "developer",
            "startup",
            "ai",
            "innovation",
            "hackathon",
            "data",
        ][..],
    );
    table.insert(
        "arts & culture",
        &[
            "art", "arts", "culture", "museum", "gallery", "painting", "theater", "theatre",
            "design", "creative", "exhibition",
        ][..],
    );
    table.insert(
        "health & wellness",
        &[
            "health",
            "wellness",
            "fitness",
            "yoga",
            "meditation",
            "mindfulness",
            "running",
            "nutrition",
            "mental health",
        ][..],
    );
    table.insert(
        "food & drink",
        &[
            "food", "drink", "cooking", "baking", "wine", "beer", "coffee", "restaurant",
            "tasting", "cuisine",
        ][..],
    );
    table.insert(
        "music",
        &[
            "music", "concert", "band", "dj", "jazz", "rock", "classical", "live music",
            "festival", "vinyl",
        ][..],
    );
    table.insert(
        "sports & recreation",
        &[
            "sports", "soccer", "football", "basketball", "tennis", "cycling", "hiking",
            "climbing", "swimming", "outdoor",
        ][..],
    );
    table.insert(
        "business & networking",
        &[
            "business",
            "networking",
            "entrepreneur",
            "finance",
            "marketing",
            "career",
            "leadership",
            "mentorship",
        ][..],
    );
    table.insert(
        "education & learning",
        &[
            "education", "learning", "workshop", "lecture", "course", "book", "language",
            "science", "study",
        ][..],
    );
    table.insert(
        "gaming",
        &[
            "gaming", "games", "esports", "board games", "tabletop", "video games", "rpg",
        ][..],
    );
    table.insert(
        "travel & adventure",
        &[
            "travel",
            "adventure",
            "backpacking",
            "camping",
            "road trip",
            "exploration",
            "tourism",
        ][..],
    );
    table.insert(
        "community & volunteering",
        &[
            "community",
            "volunteering",
            "volunteer",
            "charity",
            "nonprofit",
            "activism",
            "environment",
        ][..],
    );
    table.insert(
        "family & parenting",
        &[
            "family", "parenting", "kids", "children", "parents", "playdate",
        ][..],
    );
    table
});

/// Case-insensitive lookup of the expansion list for an interest label.
pub fn keywords_for(interest: &str) -> Option<&'static [&'static str]> {
    INTEREST_KEYWORDS
        .get(interest.to_lowercase().trim())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert!(keywords_for("Tech & Innovation").is_some());
        assert!(keywords_for("TECH & INNOVATION").is_some());
        assert!(keywords_for("underwater basket weaving").is_none());
    }

    #[test]
    fn test_tech_expansion_contains_core_terms() {
        let kws = keywords_for("tech & innovation").unwrap();
        assert!(kws.contains(&"technology"));
        assert!(kws.contains(&"ai"));
    }
}
