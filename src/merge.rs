//! Merge/dedup stage: combine per-algorithm score lists into one entry per
//! candidate.
//!
//! On collision the scores are averaged weighted by confidence, confidence
//! takes the max of the two sides, reasons are concatenated verbatim (a
//! candidate scored by three algorithms carries three reason entries), and
//! the method collapses to `hybrid` once two different origins meet.

use std::collections::HashMap;

use crate::model::{Method, RecommendationScore};

/// Multiply every score in a list by its algorithm's adjusted weight.
/// Applied in place before the lists enter the merge.
pub fn scale_scores(scores: &mut [RecommendationScore], weight: f64) {
    for entry in scores.iter_mut() {
        entry.score *= weight;
    }
}

pub fn merge_scores(score_lists: Vec<Vec<RecommendationScore>>) -> Vec<RecommendationScore> {
    let mut merged: HashMap<String, RecommendationScore> = HashMap::new();
    for list in score_lists {
        for mut incoming in list {
            match merged.get_mut(&incoming.candidate_id) {
                Some(existing) => {
                    let weight_sum = existing.confidence + incoming.confidence;
                    existing.score = if weight_sum > 0.0 {
                        (existing.score * existing.confidence
                            + incoming.score * incoming.confidence)
                            / weight_sum
                    } else {
                        (existing.score + incoming.score) / 2.0
                    };
                    existing.confidence = existing.confidence.max(incoming.confidence);
                    existing.reasons.append(&mut incoming.reasons);
                    if existing.method != incoming.method {
                        existing.method = Method::Hybrid;
                    }
                }
                None => {
                    merged.insert(incoming.candidate_id.clone(), incoming);
                }
            }
        }
    }
    merged.into_values().collect()
}
