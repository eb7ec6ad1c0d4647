//! Performance and quality instrumentation for recommendation calls.

use std::time::Instant;

/// Performance timer for tracking operation duration.
pub struct PerformanceTimer {
    start: Instant,
    label: String,
}

impl PerformanceTimer {
    pub fn new(label: &str) -> Self {
        Self {
            start: Instant::now(),
            label: label.to_string(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn log_if_slow(&self, threshold_ms: u64) {
        let elapsed = self.elapsed_ms();
        if elapsed > threshold_ms {
            tracing::warn!(
                "Slow operation: {} took {}ms (threshold: {}ms)",
                self.label,
                elapsed,
                threshold_ms
            );
        }
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        tracing::debug!("{} completed in {}ms", self.label, self.elapsed_ms());
    }
}

/// Recommendation quality helpers.
pub struct QualityAnalyzer;

impl QualityAnalyzer {
    /// Diversity of a final community list: distinct categories over length.
    pub fn community_diversity(unique_categories: usize, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        unique_categories as f64 / total as f64
    }

    /// Diversity of a final event list: the mean of category spread and
    /// host-community spread.
    pub fn event_diversity(
        unique_categories: usize,
        unique_communities: usize,
        total: usize,
    ) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let category_spread = unique_categories as f64 / total as f64;
        let community_spread = unique_communities as f64 / total as f64;
        (category_spread + community_spread) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_diversity_bounds() {
        assert_eq!(QualityAnalyzer::community_diversity(0, 0), 0.0);
        assert_eq!(QualityAnalyzer::community_diversity(10, 10), 1.0);
        assert_eq!(QualityAnalyzer::community_diversity(2, 10), 0.2);
    }

    #[test]
    fn test_event_diversity_averages_both_axes() {
        // All unique categories, all from one community.
        let score = QualityAnalyzer::event_diversity(10, 1, 10);
        assert!((score - 0.55).abs() < 1e-9);
        assert_eq!(QualityAnalyzer::event_diversity(5, 5, 5), 1.0);
    }

    #[test]
    fn test_timer_measures_elapsed() {
        let timer = PerformanceTimer::new("test");
        assert!(timer.elapsed_ms() < 1_000);
    }
}
