//! Tunables for the stat simulation and the evolution engine.
//!
//! Both structs deserialize from the `stats` and `evolution` sections of
//! `meowchi.yaml`. Every field has a default, so a partial section (or no
//! section at all) yields the production values. [`StatsConfig::test_mode`]
//! and [`EvolutionConfig::test_mode`] shorten the periods for development.

use chrono::TimeDelta;
use serde::Deserialize;

/// Convert a millisecond count to a [`TimeDelta`], saturating at the maximum.
pub fn millis(ms: u64) -> TimeDelta {
    i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX)
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Configuration for the stat simulator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Hunger removed on every hunger period (default: 5).
    pub hunger_decay: f64,

    /// Hunger decay period in milliseconds (default: 20 minutes).
    pub hunger_period_ms: u64,

    /// Mood removed when neglect is detected (default: 3).
    pub mood_decay: f64,

    /// Mood decay period in milliseconds (default: 10 minutes).
    pub mood_period_ms: u64,

    /// Largest mood change a single drift step may apply (default: 2).
    pub mood_drift_step: f64,

    /// Cleanliness lost per recorded activity (default: 0.1).
    pub activity_dirt: f64,

    /// Every n-th recorded activity recomputes mood and publishes (default: 100).
    pub activity_publish_every: u64,

    /// Hunger periods without feeding before the pet feels neglected (default: 2).
    pub fed_neglect_periods: u32,

    /// Hunger periods without cleaning before the pet feels neglected (default: 3).
    pub cleaned_neglect_periods: u32,

    /// Hunger periods without play before the pet feels neglected (default: 2).
    pub played_neglect_periods: u32,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            hunger_decay: 5.0,
            hunger_period_ms: 20 * 60_000,
            mood_decay: 3.0,
            mood_period_ms: 10 * 60_000,
            mood_drift_step: 2.0,
            activity_dirt: 0.1,
            activity_publish_every: 100,
            fed_neglect_periods: 2,
            cleaned_neglect_periods: 3,
            played_neglect_periods: 2,
        }
    }
}

impl StatsConfig {
    /// Production values with the short development periods
    /// (hunger every minute, mood every 30 seconds).
    pub fn test_mode() -> Self {
        Self::default().with_test_periods()
    }

    /// Replace the periods with their development values, keeping the rest.
    #[must_use]
    pub const fn with_test_periods(mut self) -> Self {
        self.hunger_period_ms = 60_000;
        self.mood_period_ms = 30_000;
        self
    }

    /// Hunger decay period.
    pub fn hunger_period(&self) -> TimeDelta {
        millis(self.hunger_period_ms)
    }

    /// Mood decay period.
    pub fn mood_period(&self) -> TimeDelta {
        millis(self.mood_period_ms)
    }

    /// Neglect threshold expressed as a multiple of the hunger period.
    pub fn neglect_after(&self, periods: u32) -> TimeDelta {
        millis(self.hunger_period_ms.saturating_mul(u64::from(periods)))
    }
}

// ---------------------------------------------------------------------------
// Evolution
// ---------------------------------------------------------------------------

/// How the daily care classifications (perfect, balanced) are counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayClassification {
    /// Classify on every ingested sample once enough history exists.
    #[default]
    PerSample,
    /// Classify at most once per UTC calendar day.
    PerDay,
}

/// Configuration for the evolution engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Evaluation period in milliseconds (default: 5 minutes).
    pub evaluation_period_ms: u64,

    /// Maximum age of retained care samples in milliseconds (default: 24 hours).
    pub history_window_ms: u64,

    /// Window used for the average-care requirement in milliseconds (default: 1 hour).
    pub average_window_ms: u64,

    /// Maximum number of retained care samples (default: 2048).
    pub history_capacity: usize,

    /// Care score below which a sample may count as neglect (default: 30).
    pub neglect_score: f64,

    /// Idle time after which a low sample counts as neglect, in milliseconds
    /// (default: 30 minutes).
    pub neglect_idle_ms: u64,

    /// Samples required before days are classified (default: 20).
    pub day_sample_minimum: usize,

    /// Daily average above which a day counts as perfect (default: 85).
    pub perfect_day_above: f64,

    /// Lower exclusive bound of a balanced day (default: 45).
    pub balanced_day_above: f64,

    /// Upper exclusive bound of a balanced day (default: 75).
    pub balanced_day_below: f64,

    /// Play actions while hunger or cleanliness is below this count as chaos
    /// (default: 30).
    pub chaos_stat_below: f64,

    /// Counting mode for perfect and balanced days.
    pub day_classification: DayClassification,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            evaluation_period_ms: 5 * 60_000,
            history_window_ms: 24 * 60 * 60_000,
            average_window_ms: 60 * 60_000,
            history_capacity: 2048,
            neglect_score: 30.0,
            neglect_idle_ms: 30 * 60_000,
            day_sample_minimum: 20,
            perfect_day_above: 85.0,
            balanced_day_above: 45.0,
            balanced_day_below: 75.0,
            chaos_stat_below: 30.0,
            day_classification: DayClassification::PerSample,
        }
    }
}

impl EvolutionConfig {
    /// Production values with a 30-second evaluation period.
    pub fn test_mode() -> Self {
        Self::default().with_test_periods()
    }

    /// Replace the evaluation period with its development value.
    #[must_use]
    pub const fn with_test_periods(mut self) -> Self {
        self.evaluation_period_ms = 30_000;
        self
    }

    /// Evaluation period.
    pub fn evaluation_period(&self) -> TimeDelta {
        millis(self.evaluation_period_ms)
    }

    /// Care history retention window.
    pub fn history_window(&self) -> TimeDelta {
        millis(self.history_window_ms)
    }

    /// Average-care window.
    pub fn average_window(&self) -> TimeDelta {
        millis(self.average_window_ms)
    }

    /// Idle threshold for neglect detection.
    pub fn neglect_idle(&self) -> TimeDelta {
        millis(self.neglect_idle_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_values() {
        let cfg = StatsConfig::default();
        assert_eq!(cfg.hunger_period(), TimeDelta::minutes(20));
        assert_eq!(cfg.mood_period(), TimeDelta::minutes(10));
        assert_eq!(cfg.neglect_after(cfg.fed_neglect_periods), TimeDelta::minutes(40));
        assert_eq!(cfg.neglect_after(cfg.cleaned_neglect_periods), TimeDelta::minutes(60));
        assert_eq!(cfg.activity_publish_every, 100);
    }

    #[test]
    fn test_mode_only_shortens_periods() {
        let cfg = StatsConfig::test_mode();
        assert_eq!(cfg.hunger_period(), TimeDelta::minutes(1));
        assert_eq!(cfg.mood_period(), TimeDelta::seconds(30));
        assert!((cfg.hunger_decay - 5.0).abs() < f64::EPSILON);

        let evo = EvolutionConfig::test_mode();
        assert_eq!(evo.evaluation_period(), TimeDelta::seconds(30));
        assert_eq!(evo.history_window(), TimeDelta::hours(24));
    }

    #[test]
    fn millis_saturates_on_huge_values() {
        assert_eq!(millis(u64::MAX), TimeDelta::MAX);
        assert_eq!(millis(1_500), TimeDelta::milliseconds(1_500));
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: EvolutionConfig =
            serde_json::from_str(r#"{"history_capacity": 10, "day_classification": "per_day"}"#)
                .unwrap();
        assert_eq!(cfg.history_capacity, 10);
        assert_eq!(cfg.day_classification, DayClassification::PerDay);
        assert_eq!(cfg.day_sample_minimum, 20);
    }
}
