//! Continuous-time well-being stats.
//!
//! The [`StatSimulator`] owns the pet's hunger, cleanliness and mood and
//! applies three kinds of change to them:
//!
//! - Scheduled decay, driven by [`StatSimulator::update`] over two cadences
//!   (hunger every hunger period, mood every mood period)
//! - Raw activity, which slowly dirties the pet
//! - Care actions (`feed`, `clean`, `play`)
//!
//! Every value is clamped to `[0, 100]` after every mutation. Nothing in
//! this module can fail.

use chrono::{DateTime, TimeDelta, Utc};
use meowchi_types::{
    CareReceipt, CareSample, InteractionKind, MoodClass, PetStateSection, STARTING_STAT,
    StatSnapshot,
};
use tracing::debug;

use crate::cadence::Cadence;
use crate::config::StatsConfig;

/// Upper bound of every stat.
pub const STAT_MAX: f64 = 100.0;

/// Stats below this value flag the pet as needing attention.
pub const ATTENTION_THRESHOLD: f64 = 30.0;

const FEED_HUNGER: f64 = 25.0;
const FEED_MOOD: f64 = 5.0;
const CLEAN_CLEANLINESS: f64 = 30.0;
const CLEAN_MOOD: f64 = 3.0;
const PLAY_MOOD: f64 = 20.0;
const PLAY_HUNGER: f64 = 3.0;
const PLAY_CLEANLINESS: f64 = 5.0;

/// Mood changes smaller than this are not worth publishing.
const MOOD_CHANGE_EPSILON: f64 = 1e-9;

/// Clamp a stat into `[0, 100]`, mapping NaN to 0.
pub fn clamp_stat(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, STAT_MAX)
    }
}

/// Round a stat for presentation.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_stat(value: f64) -> u8 {
    // Clamped to [0, 100] first, so the cast is exact.
    clamp_stat(value).round() as u8
}

/// The three well-being stats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatSet {
    /// Fullness, 0 (starving) to 100 (full).
    pub hunger: f64,
    /// Cleanliness, 0 (filthy) to 100 (spotless).
    pub cleanliness: f64,
    /// Mood, 0 (miserable) to 100 (delighted).
    pub mood: f64,
}

impl Default for StatSet {
    fn default() -> Self {
        Self {
            hunger: STARTING_STAT,
            cleanliness: STARTING_STAT,
            mood: STARTING_STAT,
        }
    }
}

impl StatSet {
    /// Unweighted mean of the three stats.
    pub fn care_score(&self) -> f64 {
        (self.hunger + self.cleanliness + self.mood) / 3.0
    }

    /// Care sample for these stats taken at `timestamp`.
    pub fn sample(&self, timestamp: DateTime<Utc>) -> CareSample {
        CareSample {
            timestamp,
            score: self.care_score(),
            hunger: self.hunger,
            cleanliness: self.cleanliness,
            mood: self.mood,
        }
    }

    /// Highest-priority mood classification.
    pub fn mood_class(&self) -> MoodClass {
        if self.hunger < 20.0 {
            MoodClass::Starving
        } else if self.cleanliness < 20.0 {
            MoodClass::Dirty
        } else if self.mood < 20.0 {
            MoodClass::Sad
        } else if self.hunger < 50.0 {
            MoodClass::Hungry
        } else if self.cleanliness < 50.0 {
            MoodClass::Grubby
        } else if self.mood < 50.0 {
            MoodClass::Bored
        } else if self.mood >= 80.0 {
            MoodClass::Happy
        } else {
            MoodClass::Neutral
        }
    }

    /// Face shown for the overall state.
    pub fn mood_emoji(&self) -> &'static str {
        if self.mood >= 80.0 && self.hunger >= 60.0 && self.cleanliness >= 60.0 {
            "😺"
        } else if self.mood >= 60.0 {
            "😸"
        } else if self.hunger < ATTENTION_THRESHOLD {
            "😿"
        } else if self.cleanliness < ATTENTION_THRESHOLD {
            "🤢"
        } else if self.mood < ATTENTION_THRESHOLD {
            "😾"
        } else {
            "😼"
        }
    }

    /// True when any stat is below [`ATTENTION_THRESHOLD`].
    pub fn needs_attention(&self) -> bool {
        self.hunger < ATTENTION_THRESHOLD
            || self.cleanliness < ATTENTION_THRESHOLD
            || self.mood < ATTENTION_THRESHOLD
    }

    fn clamp(&mut self) {
        self.hunger = clamp_stat(self.hunger);
        self.cleanliness = clamp_stat(self.cleanliness);
        self.mood = clamp_stat(self.mood);
    }
}

/// Owns the pet's stats and care timestamps.
#[derive(Debug, Clone)]
pub struct StatSimulator {
    config: StatsConfig,
    stats: StatSet,
    last_fed: DateTime<Utc>,
    last_cleaned: DateTime<Utc>,
    last_played: DateTime<Utc>,
    activity_count: u64,
    hunger_cadence: Cadence,
    mood_cadence: Cadence,
}

impl StatSimulator {
    /// A fresh pet at the starting stats, cared for at `now`.
    pub fn new(config: StatsConfig, now: DateTime<Utc>) -> Self {
        let hunger_cadence = Cadence::new(config.hunger_period(), now);
        let mood_cadence = Cadence::new(config.mood_period(), now);
        Self {
            config,
            stats: StatSet::default(),
            last_fed: now,
            last_cleaned: now,
            last_played: now,
            activity_count: 0,
            hunger_cadence,
            mood_cadence,
        }
    }

    /// Replace the state with a persisted section. Cadences restart at `now`.
    pub fn restore(&mut self, section: &PetStateSection, now: DateTime<Utc>) {
        self.stats = StatSet {
            hunger: section.hunger,
            cleanliness: section.cleanliness,
            mood: section.mood,
        };
        self.stats.clamp();
        self.last_fed = section.last_fed;
        self.last_cleaned = section.last_cleaned;
        self.last_played = section.last_played;
        self.activity_count = 0;
        self.hunger_cadence.reset(now);
        self.mood_cadence.reset(now);
    }

    /// Projection into the persisted section.
    pub const fn pet_state(&self) -> PetStateSection {
        PetStateSection {
            hunger: self.stats.hunger,
            cleanliness: self.stats.cleanliness,
            mood: self.stats.mood,
            last_fed: self.last_fed,
            last_cleaned: self.last_cleaned,
            last_played: self.last_played,
        }
    }

    /// Current raw stats.
    pub const fn stats(&self) -> StatSet {
        self.stats
    }

    /// The tunables in effect.
    pub const fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Run every decay step that is due at `now`.
    ///
    /// Returns one snapshot per step that changed the stats, in the order
    /// the steps were applied (hunger steps first).
    pub fn update(&mut self, now: DateTime<Utc>) -> Vec<StatSnapshot> {
        let mut published = Vec::new();
        for _ in 0..self.hunger_cadence.due(now) {
            published.push(self.apply_hunger_decay());
        }
        for _ in 0..self.mood_cadence.due(now) {
            if let Some(snapshot) = self.apply_mood_decay(now) {
                published.push(snapshot);
            }
        }
        published
    }

    /// One hunger step: lose hunger, then drift mood toward its target.
    pub fn apply_hunger_decay(&mut self) -> StatSnapshot {
        self.stats.hunger = clamp_stat(self.stats.hunger - self.config.hunger_decay);
        self.drift_mood();
        debug!(hunger = self.stats.hunger, mood = self.stats.mood, "hunger decayed");
        self.snapshot()
    }

    /// One mood step at `now`.
    ///
    /// A neglected pet loses mood outright; otherwise mood drifts toward its
    /// target. Returns a snapshot only when mood actually changed.
    pub fn apply_mood_decay(&mut self, now: DateTime<Utc>) -> Option<StatSnapshot> {
        let before = self.stats.mood;
        if self.is_neglected(now) {
            self.stats.mood = clamp_stat(self.stats.mood - self.config.mood_decay);
            debug!(mood = self.stats.mood, "pet feels neglected");
        } else {
            self.drift_mood();
        }
        ((self.stats.mood - before).abs() > MOOD_CHANGE_EPSILON).then(|| self.snapshot())
    }

    /// Register one raw input event.
    ///
    /// Every call dirties the pet slightly. Every n-th call (100 by default)
    /// also drifts mood and returns a snapshot to publish.
    pub fn record_activity(&mut self) -> Option<StatSnapshot> {
        self.activity_count = self.activity_count.saturating_add(1);
        self.stats.cleanliness = clamp_stat(self.stats.cleanliness - self.config.activity_dirt);

        let every = self.config.activity_publish_every.max(1);
        if self.activity_count.checked_rem(every) == Some(0) {
            self.drift_mood();
            Some(self.snapshot())
        } else {
            None
        }
    }

    /// Feed the pet.
    pub fn feed(&mut self, now: DateTime<Utc>) -> CareReceipt {
        self.stats.hunger = clamp_stat(self.stats.hunger + FEED_HUNGER);
        self.stats.mood = clamp_stat(self.stats.mood + FEED_MOOD);
        self.last_fed = now;
        CareReceipt {
            interaction: InteractionKind::Feed,
            message: "Yum! That was delicious! 😋".to_owned(),
            new_value: round_stat(self.stats.hunger),
        }
    }

    /// Clean the pet.
    pub fn clean(&mut self, now: DateTime<Utc>) -> CareReceipt {
        self.stats.cleanliness = clamp_stat(self.stats.cleanliness + CLEAN_CLEANLINESS);
        self.stats.mood = clamp_stat(self.stats.mood + CLEAN_MOOD);
        self.last_cleaned = now;
        CareReceipt {
            interaction: InteractionKind::Clean,
            message: "Ahh, much better! So fresh and clean! 🧼".to_owned(),
            new_value: round_stat(self.stats.cleanliness),
        }
    }

    /// Play with the pet. Raises mood but costs a little hunger and cleanliness.
    pub fn play(&mut self, now: DateTime<Utc>) -> CareReceipt {
        self.stats.mood = clamp_stat(self.stats.mood + PLAY_MOOD);
        self.stats.hunger = clamp_stat(self.stats.hunger - PLAY_HUNGER);
        self.stats.cleanliness = clamp_stat(self.stats.cleanliness - PLAY_CLEANLINESS);
        self.last_played = now;
        CareReceipt {
            interaction: InteractionKind::Play,
            message: "Wheee! That was fun! Let's play again! 🎉".to_owned(),
            new_value: round_stat(self.stats.mood),
        }
    }

    /// Dispatch a care action by kind.
    pub fn care(&mut self, kind: InteractionKind, now: DateTime<Utc>) -> CareReceipt {
        match kind {
            InteractionKind::Feed => self.feed(now),
            InteractionKind::Clean => self.clean(now),
            InteractionKind::Play => self.play(now),
        }
    }

    /// Rounded, presentation-ready view of the current state.
    pub fn snapshot(&self) -> StatSnapshot {
        let mood_class = self.stats.mood_class();
        StatSnapshot {
            hunger: round_stat(self.stats.hunger),
            cleanliness: round_stat(self.stats.cleanliness),
            mood: round_stat(self.stats.mood),
            last_fed: self.last_fed,
            last_cleaned: self.last_cleaned,
            last_played: self.last_played,
            mood_class,
            mood_emoji: self.stats.mood_emoji().to_owned(),
            status: mood_class.status_message().to_owned(),
            needs_attention: self.stats.needs_attention(),
        }
    }

    /// Target mood: `0.5 * hunger + 0.3 * cleanliness + 0.2 * mood`.
    pub fn mood_target(&self) -> f64 {
        0.5f64.mul_add(
            self.stats.hunger,
            0.3f64.mul_add(self.stats.cleanliness, 0.2 * self.stats.mood),
        )
    }

    fn drift_mood(&mut self) {
        let step = self.config.mood_drift_step.abs();
        let delta = (self.mood_target() - self.stats.mood).clamp(-step, step);
        self.stats.mood = clamp_stat(self.stats.mood + delta);
    }

    fn is_neglected(&self, now: DateTime<Utc>) -> bool {
        let since = |then: DateTime<Utc>| now.signed_duration_since(then);
        let over = |elapsed: TimeDelta, periods: u32| elapsed > self.config.neglect_after(periods);

        over(since(self.last_fed), self.config.fed_neglect_periods)
            || over(since(self.last_cleaned), self.config.cleaned_neglect_periods)
            || over(since(self.last_played), self.config.played_neglect_periods)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn sim() -> StatSimulator {
        StatSimulator::new(StatsConfig::default(), at(0))
    }

    fn with_stats(hunger: f64, cleanliness: f64, mood: f64) -> StatSimulator {
        let mut sim = sim();
        let mut section = sim.pet_state();
        section.hunger = hunger;
        section.cleanliness = cleanliness;
        section.mood = mood;
        sim.restore(&section, at(0));
        sim
    }

    #[test]
    fn hunger_decays_after_one_period() {
        let mut sim = sim();
        assert!(sim.update(at(20 * 60 - 1)).is_empty());

        // Hunger steps are applied before mood steps.
        let published = sim.update(at(20 * 60));
        assert_eq!(published.first().unwrap().hunger, 75);
    }

    #[test]
    fn hunger_clamps_at_zero() {
        let mut sim = with_stats(3.0, 80.0, 80.0);
        let snapshot = sim.apply_hunger_decay();
        assert_eq!(snapshot.hunger, 0);
        assert!(sim.stats().hunger.abs() < f64::EPSILON);
    }

    #[test]
    fn hunger_step_drifts_mood_by_at_most_two() {
        let mut sim = with_stats(10.0, 10.0, 90.0);
        sim.apply_hunger_decay();
        assert!((sim.stats().mood - 88.0).abs() < 1e-9);
    }

    #[test]
    fn neglect_decays_mood() {
        let mut sim = sim();
        // Not fed for 41 minutes (more than two hunger periods).
        let snapshot = sim.apply_mood_decay(at(41 * 60)).unwrap();
        assert_eq!(snapshot.mood, 77);
    }

    #[test]
    fn cared_for_pet_drifts_toward_target() {
        let mut sim = with_stats(100.0, 100.0, 50.0);
        // Target is 0.5*100 + 0.3*100 + 0.2*50 = 90, so mood rises by 2.
        let snapshot = sim.apply_mood_decay(at(60)).unwrap();
        assert_eq!(snapshot.mood, 52);
    }

    #[test]
    fn mood_at_target_publishes_nothing() {
        let mut sim = with_stats(50.0, 50.0, 50.0);
        assert!(sim.apply_mood_decay(at(60)).is_none());
    }

    #[test]
    fn activity_publishes_every_hundredth_call() {
        let mut sim = sim();
        for _ in 0..99 {
            assert!(sim.record_activity().is_none());
        }
        let snapshot = sim.record_activity().unwrap();
        // 100 * 0.1 cleanliness lost.
        assert_eq!(snapshot.cleanliness, 70);
    }

    #[test]
    fn care_actions_apply_bonuses_and_timestamps() {
        let mut sim = with_stats(50.0, 50.0, 50.0);

        let fed = sim.feed(at(5));
        assert_eq!(fed.new_value, 75);
        assert_eq!(sim.snapshot().last_fed, at(5));

        let cleaned = sim.clean(at(6));
        assert_eq!(cleaned.new_value, 80);

        let played = sim.play(at(7));
        assert_eq!(played.new_value, 78);
        let stats = sim.stats();
        assert!((stats.hunger - 72.0).abs() < 1e-9);
        assert!((stats.cleanliness - 75.0).abs() < 1e-9);
        assert_eq!(sim.snapshot().last_played, at(7));
    }

    #[test]
    fn care_clamps_at_one_hundred() {
        let mut sim = with_stats(95.0, 95.0, 99.0);
        assert_eq!(sim.feed(at(1)).new_value, 100);
        assert_eq!(sim.clean(at(1)).new_value, 100);
        assert_eq!(sim.snapshot().mood, 100);
    }

    #[test]
    fn mood_class_follows_priority() {
        let cases = [
            ((10.0, 10.0, 10.0), MoodClass::Starving),
            ((60.0, 10.0, 10.0), MoodClass::Dirty),
            ((60.0, 60.0, 10.0), MoodClass::Sad),
            ((40.0, 40.0, 40.0), MoodClass::Hungry),
            ((60.0, 40.0, 40.0), MoodClass::Grubby),
            ((60.0, 60.0, 40.0), MoodClass::Bored),
            ((60.0, 60.0, 85.0), MoodClass::Happy),
            ((60.0, 60.0, 60.0), MoodClass::Neutral),
        ];
        for ((hunger, cleanliness, mood), expected) in cases {
            let set = StatSet { hunger, cleanliness, mood };
            assert_eq!(set.mood_class(), expected, "{hunger}/{cleanliness}/{mood}");
        }
    }

    #[test]
    fn snapshot_is_idempotent() {
        let sim = with_stats(33.3, 66.6, 99.9);
        assert_eq!(sim.snapshot(), sim.snapshot());
        let snapshot = sim.snapshot();
        assert_eq!((snapshot.hunger, snapshot.cleanliness, snapshot.mood), (33, 67, 100));
        assert!(!snapshot.needs_attention);
    }

    #[test]
    fn restore_clamps_out_of_range_values() {
        let sim = with_stats(-5.0, 250.0, f64::NAN);
        let stats = sim.stats();
        assert!(stats.hunger.abs() < f64::EPSILON);
        assert!((stats.cleanliness - STAT_MAX).abs() < f64::EPSILON);
        assert!(stats.mood.abs() < f64::EPSILON);
        assert!(sim.snapshot().needs_attention);
    }
}
