//! The evolution state machine.
//!
//! The [`EvolutionEngine`] keeps a rolling history of care samples and a set
//! of behavior counters, and periodically tests the next-tier forms of the
//! catalog against them. The first candidate (in catalog order) whose every
//! requirement holds becomes the new form.
//!
//! # Rolling statistics
//!
//! - Care samples older than the history window (24 hours) are pruned on
//!   every ingest, and the history is capped at a fixed number of entries.
//! - The average-care requirement looks at the trailing hour only. An empty
//!   window counts as an average of 50.
//! - Once enough samples exist, each ingest also classifies the day as
//!   perfect (average above 85) or balanced (strictly between 45 and 75).

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use meowchi_types::{
    CandidateProgress, CareSample, EvolutionJournal, EvolutionSection, EvolutionStatus,
    EvolutionTriggered, InteractionKind, RequirementProgress,
};
use tracing::{debug, info, warn};

use crate::cadence::Cadence;
use crate::catalog::{EvolutionForm, FORMS, Requirement, base_form, find_form};
use crate::config::{DayClassification, EvolutionConfig, millis};
use crate::stats::StatSet;

/// Average reported when no sample falls in the window.
pub const EMPTY_WINDOW_AVERAGE: u64 = 50;

/// A completed move from one form to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionTransition {
    /// Form before the transition.
    pub old: &'static EvolutionForm,
    /// Form after the transition.
    pub new: &'static EvolutionForm,
    /// Announcement text.
    pub message: String,
}

impl EvolutionTransition {
    fn between(old: &'static EvolutionForm, new: &'static EvolutionForm) -> Self {
        Self {
            old,
            new,
            message: format!("{} is evolving into {}!", old.name, new.name),
        }
    }

    /// Notification payload for subscribers.
    pub fn event(&self) -> EvolutionTriggered {
        EvolutionTriggered {
            old_form: self.old.view(),
            new_form: self.new.view(),
            message: self.message.clone(),
        }
    }
}

/// Evolution progress, rolling care history, and behavior counters.
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    config: EvolutionConfig,
    current: &'static EvolutionForm,
    history: Vec<&'static EvolutionForm>,
    care_history: VecDeque<CareSample>,
    total_interactions: u64,
    neglect_periods: u64,
    chaos_actions: u64,
    perfect_care_days: u64,
    balanced_days: u64,
    last_activity: DateTime<Utc>,
    evolved_at: DateTime<Utc>,
    session_started_at: DateTime<Utc>,
    prior_playtime: TimeDelta,
    last_classified_day: Option<NaiveDate>,
    cadence: Cadence,
}

impl EvolutionEngine {
    /// A fresh engine in the base form, with the session starting at `now`.
    pub fn new(config: EvolutionConfig, now: DateTime<Utc>) -> Self {
        let cadence = Cadence::new(config.evaluation_period(), now);
        let base = base_form();
        Self {
            config,
            current: base,
            history: vec![base],
            care_history: VecDeque::new(),
            total_interactions: 0,
            neglect_periods: 0,
            chaos_actions: 0,
            perfect_care_days: 0,
            balanced_days: 0,
            last_activity: now,
            evolved_at: now,
            session_started_at: now,
            prior_playtime: TimeDelta::zero(),
            last_classified_day: None,
            cadence,
        }
    }

    /// Replace the state with a persisted section.
    ///
    /// `prior_playtime_ms` is the playtime accumulated by earlier sessions;
    /// the current session starts at `now`. Unknown form identifiers are
    /// dropped, and an unknown current form falls back to the base form.
    pub fn restore(&mut self, section: &EvolutionSection, prior_playtime_ms: u64, now: DateTime<Utc>) {
        self.current = find_form(&section.current_form).unwrap_or_else(|| {
            warn!(form = %section.current_form, "unknown evolution form in save, using base form");
            base_form()
        });

        self.history = section
            .evolution_history
            .iter()
            .filter_map(|id| find_form(id))
            .collect();
        if self.history.last().map(|form| form.id) != Some(self.current.id) {
            self.history.push(self.current);
        }

        self.total_interactions = section.total_interactions;
        self.neglect_periods = section.neglect_periods;
        self.chaos_actions = section.chaos_actions;
        self.perfect_care_days = section.perfect_care_days;
        self.balanced_days = section.balanced_days;

        self.care_history = section.care_history.iter().cloned().collect();
        self.prune(now);

        self.prior_playtime = millis(prior_playtime_ms);
        self.session_started_at = now;
        self.evolved_at = now;
        self.last_activity = now;
        self.last_classified_day = None;
        self.cadence.reset(now);
    }

    /// Projection into the persisted section (full care history).
    pub fn persisted(&self) -> EvolutionSection {
        EvolutionSection {
            current_form: self.current.id.to_owned(),
            evolution_history: self.history.iter().map(|form| form.id.to_owned()).collect(),
            total_interactions: self.total_interactions,
            neglect_periods: self.neglect_periods,
            chaos_actions: self.chaos_actions,
            perfect_care_days: self.perfect_care_days,
            balanced_days: self.balanced_days,
            care_history: self.care_history.iter().cloned().collect(),
        }
    }

    /// The form the pet is in.
    pub const fn current(&self) -> &'static EvolutionForm {
        self.current
    }

    /// Every form held, oldest first. The last entry is [`Self::current`].
    pub fn history(&self) -> &[&'static EvolutionForm] {
        &self.history
    }

    /// The retained care samples, oldest first.
    pub const fn care_history(&self) -> &VecDeque<CareSample> {
        &self.care_history
    }

    /// Care interactions performed.
    pub const fn total_interactions(&self) -> u64 {
        self.total_interactions
    }

    /// Detected neglect periods.
    pub const fn neglect_periods(&self) -> u64 {
        self.neglect_periods
    }

    /// Play actions performed while the pet was hungry or dirty.
    pub const fn chaos_actions(&self) -> u64 {
        self.chaos_actions
    }

    /// Perfect-care day classifications.
    pub const fn perfect_care_days(&self) -> u64 {
        self.perfect_care_days
    }

    /// Balanced day classifications.
    pub const fn balanced_days(&self) -> u64 {
        self.balanced_days
    }

    /// Total playtime: earlier sessions plus the current one.
    pub fn playtime(&self, now: DateTime<Utc>) -> TimeDelta {
        let session = now
            .signed_duration_since(self.session_started_at)
            .max(TimeDelta::zero());
        self.prior_playtime.checked_add(&session).unwrap_or(TimeDelta::MAX)
    }

    /// Total playtime in milliseconds.
    pub fn playtime_ms(&self, now: DateTime<Utc>) -> u64 {
        delta_ms(self.playtime(now))
    }

    /// Append a care sample for `stats` and update the derived counters.
    pub fn ingest_care_sample(&mut self, stats: &StatSet, now: DateTime<Utc>) {
        let sample = stats.sample(now);
        let score = sample.score;
        self.care_history.push_back(sample);
        self.prune(now);

        let idle = now.signed_duration_since(self.last_activity);
        if score < self.config.neglect_score && idle > self.config.neglect_idle() {
            self.neglect_periods = self.neglect_periods.saturating_add(1);
            debug!(score, neglect_periods = self.neglect_periods, "neglect period detected");
        }

        if self.care_history.len() >= self.config.day_sample_minimum {
            self.classify_day(now);
        }
    }

    /// Count a care interaction. Playing with a hungry or dirty pet is chaos.
    pub fn track_interaction(&mut self, kind: InteractionKind, stats: &StatSet, now: DateTime<Utc>) {
        self.total_interactions = self.total_interactions.saturating_add(1);
        if kind == InteractionKind::Play
            && (stats.hunger < self.config.chaos_stat_below
                || stats.cleanliness < self.config.chaos_stat_below)
        {
            self.chaos_actions = self.chaos_actions.saturating_add(1);
        }
        self.last_activity = now;
    }

    /// Note raw user activity, which resets the idle timer.
    pub const fn note_activity(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Rounded average care over the trailing `window`, 50 if it is empty.
    pub fn average_care(&self, window: TimeDelta, now: DateTime<Utc>) -> u64 {
        self.mean_score(window, now)
            .map_or(EMPTY_WINDOW_AVERAGE, round_score)
    }

    /// Run [`Self::evaluate`] if the evaluation cadence is due at `now`.
    pub fn update(&mut self, now: DateTime<Utc>) -> Option<EvolutionTransition> {
        if self.cadence.due(now) > 0 {
            self.evaluate(now)
        } else {
            None
        }
    }

    /// Test every next-tier form and take the first that qualifies.
    pub fn evaluate(&mut self, now: DateTime<Utc>) -> Option<EvolutionTransition> {
        let next = self
            .candidates()
            .find(|form| form.requirements.iter().all(|req| self.measure(req, now).met))?;

        let transition = EvolutionTransition::between(self.current, next);
        self.current = next;
        self.history.push(next);
        self.evolved_at = now;
        info!(
            from = transition.old.id,
            to = transition.new.id,
            tier = next.tier,
            "pet evolved"
        );
        Some(transition)
    }

    /// Per-requirement progress toward every next-tier form.
    pub fn progress(&self, now: DateTime<Utc>) -> Vec<CandidateProgress> {
        self.candidates()
            .map(|form| CandidateProgress {
                form: form.view(),
                requirements: form
                    .requirements
                    .iter()
                    .map(|req| {
                        let measured = self.measure(req, now);
                        RequirementProgress {
                            requirement: req.name().to_owned(),
                            current: measured.current,
                            required: measured.required,
                            percentage: percentage(measured.current, measured.required),
                        }
                    })
                    .collect(),
            })
            .collect()
    }

    /// Where the pet stands in the tree at `now`.
    pub fn state(&self, now: DateTime<Utc>) -> EvolutionStatus {
        EvolutionStatus {
            current: self.current.view(),
            tier: self.current.tier,
            avg_care: self.average_care(self.config.average_window(), now),
            total_playtime_ms: self.playtime_ms(now),
            total_interactions: self.total_interactions,
            evolution_age_ms: delta_ms(now.signed_duration_since(self.evolved_at)),
            possible_evolutions: self.progress(now),
        }
    }

    /// The evolution journal.
    pub fn journal(&self) -> EvolutionJournal {
        EvolutionJournal {
            history: self.history.iter().map(|form| form.view()).collect(),
            total_evolutions: u32::try_from(self.history.len().saturating_sub(1))
                .unwrap_or(u32::MAX),
            current_form: self.current.view(),
            started_at: self.session_started_at,
        }
    }

    fn candidates(&self) -> impl Iterator<Item = &'static EvolutionForm> {
        let tier = self.current.tier.saturating_add(1);
        FORMS.iter().filter(move |form| form.tier == tier)
    }

    fn measure(&self, requirement: &Requirement, now: DateTime<Utc>) -> Measured {
        match *requirement {
            Requirement::PreviousForm(id) => {
                let held = self.current.id == id;
                Measured::at_least(u64::from(held), 1)
            }
            Requirement::AverageCare(min) => {
                Measured::at_least(self.average_care(self.config.average_window(), now), min)
            }
            Requirement::Playtime { millis } => Measured::at_least(self.playtime_ms(now), millis),
            Requirement::Interactions(min) => Measured::at_least(self.total_interactions, min),
            Requirement::NeglectPeriods(min) => Measured::at_least(self.neglect_periods, min),
            Requirement::IdleTime { millis } => Measured::at_least(
                delta_ms(now.signed_duration_since(self.last_activity)),
                millis,
            ),
            Requirement::ChaosActions(min) => Measured::at_least(self.chaos_actions, min),
            Requirement::PerfectCareDays(min) => Measured::at_least(self.perfect_care_days, min),
            Requirement::BalancedDays(min) => Measured::at_least(self.balanced_days, min),
        }
    }

    fn mean_score(&self, window: TimeDelta, now: DateTime<Utc>) -> Option<f64> {
        let cutoff = now.checked_sub_signed(window)?;
        let (sum, count) = self
            .care_history
            .iter()
            .filter(|sample| sample.timestamp > cutoff)
            .fold((0.0_f64, 0_u32), |(sum, count), sample| {
                (sum + sample.score, count.saturating_add(1))
            });
        (count > 0).then(|| sum / f64::from(count))
    }

    fn classify_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if self.config.day_classification == DayClassification::PerDay
            && self.last_classified_day == Some(today)
        {
            return;
        }

        let Some(mean) = self.mean_score(self.config.history_window(), now) else {
            return;
        };
        let day_average = mean.round();

        if day_average > self.config.perfect_day_above {
            self.perfect_care_days = self.perfect_care_days.saturating_add(1);
        } else if day_average > self.config.balanced_day_above
            && day_average < self.config.balanced_day_below
        {
            self.balanced_days = self.balanced_days.saturating_add(1);
        } else {
            return;
        }
        self.last_classified_day = Some(today);
    }

    fn prune(&mut self, now: DateTime<Utc>) {
        if let Some(cutoff) = now.checked_sub_signed(self.config.history_window()) {
            while self
                .care_history
                .front()
                .is_some_and(|sample| sample.timestamp <= cutoff)
            {
                self.care_history.pop_front();
            }
        }
        while self.care_history.len() > self.config.history_capacity {
            self.care_history.pop_front();
        }
    }
}

/// A requirement's current value against its threshold.
#[derive(Debug, Clone, Copy)]
struct Measured {
    current: u64,
    required: u64,
    met: bool,
}

impl Measured {
    const fn at_least(current: u64, required: u64) -> Self {
        Self {
            current,
            required,
            met: current >= required,
        }
    }
}

fn delta_ms(delta: TimeDelta) -> u64 {
    u64::try_from(delta.num_milliseconds()).unwrap_or(0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_score(mean: f64) -> u64 {
    // Scores are means of clamped stats, so they lie in [0, 100].
    mean.clamp(0.0, 100.0).round() as u64
}

#[allow(clippy::cast_precision_loss)]
fn percentage(current: u64, required: u64) -> f64 {
    if required == 0 {
        return 100.0;
    }
    (current as f64 / required as f64 * 100.0).min(100.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;

    fn stats(value: f64) -> StatSet {
        StatSet {
            hunger: value,
            cleanliness: value,
            mood: value,
        }
    }

    fn engine() -> EvolutionEngine {
        EvolutionEngine::new(EvolutionConfig::default(), at(0))
    }

    #[test]
    fn starts_in_base_form() {
        let engine = engine();
        assert_eq!(engine.current().id, "base");
        assert_eq!(engine.history().len(), 1);
        assert_eq!(engine.journal().total_evolutions, 0);
    }

    #[test]
    fn empty_window_averages_fifty() {
        let engine = engine();
        assert_eq!(engine.average_care(TimeDelta::hours(1), at(0)), 50);
    }

    #[test]
    fn average_only_counts_the_trailing_window() {
        let mut engine = engine();
        engine.ingest_care_sample(&stats(10.0), at(0));
        engine.ingest_care_sample(&stats(90.0), at(2 * HOUR));
        assert_eq!(engine.average_care(TimeDelta::hours(1), at(2 * HOUR)), 90);
        assert_eq!(engine.average_care(TimeDelta::hours(24), at(2 * HOUR)), 50);
    }

    #[test]
    fn good_care_evolves_into_angel() {
        let mut engine = engine();
        for minute in 0..=61 {
            let now = at(minute * MINUTE);
            engine.ingest_care_sample(&stats(95.0), now);
            engine.track_interaction(InteractionKind::Feed, &stats(95.0), now);
            engine.track_interaction(InteractionKind::Clean, &stats(95.0), now);
        }
        assert!(engine.evaluate(at(30 * MINUTE)).is_none(), "playtime not reached");

        let transition = engine.evaluate(at(61 * MINUTE)).unwrap();
        assert_eq!(transition.old.id, "base");
        assert_eq!(transition.new.id, "angel");
        assert_eq!(transition.message, "Meowchi is evolving into Meowchi Angel!");
        assert_eq!(engine.current().id, "angel");
        assert_eq!(engine.history().last().unwrap().id, "angel");
        assert_eq!(engine.journal().total_evolutions, 1);
    }

    #[test]
    fn first_qualifying_candidate_in_catalog_order_wins() {
        let mut engine = engine();
        for _ in 0..100 {
            engine.track_interaction(InteractionKind::Feed, &stats(95.0), at(0));
        }
        // Both angel and sleepy qualify: good average, 2h played, 2h idle.
        engine.ingest_care_sample(&stats(95.0), at(2 * HOUR));
        let transition = engine.evaluate(at(2 * HOUR)).unwrap();
        assert_eq!(transition.new.id, "angel");
    }

    #[test]
    fn tier_two_requires_the_declared_predecessor() {
        let mut section = EvolutionSection::default();
        section.current_form = "sleepy".to_owned();
        section.evolution_history = vec!["base".to_owned(), "sleepy".to_owned()];
        section.perfect_care_days = 10;

        let mut engine = engine();
        engine.restore(&section, 10 * 3_600_000, at(0));
        engine.ingest_care_sample(&stats(100.0), at(0));

        // Celestial-grade care, but celestial needs angel and zen needs balanced days.
        assert!(engine.evaluate(at(MINUTE)).is_none());
        let progress = engine.progress(at(MINUTE));
        let celestial = progress.iter().find(|c| c.form.id == "celestial").unwrap();
        let previous = celestial.requirements.first().unwrap();
        assert_eq!(previous.requirement, "previous_form");
        assert_eq!(previous.current, 0);
    }

    #[test]
    fn neglect_requires_low_score_and_idleness() {
        let mut engine = engine();
        engine.ingest_care_sample(&stats(10.0), at(10 * MINUTE));
        assert_eq!(engine.neglect_periods(), 0);

        engine.ingest_care_sample(&stats(10.0), at(31 * MINUTE));
        engine.ingest_care_sample(&stats(10.0), at(32 * MINUTE));
        assert_eq!(engine.neglect_periods(), 2);

        engine.track_interaction(InteractionKind::Feed, &stats(10.0), at(33 * MINUTE));
        engine.ingest_care_sample(&stats(10.0), at(34 * MINUTE));
        assert_eq!(engine.neglect_periods(), 2);
    }

    #[test]
    fn playing_with_a_hungry_pet_is_chaos() {
        let mut engine = engine();
        let hungry = StatSet {
            hunger: 20.0,
            cleanliness: 90.0,
            mood: 90.0,
        };
        engine.track_interaction(InteractionKind::Play, &hungry, at(0));
        engine.track_interaction(InteractionKind::Feed, &hungry, at(0));
        engine.track_interaction(InteractionKind::Play, &stats(90.0), at(0));
        assert_eq!(engine.chaos_actions(), 1);
        assert_eq!(engine.total_interactions(), 3);
    }

    #[test]
    fn days_are_classified_once_enough_samples_exist() {
        let mut engine = engine();
        for i in 0..19 {
            engine.ingest_care_sample(&stats(90.0), at(i * MINUTE));
        }
        assert_eq!(engine.perfect_care_days(), 0);
        engine.ingest_care_sample(&stats(90.0), at(19 * MINUTE));
        assert_eq!(engine.perfect_care_days(), 1);
        assert_eq!(engine.balanced_days(), 0);
    }

    #[test]
    fn per_day_mode_classifies_once_per_calendar_day() {
        let config = EvolutionConfig {
            day_classification: DayClassification::PerDay,
            day_sample_minimum: 1,
            ..EvolutionConfig::default()
        };
        let mut engine = EvolutionEngine::new(config, at(0));
        for i in 0..5 {
            engine.ingest_care_sample(&stats(60.0), at(i * MINUTE));
        }
        assert_eq!(engine.balanced_days(), 1);
    }

    #[test]
    fn care_history_is_bounded_by_age_and_size() {
        let config = EvolutionConfig {
            history_capacity: 500,
            ..EvolutionConfig::default()
        };
        let mut engine = EvolutionEngine::new(config, at(0));
        let end = 30 * HOUR;
        let mut now = 0;
        while now <= end {
            engine.ingest_care_sample(&stats(70.0), at(now));
            now += 2 * MINUTE;
        }
        let history = engine.care_history();
        assert!(history.len() <= 500);
        let oldest = history.front().unwrap().timestamp;
        assert!(at(end).signed_duration_since(oldest) < TimeDelta::hours(24));
    }

    #[test]
    fn restore_drops_unknown_forms_and_keeps_history_consistent() {
        let section = EvolutionSection {
            current_form: "dragon".to_owned(),
            evolution_history: vec!["base".to_owned(), "dragon".to_owned(), "angel".to_owned()],
            ..EvolutionSection::default()
        };
        let mut engine = engine();
        engine.restore(&section, 0, at(0));
        assert_eq!(engine.current().id, "base");
        let ids: Vec<_> = engine.history().iter().map(|f| f.id).collect();
        assert_eq!(ids, ["base", "angel", "base"]);
        assert_eq!(engine.persisted().evolution_history.last().unwrap(), "base");
    }

    #[test]
    fn playtime_adds_prior_sessions() {
        let mut engine = engine();
        engine.restore(&EvolutionSection::default(), 3_600_000, at(0));
        assert_eq!(engine.playtime_ms(at(30 * MINUTE)), 5_400_000);
        assert_eq!(engine.playtime_ms(at(-10)), 3_600_000);
    }

    #[test]
    fn update_waits_for_the_cadence() {
        let mut engine = engine();
        engine.restore(&EvolutionSection::default(), 10 * 3_600_000, at(0));
        for _ in 0..100 {
            engine.track_interaction(InteractionKind::Feed, &stats(95.0), at(0));
        }
        engine.ingest_care_sample(&stats(95.0), at(MINUTE));
        assert!(engine.update(at(MINUTE)).is_none());
        assert_eq!(engine.update(at(5 * MINUTE)).unwrap().new.id, "angel");
    }

    #[test]
    fn progress_is_idempotent_and_capped() {
        let mut engine = engine();
        for _ in 0..250 {
            engine.track_interaction(InteractionKind::Feed, &stats(95.0), at(0));
        }
        let first = engine.progress(at(10));
        assert_eq!(first, engine.progress(at(10)));

        let angel = first.iter().find(|c| c.form.id == "angel").unwrap();
        let interactions = angel
            .requirements
            .iter()
            .find(|r| r.requirement == "interactions")
            .unwrap();
        assert_eq!(interactions.current, 250);
        assert!((interactions.percentage - 100.0).abs() < f64::EPSILON);
    }
}
