use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::profile::{Badge, MissionDraft, MissionRecord, PlayerProgress};
use crate::progression::badge::check_badges;
use crate::progression::level::{LevelProgress, calculate_level};
use crate::store::ProfileRepository;

/// Currency earned per point of XP awarded, as a divisor.
const CURRENCY_DIVISOR: u64 = 10;

/// Progression side effects surfaced to the presentation layer (toast,
/// sound cue). Fire-and-forget: the ledger never waits on the sink.
#[derive(Clone, Debug, PartialEq)]
pub enum UnlockEvent {
    LevelUp { level: u32, title: String },
    BadgeUnlocked(Badge),
}

pub trait NotificationSink {
    fn notify(&mut self, event: &UnlockEvent);
}

/// Sink that drops everything; for headless callers and tests.
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _event: &UnlockEvent) {}
}

/// The single authoritative mutator of one player's `PlayerProgress`.
///
/// Every mutation persists best-effort through the injected repository; a
/// failed save is logged and the in-memory aggregate stays the source of
/// truth for the rest of the session. The next mutation saves again, which
/// stands in for retry logic.
pub struct ProgressionLedger {
    player_id: String,
    progress: PlayerProgress,
    repository: Box<dyn ProfileRepository>,
    sink: Box<dyn NotificationSink>,
}

impl ProgressionLedger {
    /// Load the player's stored profile, or start fresh when the stored one
    /// is missing or unreadable.
    pub fn open(
        player_id: impl Into<String>,
        repository: Box<dyn ProfileRepository>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        let player_id = player_id.into();
        let progress = match repository.load(&player_id) {
            Some(progress) => progress,
            None => {
                warn!(player = %player_id, "stored profile unreadable, starting fresh");
                PlayerProgress::default()
            }
        };
        Self {
            player_id,
            progress,
            repository,
            sink,
        }
    }

    /// Build a ledger around an existing aggregate (migrations, tests).
    pub fn with_progress(
        player_id: impl Into<String>,
        progress: PlayerProgress,
        repository: Box<dyn ProfileRepository>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            progress,
            repository,
            sink,
        }
    }

    pub fn progress(&self) -> &PlayerProgress {
        &self.progress
    }

    pub fn level(&self) -> LevelProgress {
        calculate_level(self.progress.career_score)
    }

    /// Add experience and the derived currency cut, announcing a level-up
    /// when the award crosses a threshold. Career score never decreases, so
    /// a negative delta awards nothing.
    pub fn apply_experience(&mut self, delta: i64, reason: &str) {
        let gained = u64::try_from(delta).unwrap_or(0);
        let before = calculate_level(self.progress.career_score);

        self.progress.career_score += gained;
        // Currency is a transactional cut of the award, never recomputed
        // from career score, so replaying history can't double-award it.
        self.progress.currency += gained / CURRENCY_DIVISOR;

        let after = calculate_level(self.progress.career_score);
        debug!(delta, gained, reason, "experience applied");

        if after.current_level.level > before.current_level.level {
            self.sink.notify(&UnlockEvent::LevelUp {
                level: after.current_level.level,
                title: after.current_level.title.to_string(),
            });
        }
        // An XP award can satisfy score-based unlocks on its own
        self.award_new_badges();
        self.persist();
    }

    /// Append a completed mission and run a badge pass over the updated
    /// aggregate.
    pub fn record_mission(&mut self, draft: MissionDraft) -> &MissionRecord {
        let record = MissionRecord {
            id: Uuid::new_v4().to_string(),
            date: Utc::now(),
            score: draft.score,
            difficulty: draft.difficulty,
            efficiency: draft.efficiency,
            max_streak: draft.max_streak,
        };
        self.progress.mission_history.push(record);
        self.award_new_badges();
        self.persist();
        self.progress.mission_history.last().unwrap()
    }

    /// Mark a course topic complete. Ordered, deduplicated; feeds the
    /// scholar badge.
    pub fn complete_topic(&mut self, topic_id: &str) {
        if self.progress.completed_topic_ids.iter().any(|t| t == topic_id) {
            return;
        }
        self.progress.completed_topic_ids.push(topic_id.to_string());
        self.award_new_badges();
        self.persist();
    }

    /// Roll the calendar-day activity streak. Same day: unchanged; exactly
    /// one day elapsed: increment; any longer gap (or first activity):
    /// reset to 1.
    pub fn update_daily_streak(&mut self) {
        self.update_daily_streak_at(Utc::now());
    }

    pub(crate) fn update_daily_streak_at(&mut self, now: DateTime<Utc>) {
        match self.progress.last_active_date {
            Some(last) => {
                let elapsed = (now.date_naive() - last.date_naive()).num_days();
                if elapsed == 1 {
                    self.progress.current_streak_days += 1;
                } else if elapsed != 0 {
                    self.progress.current_streak_days = 1;
                }
            }
            None => self.progress.current_streak_days = 1,
        }
        self.progress.last_active_date = Some(now);
        self.persist();
    }

    /// Check-then-subtract; `false` with no change on insufficient funds.
    pub fn spend_currency(&mut self, amount: u64) -> bool {
        if self.progress.currency < amount {
            return false;
        }
        self.progress.currency -= amount;
        self.persist();
        true
    }

    fn award_new_badges(&mut self) {
        for badge in check_badges(&self.progress) {
            // Evaluator already filters by id, but the merge double-checks
            // so the at-most-once invariant survives any caller mistake.
            if self.progress.has_badge(&badge.id) {
                continue;
            }
            self.sink.notify(&UnlockEvent::BadgeUnlocked(badge.clone()));
            self.progress.badges.push(badge);
        }
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save(&self.player_id, &self.progress) {
            warn!(player = %self.player_id, error = %e, "failed to persist progress, continuing in memory");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::profile::Difficulty;
    use crate::store::StoreError;

    /// Repository that never touches disk.
    struct NullRepository;

    impl ProfileRepository for NullRepository {
        fn load(&self, _player_id: &str) -> Option<PlayerProgress> {
            Some(PlayerProgress::default())
        }
        fn save(&self, _player_id: &str, _progress: &PlayerProgress) -> Result<(), StoreError> {
            Ok(())
        }
    }

    /// Repository whose saves always fail, to prove gameplay continues.
    struct BrokenRepository;

    impl ProfileRepository for BrokenRepository {
        fn load(&self, _player_id: &str) -> Option<PlayerProgress> {
            None
        }
        fn save(&self, _player_id: &str, _progress: &PlayerProgress) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk on fire")))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingSink {
        events: Rc<RefCell<Vec<UnlockEvent>>>,
    }

    impl NotificationSink for RecordingSink {
        fn notify(&mut self, event: &UnlockEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    fn make_ledger() -> (ProgressionLedger, Rc<RefCell<Vec<UnlockEvent>>>) {
        let sink = RecordingSink::default();
        let events = sink.events.clone();
        let ledger =
            ProgressionLedger::open("test", Box::new(NullRepository), Box::new(sink));
        (ledger, events)
    }

    fn draft(score: i64, efficiency: u8, max_streak: u32) -> MissionDraft {
        MissionDraft {
            score,
            difficulty: Difficulty::Medium,
            efficiency,
            max_streak,
        }
    }

    #[test]
    fn test_experience_accrues_with_currency_cut() {
        let (mut ledger, _) = make_ledger();
        ledger.apply_experience(125, "mission");
        assert_eq!(ledger.progress().career_score, 125);
        assert_eq!(ledger.progress().currency, 12);
    }

    #[test]
    fn test_negative_delta_awards_nothing() {
        let (mut ledger, _) = make_ledger();
        ledger.apply_experience(500, "mission");
        ledger.apply_experience(-300, "bad mission");
        assert_eq!(ledger.progress().career_score, 500);
        assert_eq!(ledger.progress().currency, 50);
    }

    #[test]
    fn test_level_up_emits_single_event() {
        let (mut ledger, events) = make_ledger();
        // Level 2 threshold is 1000
        ledger.apply_experience(999, "warmup");
        assert!(events.borrow().is_empty());

        ledger.apply_experience(1, "the last point");
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            UnlockEvent::LevelUp {
                level: 2,
                title: "Student Sonographer".to_string()
            }
        );
    }

    #[test]
    fn test_multi_level_jump_announces_final_level() {
        let (mut ledger, events) = make_ledger();
        // 0 -> 5196 crosses levels 2 and 3 at once
        ledger.apply_experience(5196, "marathon");
        let events = events.borrow();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], UnlockEvent::LevelUp { level: 4, .. }));
    }

    #[test]
    fn test_xp_award_alone_unlocks_score_badges() {
        let (mut ledger, events) = make_ledger();
        ledger.apply_experience(10_000, "grind");

        assert!(ledger.progress().has_badge("high_roller"));
        assert!(
            events
                .borrow()
                .iter()
                .any(|e| matches!(e, UnlockEvent::BadgeUnlocked(b) if b.id == "high_roller"))
        );
    }

    #[test]
    fn test_record_mission_stamps_id_and_date() {
        let (mut ledger, _) = make_ledger();
        let record = ledger.record_mission(draft(250, 80, 4)).clone();
        assert!(!record.id.is_empty());
        assert_eq!(record.score, 250);
        assert_eq!(ledger.progress().mission_history.len(), 1);
    }

    #[test]
    fn test_record_mission_awards_badges_once() {
        let (mut ledger, events) = make_ledger();
        ledger.record_mission(draft(300, 100, 12));

        let ids: Vec<String> = ledger.progress().badges.iter().map(|b| b.id.clone()).collect();
        assert_eq!(ids, vec!["initiate", "resonance_master", "physicist"]);
        assert_eq!(events.borrow().len(), 3);

        // A second, weaker mission adds nothing new
        ledger.record_mission(draft(50, 40, 2));
        assert_eq!(ledger.progress().badges.len(), 3);
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn test_complete_topic_dedupes_and_unlocks_scholar() {
        let (mut ledger, _) = make_ledger();
        for topic in ["piezo", "doppler", "artifacts", "attenuation", "piezo", "bioeffects"] {
            ledger.complete_topic(topic);
        }
        assert_eq!(ledger.progress().completed_topic_ids.len(), 5);
        assert!(ledger.progress().has_badge("scholar"));
    }

    #[test]
    fn test_spend_currency_success_and_insufficient() {
        let (mut ledger, _) = make_ledger();
        ledger.apply_experience(1000, "funding");
        assert_eq!(ledger.progress().currency, 100);

        assert!(ledger.spend_currency(50));
        assert_eq!(ledger.progress().currency, 50);

        assert!(!ledger.spend_currency(100));
        assert_eq!(ledger.progress().currency, 50);
    }

    /// Fixed mid-day instant so day arithmetic never straddles midnight.
    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_daily_streak_increments_after_one_day() {
        let (mut ledger, _) = make_ledger();
        let now = noon();
        ledger.progress.current_streak_days = 3;
        ledger.progress.last_active_date = Some(now - Duration::days(1));

        ledger.update_daily_streak_at(now);
        assert_eq!(ledger.progress().current_streak_days, 4);
        assert_eq!(ledger.progress().last_active_date, Some(now));
    }

    #[test]
    fn test_daily_streak_resets_after_gap() {
        let (mut ledger, _) = make_ledger();
        let now = noon();
        ledger.progress.current_streak_days = 3;
        ledger.progress.last_active_date = Some(now - Duration::days(5));

        ledger.update_daily_streak_at(now);
        assert_eq!(ledger.progress().current_streak_days, 1);
    }

    #[test]
    fn test_daily_streak_same_day_unchanged() {
        let (mut ledger, _) = make_ledger();
        let now = noon();
        ledger.progress.current_streak_days = 3;
        ledger.progress.last_active_date = Some(now - Duration::minutes(30));

        ledger.update_daily_streak_at(now);
        assert_eq!(ledger.progress().current_streak_days, 3);
        assert_eq!(ledger.progress().last_active_date, Some(now));
    }

    #[test]
    fn test_first_activity_starts_streak_at_one() {
        let (mut ledger, _) = make_ledger();
        ledger.update_daily_streak();
        assert_eq!(ledger.progress().current_streak_days, 1);
    }

    #[test]
    fn test_save_failure_does_not_interrupt_play() {
        let sink = RecordingSink::default();
        let mut ledger =
            ProgressionLedger::open("test", Box::new(BrokenRepository), Box::new(sink));
        ledger.apply_experience(1500, "mission");
        ledger.record_mission(draft(100, 70, 3));
        assert_eq!(ledger.progress().career_score, 1500);
        assert_eq!(ledger.progress().mission_history.len(), 1);
    }
}
