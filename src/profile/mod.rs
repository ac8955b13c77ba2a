use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Difficulty tier of a mission. Fixed enumeration, serialized lowercase to
/// match the stored profile format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn to_key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// One completed play session. Immutable once appended to the history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MissionRecord {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Net session score. Wrong answers subtract clue value, so this can go
    /// negative for a bad session.
    pub score: i64,
    pub difficulty: Difficulty,
    /// Percentage of correct answers, 0-100.
    pub efficiency: u8,
    /// Longest run of consecutive correct answers within the session.
    pub max_streak: u32,
}

/// A finished session's outcome before the ledger stamps id and date.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MissionDraft {
    pub score: i64,
    pub difficulty: Difficulty,
    pub efficiency: u8,
    pub max_streak: u32,
}

/// An earned achievement. `unlocked_at` is stamped exactly once, at first
/// award; catalog entries that were never earned do not appear in a profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Symbolic glyph key, opaque to the core; the UI maps it to a renderable.
    pub icon: String,
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Root aggregate for one player identity.
///
/// Every field defaults so that stale or partially-migrated stored JSON
/// deserializes to something usable instead of failing a render.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerProgress {
    /// Cumulative lifetime XP; sole driver of level. Never decreases.
    #[serde(default)]
    pub career_score: u64,
    /// Spendable balance, earned as a fraction of XP at award time.
    #[serde(default)]
    pub currency: u64,
    /// Consecutive calendar days with any activity. Distinct from the
    /// in-session answer streak recorded per mission.
    #[serde(default)]
    pub current_streak_days: u32,
    #[serde(default)]
    pub last_active_date: Option<DateTime<Utc>>,
    /// Append-only, oldest first.
    #[serde(default)]
    pub mission_history: Vec<MissionRecord>,
    /// Ordered set; insertion order preserved for display.
    #[serde(default)]
    pub completed_topic_ids: Vec<String>,
    /// Append-only set keyed by badge id, insertion order preserved.
    #[serde(default)]
    pub badges: Vec<Badge>,
}

impl PlayerProgress {
    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }

    pub fn best_mission_streak(&self) -> u32 {
        self.mission_history
            .iter()
            .map(|m| m.max_streak)
            .max()
            .unwrap_or(0)
    }
}
