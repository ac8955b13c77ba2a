use chrono::{DateTime, Utc};

use crate::profile::{Badge, PlayerProgress};

// Badge ids are stable string keys; existing profiles reference them, so
// they must never be renamed.
pub const INITIATE: &str = "initiate";
pub const HIGH_ROLLER: &str = "high_roller";
pub const RESONANCE_MASTER: &str = "resonance_master";
pub const SCHOLAR: &str = "scholar";
pub const PHYSICIST: &str = "physicist";

/// Static catalog entry: display data plus the unlock predicate.
pub struct BadgeDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    predicate: fn(&PlayerProgress) -> bool,
}

/// Canonical badge catalog. Declaration order is display order.
pub const BADGE_CATALOG: &[BadgeDefinition] = &[
    BadgeDefinition {
        id: INITIATE,
        name: "First Scan",
        description: "Complete your first mission.",
        icon: "probe",
        predicate: |p| !p.mission_history.is_empty(),
    },
    BadgeDefinition {
        id: HIGH_ROLLER,
        name: "High Roller",
        description: "Accumulate 10,000 career XP.",
        icon: "coins",
        predicate: |p| p.career_score >= 10_000,
    },
    BadgeDefinition {
        id: RESONANCE_MASTER,
        name: "Resonance Master",
        description: "Answer 10 clues correctly in a row within one mission.",
        icon: "wave",
        predicate: |p| p.best_mission_streak() >= 10,
    },
    BadgeDefinition {
        id: SCHOLAR,
        name: "Scholar",
        description: "Complete 5 course topics.",
        icon: "book",
        predicate: |p| p.completed_topic_ids.len() >= 5,
    },
    BadgeDefinition {
        id: PHYSICIST,
        name: "True Physicist",
        description: "Finish a mission with 100% accuracy.",
        icon: "atom",
        predicate: |p| p.mission_history.iter().any(|m| m.efficiency >= 100),
    },
];

/// Scan the catalog for newly satisfied unlock conditions.
///
/// Reads the snapshot only; already-unlocked badges are filtered by id
/// membership, so a caller that merges the result before calling again gets
/// an empty follow-up. Output order matches catalog order.
pub fn check_badges(progress: &PlayerProgress) -> Vec<Badge> {
    check_badges_at(progress, Utc::now())
}

pub fn check_badges_at(progress: &PlayerProgress, now: DateTime<Utc>) -> Vec<Badge> {
    BADGE_CATALOG
        .iter()
        .filter(|def| !progress.has_badge(def.id))
        .filter(|def| (def.predicate)(progress))
        .map(|def| Badge {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            icon: def.icon.to_string(),
            unlocked_at: Some(now),
        })
        .collect()
}
