use std::sync::LazyLock;

const BASE_XP: f64 = 1000.0;
const GROWTH_FACTOR: f64 = 1.5;
pub const MAX_LEVEL: u32 = 50;

/// One entry of the level table. The table is generated once at process
/// start and never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level {
    pub level: u32,
    pub title: &'static str,
    /// Cumulative career score needed to reach this level. Strictly
    /// increasing; level 1 sits at 0 so a fresh profile starts ranked.
    pub xp_required: u64,
}

/// Derived view of where a career score sits in the level table. Never
/// stored; recomputed on every render.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LevelProgress {
    pub current_level: Level,
    /// Equal to `current_level` once the table is capped out.
    pub next_level: Level,
    /// Percent of the span between the current and next thresholds, clamped
    /// to [0, 100]. Held at 100 at max level.
    pub progress: f64,
}

/// Rank names by minimum level; ascending scan, highest satisfied wins.
const RANK_TITLES: &[(u32, &str)] = &[
    (1, "Student Sonographer"),
    (5, "Intern"),
    (10, "Resident"),
    (15, "Registered Sonographer"),
    (20, "Senior Sonographer"),
    (25, "Lead Sonographer"),
    (30, "Physics Instructor"),
    (35, "Department Chief"),
    (40, "Ultrasound Physicist"),
    (45, "Doppler Legend"),
];

fn title_for(level: u32) -> &'static str {
    let mut title = RANK_TITLES[0].1;
    for &(min_level, name) in RANK_TITLES {
        if level >= min_level {
            title = name;
        } else {
            break;
        }
    }
    title
}

fn xp_required(level: u32) -> u64 {
    // Power-law curve: each level costs disproportionately more.
    (BASE_XP * f64::from(level - 1).powf(GROWTH_FACTOR)) as u64
}

static LEVELS: LazyLock<Vec<Level>> = LazyLock::new(|| {
    (1..=MAX_LEVEL)
        .map(|level| Level {
            level,
            title: title_for(level),
            xp_required: xp_required(level),
        })
        .collect()
});

pub fn level_table() -> &'static [Level] {
    &LEVELS
}

/// Map a cumulative career score to its level and in-level progress.
///
/// Pure and cheap: safe to call on every status render. Threshold
/// boundaries are inclusive — reaching a threshold grants the level.
pub fn calculate_level(career_score: u64) -> LevelProgress {
    let levels = level_table();
    let mut idx = 0;
    for (i, entry) in levels.iter().enumerate() {
        if career_score >= entry.xp_required {
            idx = i;
        } else {
            break;
        }
    }

    let current_level = levels[idx];
    let next_level = if idx + 1 < levels.len() {
        levels[idx + 1]
    } else {
        current_level
    };

    let progress = if next_level.level == current_level.level {
        // Capped at the table's last entry; nothing left to earn.
        100.0
    } else {
        let span = (next_level.xp_required - current_level.xp_required) as f64;
        let earned = (career_score - current_level.xp_required) as f64;
        (earned / span * 100.0).clamp(0.0, 100.0)
    };

    LevelProgress {
        current_level,
        next_level,
        progress,
    }
}
