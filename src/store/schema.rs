use serde::{Deserialize, Serialize};

use crate::profile::PlayerProgress;

pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// On-disk shape: the flat `PlayerProgress` fields plus a version stamp so
/// future migrations can detect stale profiles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(flatten)]
    pub progress: PlayerProgress,
}

impl Default for ProfileData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            progress: PlayerProgress::default(),
        }
    }
}

impl ProfileData {
    pub fn new(progress: PlayerProgress) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            progress,
        }
    }

    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}
