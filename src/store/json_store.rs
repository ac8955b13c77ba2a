use std::fs;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;

use crate::profile::PlayerProgress;
use crate::store::schema::ProfileData;
use crate::store::{ProfileRepository, StoreError};

/// One pretty-printed JSON file per player under the platform data dir.
/// Writes go through a tmp file + rename so a crash mid-save never leaves a
/// truncated profile. Concurrent writers are last-write-wins.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("echoprep")
            .join("profiles");
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, player_id: &str) -> PathBuf {
        // Player ids come from config/CLI; strip anything path-hostile.
        let safe: String = player_id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_dir.join(format!("{safe}.json"))
    }
}

impl ProfileRepository for JsonStore {
    /// Missing file is a fresh profile, not an error; a file that exists but
    /// cannot be parsed (corruption / stale schema) is `None` so the caller
    /// can decide to reset.
    fn load(&self, player_id: &str) -> Option<PlayerProgress> {
        let path = self.file_path(player_id);
        if !path.exists() {
            return Some(PlayerProgress::default());
        }
        let content = fs::read_to_string(&path).ok()?;
        let data: ProfileData = serde_json::from_str(&content).ok()?;
        if data.needs_reset() {
            return None;
        }
        Some(data.progress)
    }

    fn save(&self, player_id: &str, progress: &PlayerProgress) -> Result<(), StoreError> {
        let path = self.file_path(player_id);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(&ProfileData::new(progress.clone()))?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
