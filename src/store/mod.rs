pub mod json_store;
pub mod schema;

use thiserror::Error;

use crate::profile::PlayerProgress;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize profile: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write profile: {0}")]
    Io(#[from] std::io::Error),
}

/// Persistence seam for player profiles, keyed by player identity.
///
/// Injected into the ledger so tests and future backends don't go through
/// ambient global state. Saves are best-effort: the caller logs a failure
/// and keeps playing with the in-memory aggregate.
pub trait ProfileRepository {
    /// `Some(default)` when no profile exists yet; `None` when a stored
    /// profile exists but cannot be parsed (corruption / schema mismatch).
    fn load(&self, player_id: &str) -> Option<PlayerProgress>;

    fn save(&self, player_id: &str, progress: &PlayerProgress) -> Result<(), StoreError>;
}
