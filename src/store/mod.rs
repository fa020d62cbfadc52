//! Persistence boundary: the participant registry and match ledger.

mod memory;

pub use memory::MemoryStore;

use crate::models::{MatchKey, MatchRecord, Participant, SessionError, SessionId, StatUpdate};

/// Failure reported by a store.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StoreError {
    /// A participant document was missing or concurrently altered.
    Conflict(String),
    /// Network or backend failure.
    Transient(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Conflict(reason) => write!(f, "conflict: {}", reason),
            StoreError::Transient(reason) => write!(f, "store unavailable: {}", reason),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(reason) => SessionError::PersistenceConflict(reason),
            StoreError::Transient(reason) => SessionError::TransientPersistenceFailure(reason),
        }
    }
}

/// Result of registering a participant.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpsertOutcome {
    Created,
    AlreadyExists,
}

/// Durable participant registry and match ledger.
#[allow(async_fn_in_trait)]
pub trait ParticipantStore {
    async fn get_participant(&self, id: &str) -> Result<Option<Participant>, StoreError>;

    /// All registered participants, ordered by display name.
    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError>;

    /// Create the participant unless its id is taken.
    async fn upsert_participant(&self, participant: Participant) -> Result<UpsertOutcome, StoreError>;

    /// Atomically write `record` under (`session`, `key`) and apply every stat update.
    /// Returns the updated participant records. On error nothing is written.
    async fn transactional_record_match(
        &self,
        session: SessionId,
        key: &MatchKey,
        record: &MatchRecord,
        updates: &[StatUpdate],
    ) -> Result<Vec<Participant>, StoreError>;
}
