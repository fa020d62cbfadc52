//! In-memory transactional store.

use super::{ParticipantStore, StoreError, UpsertOutcome};
use crate::models::{
    MatchKey, MatchRecord, Participant, ParticipantId, SessionId, StatUpdate,
};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::io::Read;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    participants: HashMap<ParticipantId, Participant>,
    matches: HashMap<(SessionId, MatchKey), MatchRecord>,
    /// Errors returned by the next transactions, in order.
    failures: VecDeque<StoreError>,
}

/// Store kept in process memory. Transactions are serialized by a single lock,
/// so a transaction either applies completely or not at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    latency: Option<Duration>,
}

/// One roster line: `name,wins,losses` (wins and losses may be blank).
#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    wins: Option<u32>,
    losses: Option<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        let participants = participants
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Self {
            inner: Mutex::new(Inner {
                participants,
                ..Inner::default()
            }),
            latency: None,
        }
    }

    /// Load a roster from CSV with a `name,wins,losses` header. Blank names are skipped;
    /// later duplicates of a name are ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut participants: HashMap<ParticipantId, Participant> = HashMap::new();
        for row in rdr.deserialize() {
            let row: RosterRow = row?;
            if row.name.trim().is_empty() {
                continue;
            }
            let p = Participant::with_record(
                row.name,
                row.wins.unwrap_or(0),
                row.losses.unwrap_or(0),
            );
            participants.entry(p.id.clone()).or_insert(p);
        }
        log::info!("loaded {} participant(s) from roster", participants.len());
        Ok(Self::with_participants(participants.into_values()))
    }

    /// Delay every transaction by `latency` before it runs.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next match transaction fail with `error` without writing anything.
    pub async fn inject_failure(&self, error: StoreError) {
        self.inner.lock().await.failures.push_back(error);
    }

    /// Remove a participant document (e.g. deleted from another device).
    pub async fn remove_participant(&self, id: &str) -> Option<Participant> {
        self.inner.lock().await.participants.remove(id)
    }

    pub async fn match_record(&self, session: SessionId, key: &MatchKey) -> Option<MatchRecord> {
        self.inner
            .lock()
            .await
            .matches
            .get(&(session, key.clone()))
            .cloned()
    }

    /// Number of match records written for a session.
    pub async fn match_count(&self, session: SessionId) -> usize {
        self.inner
            .lock()
            .await
            .matches
            .keys()
            .filter(|(s, _)| *s == session)
            .count()
    }
}

impl ParticipantStore for MemoryStore {
    async fn get_participant(&self, id: &str) -> Result<Option<Participant>, StoreError> {
        Ok(self.inner.lock().await.participants.get(id).cloned())
    }

    async fn list_participants(&self) -> Result<Vec<Participant>, StoreError> {
        let mut all: Vec<Participant> = self
            .inner
            .lock()
            .await
            .participants
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(all)
    }

    async fn upsert_participant(&self, participant: Participant) -> Result<UpsertOutcome, StoreError> {
        let mut g = self.inner.lock().await;
        if g.participants.contains_key(&participant.id) {
            return Ok(UpsertOutcome::AlreadyExists);
        }
        g.participants.insert(participant.id.clone(), participant);
        Ok(UpsertOutcome::Created)
    }

    async fn transactional_record_match(
        &self,
        session: SessionId,
        key: &MatchKey,
        record: &MatchRecord,
        updates: &[StatUpdate],
    ) -> Result<Vec<Participant>, StoreError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut g = self.inner.lock().await;
        if let Some(err) = g.failures.pop_front() {
            return Err(err);
        }

        // Read every document before writing any.
        let mut updated = Vec::with_capacity(updates.len());
        for u in updates {
            let mut p = g.participants.get(&u.participant_id).cloned().ok_or_else(|| {
                StoreError::Conflict(format!(
                    "document for player {} does not exist",
                    u.participant_id
                ))
            })?;
            u.apply(&mut p);
            updated.push(p);
        }

        g.matches.insert((session, key.clone()), record.clone());
        for p in &updated {
            g.participants.insert(p.id.clone(), p.clone());
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roster_from_csv() {
        let data = "name,wins,losses\nAlice,8,2\n bob ,,\n,1,1\nALICE,0,0\n";
        let store = MemoryStore::from_csv_reader(data.as_bytes()).unwrap();
        let all = store.list_participants().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, "alice");
        assert_eq!(all[0].games_played, 10);
        assert_eq!(all[1].name, "bob");
        assert_eq!(all[1].games_played, 0);
    }
}
