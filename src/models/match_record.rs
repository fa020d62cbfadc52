//! Match keys, immutable match records and the stat updates sent with them.

use crate::models::court::CourtNumber;
use crate::models::participant::{Participant, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic match identifier: `court<N>_seq<M>`.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchKey(String);

impl MatchKey {
    /// `sequence` is the 1-based per-court sequence number.
    pub fn new(court: CourtNumber, sequence: u32) -> Self {
        Self(format!("court{court}_seq{sequence}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Participant reference as written into a match record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RecordedParticipant {
    pub id: ParticipantId,
    pub name: String,
}

impl From<&Participant> for RecordedParticipant {
    fn from(p: &Participant) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
        }
    }
}

/// A finished game. Never mutated once written.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub court_number: CourtNumber,
    pub winners: Vec<RecordedParticipant>,
    pub losers: Vec<RecordedParticipant>,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of one game for one participant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Loss,
}

/// Read-then-write stat change the store applies inside the match transaction.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StatUpdate {
    pub participant_id: ParticipantId,
    pub result: GameResult,
}

impl StatUpdate {
    /// Apply this update to a stored record (wins or losses +1, games and winrate recomputed).
    pub fn apply(&self, p: &mut Participant) {
        match self.result {
            GameResult::Win => p.add_win(),
            GameResult::Loss => p.add_loss(),
        }
    }
}
