//! Participant record and registry id normalization.

use serde::{Deserialize, Serialize};

/// Unique identifier for a participant: the normalized (trimmed, lowercase) display name.
pub type ParticipantId = String;

/// Registry key for a display name.
pub fn normalize_id(name: &str) -> ParticipantId {
    name.trim().to_lowercase()
}

/// A registered participant. The session holds snapshots; the store owns the record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub games_played: u32,
    /// Always wins / games_played, 0 when no games.
    pub winrate: f64,
}

impl Participant {
    /// Create a participant with a zeroed record. The id is derived from the name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        Self {
            id: normalize_id(&name),
            name,
            wins: 0,
            losses: 0,
            games_played: 0,
            winrate: 0.0,
        }
    }

    /// Create a participant with an existing win/loss record.
    pub fn with_record(name: impl Into<String>, wins: u32, losses: u32) -> Self {
        let mut p = Self::new(name);
        p.wins = wins;
        p.losses = losses;
        p.recompute();
        p
    }

    /// Record a win for this participant.
    pub fn add_win(&mut self) {
        self.wins += 1;
        self.recompute();
    }

    /// Record a loss for this participant.
    pub fn add_loss(&mut self) {
        self.losses += 1;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.games_played = self.wins + self.losses;
        self.winrate = if self.games_played > 0 {
            f64::from(self.wins) / f64::from(self.games_played)
        } else {
            0.0
        };
    }
}
