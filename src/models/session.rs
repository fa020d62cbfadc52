//! Session aggregate, SessionPhase and SessionError.

use crate::config::EngineConfig;
use crate::logic::{PairingHistory, RestQueue};
use crate::models::court::{Court, CourtNumber, CourtOccupancy};
use crate::models::participant::{Participant, ParticipantId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Errors that can occur during session operations.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionError {
    /// Team selection was given a group that is not exactly four participants.
    InvalidGroupSize(usize),
    /// Not enough participants for the requested courts (start) or resting (add court).
    InsufficientPlayers { required: usize, selected: usize },
    /// Court count must be at least 1.
    InvalidCourtCount,
    /// Session is not in a phase that allows this command.
    InvalidState,
    CourtNotFound(CourtNumber),
    /// Court has no game to finish.
    CourtEmpty(CourtNumber),
    /// A result for this court is already being recorded.
    SubmissionInFlight(CourtNumber),
    /// Winners and losers are not the two teams currently on the court.
    TeamsMismatch,
    ParticipantNotFound(ParticipantId),
    ParticipantAlreadyInSession(ParticipantId),
    /// A participant with this name already exists in the registry.
    DuplicateParticipant(String),
    /// Display name is empty.
    InvalidName,
    /// Swap refers to participants outside the court and resting queue, or to the same slot twice.
    InvalidSwap,
    /// Ending a session discards all court state and must be confirmed.
    ConfirmationRequired,
    /// Completion belongs to a session that has since been replaced.
    StaleSubmission,
    /// A participant document was missing or concurrently altered; nothing was written.
    PersistenceConflict(String),
    /// Network or store failure; nothing was written and the submission may be retried.
    TransientPersistenceFailure(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidGroupSize(n) => {
                write!(f, "Team selection needs exactly 4 players (got {})", n)
            }
            SessionError::InsufficientPlayers { required, selected } => {
                write!(f, "Not enough players: need {}, have {}", required, selected)
            }
            SessionError::InvalidCourtCount => write!(f, "Please enter a valid number of courts"),
            SessionError::InvalidState => write!(f, "Invalid state for this action"),
            SessionError::CourtNotFound(n) => write!(f, "Court {} not found", n),
            SessionError::CourtEmpty(n) => write!(f, "Court {} has no game in progress", n),
            SessionError::SubmissionInFlight(n) => {
                write!(f, "A result for court {} is still being recorded", n)
            }
            SessionError::TeamsMismatch => {
                write!(f, "Winners and losers must be the two teams on the court")
            }
            SessionError::ParticipantNotFound(id) => write!(f, "Player {} not found", id),
            SessionError::ParticipantAlreadyInSession(id) => {
                write!(f, "Player {} is already in the session", id)
            }
            SessionError::DuplicateParticipant(name) => write!(f, "{} already exists", name),
            SessionError::InvalidName => write!(f, "Player name cannot be empty"),
            SessionError::InvalidSwap => write!(f, "Invalid swap for this court"),
            SessionError::ConfirmationRequired => {
                write!(f, "Ending the session discards all court progress and must be confirmed")
            }
            SessionError::StaleSubmission => {
                write!(f, "Result belongs to a session that is no longer active")
            }
            SessionError::PersistenceConflict(reason) => {
                write!(f, "Failed to record match (conflict): {}", reason)
            }
            SessionError::TransientPersistenceFailure(reason) => {
                write!(f, "Failed to record match: {}", reason)
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Unique identifier for a session; scopes the match collection in the store.
pub type SessionId = Uuid;

/// Lifecycle of a session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Choosing participants and court count; no courts exist.
    #[default]
    Setup,
    /// Courts are running and participants rotate through them.
    Active,
}

/// All in-session state. Owned by a single actor and mutated only through `logic` commands.
#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) phase: SessionPhase,
    pub(crate) config: EngineConfig,
    /// Snapshots of every participant on a court or resting.
    pub(crate) roster: HashMap<ParticipantId, Participant>,
    pub(crate) courts: Vec<Court>,
    pub(crate) resting: RestQueue,
    pub(crate) history: PairingHistory,
    /// Last used match sequence number per court.
    pub(crate) sequences: HashMap<CourtNumber, u32>,
    /// Courts with an outstanding match submission.
    pub(crate) in_flight: HashSet<CourtNumber>,
    pub(crate) rng: StdRng,
}

impl Session {
    /// Create a new session in Setup with no participants.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Same as `new`, with reproducible shuffles and draws.
    pub fn with_seed(config: EngineConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: EngineConfig, rng: StdRng) -> Self {
        let history = PairingHistory::new(config.special_pair.clone());
        Self {
            id: Uuid::new_v4(),
            phase: SessionPhase::Setup,
            config,
            roster: HashMap::new(),
            courts: Vec::new(),
            resting: RestQueue::new(),
            history,
            sequences: HashMap::new(),
            in_flight: HashSet::new(),
            rng,
        }
    }

    /// Drop all session state and take a fresh identifier. Config and rng carry over.
    pub(crate) fn reset(&mut self) {
        self.id = Uuid::new_v4();
        self.phase = SessionPhase::Setup;
        self.roster.clear();
        self.courts.clear();
        self.resting = RestQueue::new();
        self.history = PairingHistory::new(self.config.special_pair.clone());
        self.sequences.clear();
        self.in_flight.clear();
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn courts(&self) -> &[Court] {
        &self.courts
    }

    pub fn court(&self, number: CourtNumber) -> Option<&Court> {
        self.courts.iter().find(|c| c.number == number)
    }

    pub(crate) fn court_mut(&mut self, number: CourtNumber) -> Option<&mut Court> {
        self.courts.iter_mut().find(|c| c.number == number)
    }

    pub fn resting(&self) -> &RestQueue {
        &self.resting
    }

    pub fn history(&self) -> &PairingHistory {
        &self.history
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.roster.get(id)
    }

    /// Last sequence number used for a court (0 if none yet).
    pub fn sequence(&self, court: CourtNumber) -> u32 {
        self.sequences.get(&court).copied().unwrap_or(0)
    }

    pub fn is_pending(&self, court: CourtNumber) -> bool {
        self.in_flight.contains(&court)
    }

    pub fn has_pending(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Adding a court needs four resting participants.
    pub fn can_add_court(&self) -> bool {
        self.phase == SessionPhase::Active && self.resting.len() >= 4
    }

    /// Ids of everyone currently on a court.
    pub fn on_court(&self) -> Vec<ParticipantId> {
        self.courts
            .iter()
            .flat_map(|c| c.occupancy.participants())
            .collect()
    }

    /// True if the participant is on a court or resting.
    pub fn contains(&self, id: &str) -> bool {
        self.resting.contains(id) || self.courts.iter().any(|c| c.occupancy.contains(id))
    }

    fn display_name(&self, id: &str) -> String {
        self.roster
            .get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Read-only snapshot for presentation.
    pub fn view(&self) -> SessionView {
        let courts = self
            .courts
            .iter()
            .map(|c| CourtView {
                number: c.number,
                pending: self.is_pending(c.number),
                teams: match &c.occupancy {
                    CourtOccupancy::Empty => None,
                    CourtOccupancy::Occupied { team_x, team_y } => Some((
                        team_x.iter().map(|id| self.entry(id)).collect(),
                        team_y.iter().map(|id| self.entry(id)).collect(),
                    )),
                },
            })
            .collect();
        let resting = self.resting.iter().map(|id| self.entry(id)).collect();
        SessionView {
            id: self.id,
            phase: self.phase,
            courts,
            resting,
            can_add_court: self.can_add_court(),
            special_pair_ratio: self.history.special().ratio(),
        }
    }

    fn entry(&self, id: &ParticipantId) -> ParticipantEntry {
        ParticipantEntry {
            id: id.clone(),
            name: self.display_name(id),
            rest_count: self.resting.rest_count(id),
        }
    }
}

/// Participant as shown on a court or in the resting list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ParticipantEntry {
    pub id: ParticipantId,
    pub name: String,
    pub rest_count: u32,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CourtView {
    pub number: CourtNumber,
    /// A result for this court is being recorded.
    pub pending: bool,
    /// (team X, team Y), or None when the court is empty.
    pub teams: Option<(Vec<ParticipantEntry>, Vec<ParticipantEntry>)>,
}

/// Derived view of a session (for API / display).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub phase: SessionPhase,
    pub courts: Vec<CourtView>,
    pub resting: Vec<ParticipantEntry>,
    pub can_add_court: bool,
    pub special_pair_ratio: f64,
}
