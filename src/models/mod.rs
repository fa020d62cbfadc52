//! Data structures for court rotation: participants, courts, match records, session state.

mod court;
mod match_record;
mod participant;
mod session;

pub use court::{Court, CourtNumber, CourtOccupancy, Team, TeamSide};
pub use match_record::{GameResult, MatchKey, MatchRecord, RecordedParticipant, StatUpdate};
pub use participant::{normalize_id, Participant, ParticipantId};
pub use session::{
    CourtView, ParticipantEntry, Session, SessionError, SessionId, SessionPhase, SessionView,
};
