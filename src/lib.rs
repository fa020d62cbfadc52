//! Court rotation organizer: library with models, rotation logic and the store boundary.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{EngineConfig, SpecialPair};
pub use logic::{
    abandon_finish_game, add_court, add_late_participant, begin_finish_game,
    begin_finish_game_by_side, best_split, check_late_participant, complete_finish_game,
    delete_court, edit_court, end_session, finish_game, load_participants, pairing_cost,
    pop_random, rating, refill_empty_courts, register_late_participant, register_participant,
    resolve_late_participant, score_splits, select_teams, start_session, LateParticipant,
    PairingHistory, PendingMatch, RestQueue, SpecialBiasTracker, Split,
};
pub use models::{
    normalize_id, Court, CourtNumber, CourtOccupancy, CourtView, GameResult, MatchKey,
    MatchRecord, Participant, ParticipantEntry, ParticipantId, RecordedParticipant, Session,
    SessionError, SessionId, SessionPhase, SessionView, StatUpdate, Team, TeamSide,
};
pub use store::{MemoryStore, ParticipantStore, StoreError, UpsertOutcome};
