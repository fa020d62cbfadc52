//! Rotation logic: rating, pairing history, team selection, rest queue and session commands.

mod courts;
mod history;
mod rating;
mod recorder;
mod rest_queue;
mod setup;
mod team_selector;

pub use courts::{
    add_court, add_late_participant, check_late_participant, delete_court, edit_court,
    refill_empty_courts, register_late_participant, resolve_late_participant, LateParticipant,
};
pub use history::{PairingHistory, SpecialBiasTracker};
pub use rating::{rating, PROVISIONAL_GAMES, PROVISIONAL_RATING};
pub use recorder::{
    abandon_finish_game, begin_finish_game, begin_finish_game_by_side, complete_finish_game,
    finish_game, PendingMatch,
};
pub use rest_queue::{pop_random, RestQueue};
pub use setup::{end_session, load_participants, register_participant, start_session};
pub use team_selector::{best_split, pairing_cost, score_splits, select_teams, Split};
