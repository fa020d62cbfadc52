//! Skill score used to balance teams.

use crate::models::Participant;

/// Games needed before a participant's winrate is trusted.
pub const PROVISIONAL_GAMES: u32 = 10;
/// Score given to participants below `PROVISIONAL_GAMES`.
pub const PROVISIONAL_RATING: f64 = 0.5;

/// Winrate for established participants, 0.5 for under-sampled ones.
pub fn rating(p: &Participant) -> f64 {
    if p.games_played < PROVISIONAL_GAMES {
        PROVISIONAL_RATING
    } else {
        p.winrate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_below_ten_games() {
        assert_eq!(rating(&Participant::with_record("new", 0, 0)), 0.5);
        assert_eq!(rating(&Participant::with_record("early", 1, 4)), 0.5);
        assert_eq!(rating(&Participant::with_record("lucky", 9, 0)), 0.5);
    }

    #[test]
    fn winrate_from_ten_games() {
        assert!((rating(&Participant::with_record("bob", 8, 2)) - 0.8).abs() < 1e-9);
        assert!((rating(&Participant::with_record("eve", 15, 5)) - 0.75).abs() < 1e-9);
    }
}
