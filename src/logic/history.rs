//! In-session teammate/opponent counters and the special-pair tracker.

use crate::config::SpecialPair;
use crate::models::ParticipantId;
use std::collections::HashMap;

/// Unordered pair of distinct participants, stored in sorted order.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct PairKey(ParticipantId, ParticipantId);

impl PairKey {
    /// None for a participant paired with itself.
    fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self(a.to_string(), b.to_string())),
            std::cmp::Ordering::Greater => Some(Self(b.to_string(), a.to_string())),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Counts games in which both special participants played, and how many of those they shared a team.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpecialBiasTracker {
    pair: Option<SpecialPair>,
    together: u32,
    teamed: u32,
}

impl SpecialBiasTracker {
    pub fn new(pair: Option<SpecialPair>) -> Self {
        Self {
            pair,
            together: 0,
            teamed: 0,
        }
    }

    pub fn pair(&self) -> Option<&SpecialPair> {
        self.pair.as_ref()
    }

    /// Games in which both designated participants appeared.
    pub fn together_count(&self) -> u32 {
        self.together
    }

    /// Subset of `together_count` in which they were teammates.
    pub fn teammate_count(&self) -> u32 {
        self.teamed
    }

    /// Running teammate ratio, 0 before they have shared a game.
    pub fn ratio(&self) -> f64 {
        if self.together > 0 {
            f64::from(self.teamed) / f64::from(self.together)
        } else {
            0.0
        }
    }

    /// Both designated participants are among `ids`.
    pub fn both_in(&self, ids: &[ParticipantId]) -> bool {
        match &self.pair {
            Some(pair) => {
                ids.iter().any(|id| pair.is_first(id)) && ids.iter().any(|id| pair.is_second(id))
            }
            None => false,
        }
    }

    /// Update the counters for a finished game.
    pub fn record_game(&mut self, winners: &[ParticipantId], losers: &[ParticipantId]) {
        let all: Vec<ParticipantId> = winners.iter().chain(losers).cloned().collect();
        if !self.both_in(&all) {
            return;
        }
        self.together += 1;
        if self.both_in(winners) || self.both_in(losers) {
            self.teamed += 1;
        }
    }

    /// Cost adjustment for a candidate split: negative when it teams them and the ratio is below target.
    pub fn bias_cost(
        &self,
        team_x: &[ParticipantId],
        team_y: &[ParticipantId],
        desired_ratio: f64,
        weight: f64,
    ) -> f64 {
        let four: Vec<ParticipantId> = team_x.iter().chain(team_y).cloned().collect();
        if !self.both_in(&four) {
            return 0.0;
        }
        let delta = desired_ratio - self.ratio();
        let sign = if self.both_in(team_x) || self.both_in(team_y) {
            -1.0
        } else {
            1.0
        };
        sign * weight * delta
    }
}

/// Symmetric per-pair teammate and opponent counts for the current session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PairingHistory {
    teammates: HashMap<PairKey, u32>,
    opponents: HashMap<PairKey, u32>,
    special: SpecialBiasTracker,
}

impl PairingHistory {
    pub fn new(special_pair: Option<SpecialPair>) -> Self {
        Self::with_special(SpecialBiasTracker::new(special_pair))
    }

    /// Empty pair counts on top of an existing special-pair tracker.
    pub fn with_special(special: SpecialBiasTracker) -> Self {
        Self {
            teammates: HashMap::new(),
            opponents: HashMap::new(),
            special,
        }
    }

    pub fn teammate_count(&self, a: &str, b: &str) -> u32 {
        PairKey::new(a, b)
            .and_then(|k| self.teammates.get(&k).copied())
            .unwrap_or(0)
    }

    pub fn opponent_count(&self, a: &str, b: &str) -> u32 {
        PairKey::new(a, b)
            .and_then(|k| self.opponents.get(&k).copied())
            .unwrap_or(0)
    }

    pub fn special(&self) -> &SpecialBiasTracker {
        &self.special
    }

    /// Set counts directly (seeding a history, e.g. for replay).
    pub fn set_teammate_count(&mut self, a: &str, b: &str, count: u32) {
        if let Some(k) = PairKey::new(a, b) {
            self.teammates.insert(k, count);
        }
    }

    pub fn set_opponent_count(&mut self, a: &str, b: &str, count: u32) {
        if let Some(k) = PairKey::new(a, b) {
            self.opponents.insert(k, count);
        }
    }

    /// Count a finished game: one teammate increment per two-player team, one opponent
    /// increment per (winner, loser) pair, and the special-pair counters.
    pub fn record_game(&mut self, winners: &[ParticipantId], losers: &[ParticipantId]) {
        for team in [winners, losers] {
            if let [a, b] = team {
                Self::bump(&mut self.teammates, a, b);
            }
        }
        for w in winners {
            for l in losers {
                Self::bump(&mut self.opponents, w, l);
            }
        }
        self.special.record_game(winners, losers);
    }

    fn bump(counts: &mut HashMap<PairKey, u32>, a: &str, b: &str) {
        if let Some(k) = PairKey::new(a, b) {
            *counts.entry(k).or_insert(0) += 1;
        }
    }
}
