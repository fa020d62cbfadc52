//! Tuning knobs for team selection and the rest queue.

use crate::models::{normalize_id, ParticipantId};

/// Weight of repeated teammates in the pairing cost.
pub const DEFAULT_ALPHA_PARTNER: f64 = 1.0;
/// Weight of repeated opponents in the pairing cost.
pub const DEFAULT_BETA_OPPONENT: f64 = 0.5;
/// How many of the longest-rested participants a refill draws from.
pub const DEFAULT_REFILL_WINDOW: usize = 8;
/// Target share of shared games in which the special pair are teammates.
pub const DEFAULT_SPECIAL_DESIRED_RATIO: f64 = 0.60;
/// Strength of the special-pair bias relative to balance and repeat penalties.
pub const DEFAULT_SPECIAL_WEIGHT: f64 = 2.0;

/// Two designated participants nudged toward being teammates at a target frequency.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpecialPair {
    pub first: ParticipantId,
    pub second: ParticipantId,
}

impl SpecialPair {
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            first: normalize_id(first),
            second: normalize_id(second),
        }
    }

    /// Parse `"a,b"`. None unless there are exactly two distinct non-empty names.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(',').map(normalize_id);
        let first = parts.next()?;
        let second = parts.next()?;
        if parts.next().is_some() || first.is_empty() || second.is_empty() || first == second {
            return None;
        }
        Some(Self { first, second })
    }

    pub fn is_first(&self, id: &str) -> bool {
        self.first == id
    }

    pub fn is_second(&self, id: &str) -> bool {
        self.second == id
    }
}

/// Engine configuration: cost weights, refill window and the optional special pair.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub alpha_partner: f64,
    pub beta_opponent: f64,
    pub refill_window: usize,
    pub special_desired_ratio: f64,
    pub special_weight: f64,
    pub special_pair: Option<SpecialPair>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alpha_partner: DEFAULT_ALPHA_PARTNER,
            beta_opponent: DEFAULT_BETA_OPPONENT,
            refill_window: DEFAULT_REFILL_WINDOW,
            special_desired_ratio: DEFAULT_SPECIAL_DESIRED_RATIO,
            special_weight: DEFAULT_SPECIAL_WEIGHT,
            special_pair: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `REFILL_WINDOW`, `SPECIAL_PAIR` ("a,b"), `SPECIAL_DESIRED_RATIO`
    /// and `SPECIAL_WEIGHT`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let refill_window = std::env::var("REFILL_WINDOW")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|w: &usize| *w > 0)
            .unwrap_or(defaults.refill_window);
        let special_desired_ratio = std::env::var("SPECIAL_DESIRED_RATIO")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|r: &f64| (0.0..=1.0).contains(r))
            .unwrap_or(defaults.special_desired_ratio);
        let special_weight = std::env::var("SPECIAL_WEIGHT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.special_weight);
        let special_pair = std::env::var("SPECIAL_PAIR")
            .ok()
            .and_then(|v| SpecialPair::parse(&v));
        Self {
            refill_window,
            special_desired_ratio,
            special_weight,
            special_pair,
            ..defaults
        }
    }

    pub fn with_special_pair(mut self, first: &str, second: &str) -> Self {
        self.special_pair = Some(SpecialPair::new(first, second));
        self
    }

    pub fn with_refill_window(mut self, window: usize) -> Self {
        self.refill_window = window.max(1);
        self
    }
}
