//! Court, its occupancy, and the two sides of a 2v2 game.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Stable court number within a session.
pub type CourtNumber = u32;

/// Two participants playing together. Order carries no meaning.
pub type Team = [ParticipantId; 2];

/// Which side of a court won the game.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    #[default]
    X,
    Y,
}

/// What a court currently hosts.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CourtOccupancy {
    /// No game; eligible for refill.
    #[default]
    Empty,
    Occupied { team_x: Team, team_y: Team },
}

impl CourtOccupancy {
    pub fn is_empty(&self) -> bool {
        matches!(self, CourtOccupancy::Empty)
    }

    /// All four participants on the court (team X first), or none.
    pub fn participants(&self) -> Vec<ParticipantId> {
        match self {
            CourtOccupancy::Empty => Vec::new(),
            CourtOccupancy::Occupied { team_x, team_y } => {
                team_x.iter().chain(team_y.iter()).cloned().collect()
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        match self {
            CourtOccupancy::Empty => false,
            CourtOccupancy::Occupied { team_x, team_y } => {
                team_x.iter().chain(team_y.iter()).any(|p| p == id)
            }
        }
    }

    /// (winners, losers) when `side` wins, or None on an empty court.
    pub fn split_by_winner(&self, side: TeamSide) -> Option<(Team, Team)> {
        match self {
            CourtOccupancy::Empty => None,
            CourtOccupancy::Occupied { team_x, team_y } => Some(match side {
                TeamSide::X => (team_x.clone(), team_y.clone()),
                TeamSide::Y => (team_y.clone(), team_x.clone()),
            }),
        }
    }
}

/// A court slot hosting at most one game.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub number: CourtNumber,
    pub occupancy: CourtOccupancy,
}

impl Court {
    pub fn new(number: CourtNumber, occupancy: CourtOccupancy) -> Self {
        Self { number, occupancy }
    }
}
