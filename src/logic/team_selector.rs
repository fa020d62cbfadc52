//! Team selection: split four participants into the cheapest pair of teams.

use crate::config::EngineConfig;
use crate::logic::history::PairingHistory;
use crate::logic::rating::rating;
use crate::models::{CourtOccupancy, Participant, ParticipantId, SessionError, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// The three ways to split players 0..4 into two pairs, in tie-break precedence order.
const SPLITS: [([usize; 2], [usize; 2]); 3] = [([0, 1], [2, 3]), ([0, 2], [1, 3]), ([0, 3], [1, 2])];

/// A scored candidate split.
#[derive(Clone, Debug, PartialEq)]
pub struct Split {
    pub team_x: Team,
    pub team_y: Team,
    pub cost: f64,
}

fn ids(team: [&Participant; 2]) -> Team {
    [team[0].id.clone(), team[1].id.clone()]
}

/// Total cost of playing `team_x` against `team_y`:
/// rating imbalance, repeated teammates, repeated opponents and the special-pair bias.
pub fn pairing_cost(
    team_x: [&Participant; 2],
    team_y: [&Participant; 2],
    history: &PairingHistory,
    config: &EngineConfig,
) -> f64 {
    let avg_x = (rating(team_x[0]) + rating(team_x[1])) / 2.0;
    let avg_y = (rating(team_y[0]) + rating(team_y[1])) / 2.0;
    let balance_cost = (avg_x - avg_y).abs();

    let partner_penalty = history.teammate_count(&team_x[0].id, &team_x[1].id)
        + history.teammate_count(&team_y[0].id, &team_y[1].id);

    let mut opponent_penalty = 0;
    for a in team_x {
        for b in team_y {
            opponent_penalty += history.opponent_count(&a.id, &b.id);
        }
    }

    let special = history.special().bias_cost(
        &ids(team_x),
        &ids(team_y),
        config.special_desired_ratio,
        config.special_weight,
    );

    balance_cost
        + config.alpha_partner * f64::from(partner_penalty)
        + config.beta_opponent * f64::from(opponent_penalty)
        + special
}

/// Score all three splits of `group`, in precedence order.
pub fn score_splits(
    group: &[&Participant],
    history: &PairingHistory,
    config: &EngineConfig,
) -> Result<Vec<Split>, SessionError> {
    let distinct: HashSet<&ParticipantId> = group.iter().map(|p| &p.id).collect();
    if group.len() != 4 || distinct.len() != 4 {
        log::error!("team selection given {} players ({} distinct)", group.len(), distinct.len());
        return Err(SessionError::InvalidGroupSize(distinct.len()));
    }
    Ok(SPLITS
        .iter()
        .map(|(x, y)| {
            let team_x = [group[x[0]], group[x[1]]];
            let team_y = [group[y[0]], group[y[1]]];
            Split {
                team_x: ids(team_x),
                team_y: ids(team_y),
                cost: pairing_cost(team_x, team_y, history, config),
            }
        })
        .collect())
}

/// Cheapest split; ties keep the earliest candidate.
pub fn best_split(
    group: &[&Participant],
    history: &PairingHistory,
    config: &EngineConfig,
) -> Result<Split, SessionError> {
    let mut splits = score_splits(group, history, config)?.into_iter();
    let mut best = splits.next().ok_or(SessionError::InvalidGroupSize(0))?;
    for split in splits {
        if split.cost < best.cost {
            best = split;
        }
    }
    Ok(best)
}

/// Choose teams for a court. Order within each team is shuffled; membership is not.
pub fn select_teams<R: Rng + ?Sized>(
    group: &[&Participant],
    history: &PairingHistory,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<CourtOccupancy, SessionError> {
    let Split {
        mut team_x,
        mut team_y,
        cost,
    } = best_split(group, history, config)?;
    log::debug!("selected {:?} vs {:?} (cost {:.3})", team_x, team_y, cost);
    team_x.shuffle(rng);
    team_y.shuffle(rng);
    Ok(CourtOccupancy::Occupied { team_x, team_y })
}
