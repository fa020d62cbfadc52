//! Match recording: finish a court's game, persist it atomically, then rotate players.
//!
//! Recording is split around the store call so the session is never borrowed across it:
//! [`begin_finish_game`] validates and locks the court, the caller runs the store
//! transaction, and [`complete_finish_game`] commits or reverts the in-memory effects.

use crate::logic::courts::refill_empty_courts;
use crate::models::{
    CourtNumber, CourtOccupancy, GameResult, MatchKey, MatchRecord, Participant, ParticipantId,
    RecordedParticipant, Session, SessionError, SessionId, SessionPhase, StatUpdate, Team,
    TeamSide,
};
use crate::store::{ParticipantStore, StoreError};
use chrono::Utc;
use std::collections::HashSet;

/// A submitted result waiting for the store.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingMatch {
    pub session_id: SessionId,
    pub court_number: CourtNumber,
    pub key: MatchKey,
    pub record: MatchRecord,
    pub updates: Vec<StatUpdate>,
    pub winners: Team,
    pub losers: Team,
}

fn same_members(a: &[ParticipantId], b: &[ParticipantId]) -> bool {
    let a: HashSet<&ParticipantId> = a.iter().collect();
    let b: HashSet<&ParticipantId> = b.iter().collect();
    a == b
}

/// Validate a result for `court`, take the next match key and lock the court.
///
/// `winners` and `losers` must be the court's two teams, in either order. The sequence
/// counter advances here, so a retried submission gets a new key.
pub fn begin_finish_game(
    session: &mut Session,
    court: CourtNumber,
    winners: &[ParticipantId],
    losers: &[ParticipantId],
) -> Result<PendingMatch, SessionError> {
    if session.phase != SessionPhase::Active {
        return Err(SessionError::InvalidState);
    }
    let c = session.court(court).ok_or(SessionError::CourtNotFound(court))?;
    if session.in_flight.contains(&court) {
        return Err(SessionError::SubmissionInFlight(court));
    }
    let (team_x, team_y) = match &c.occupancy {
        CourtOccupancy::Empty => return Err(SessionError::CourtEmpty(court)),
        CourtOccupancy::Occupied { team_x, team_y } => (team_x, team_y),
    };
    let (winners, losers) = if same_members(winners, team_x) && same_members(losers, team_y) {
        (team_x.clone(), team_y.clone())
    } else if same_members(winners, team_y) && same_members(losers, team_x) {
        (team_y.clone(), team_x.clone())
    } else {
        return Err(SessionError::TeamsMismatch);
    };

    let recorded = |ids: &Team| -> Result<Vec<RecordedParticipant>, SessionError> {
        ids.iter()
            .map(|id| {
                session
                    .roster
                    .get(id)
                    .map(RecordedParticipant::from)
                    .ok_or_else(|| SessionError::ParticipantNotFound(id.clone()))
            })
            .collect()
    };
    let record = MatchRecord {
        court_number: court,
        winners: recorded(&winners)?,
        losers: recorded(&losers)?,
        timestamp: Utc::now(),
    };
    let updates = winners
        .iter()
        .map(|id| (id, GameResult::Win))
        .chain(losers.iter().map(|id| (id, GameResult::Loss)))
        .map(|(id, result)| StatUpdate {
            participant_id: id.clone(),
            result,
        })
        .collect();

    let sequence = session.sequences.entry(court).or_insert(0);
    *sequence += 1;
    let key = MatchKey::new(court, *sequence);
    session.in_flight.insert(court);
    log::debug!("recording {} for session {}", key, session.id);

    Ok(PendingMatch {
        session_id: session.id,
        court_number: court,
        key,
        record,
        updates,
        winners,
        losers,
    })
}

/// Same as [`begin_finish_game`], naming the winning side instead of listing players.
pub fn begin_finish_game_by_side(
    session: &mut Session,
    court: CourtNumber,
    winner: TeamSide,
) -> Result<PendingMatch, SessionError> {
    let (winners, losers) = session
        .court(court)
        .ok_or(SessionError::CourtNotFound(court))?
        .occupancy
        .split_by_winner(winner)
        .ok_or(SessionError::CourtEmpty(court))?;
    begin_finish_game(session, court, &winners, &losers)
}

/// Apply the store's answer to a pending result.
///
/// On success: refresh participant snapshots, count the pairing, credit everyone resting,
/// queue the four players, empty the court and refill empty courts. Returns refilled courts.
/// On failure: only unlock the court; queue, history and courts stay as they were.
pub fn complete_finish_game(
    session: &mut Session,
    pending: PendingMatch,
    outcome: Result<Vec<Participant>, StoreError>,
) -> Result<Vec<CourtNumber>, SessionError> {
    if pending.session_id != session.id {
        log::warn!(
            "dropping result {} for ended session {}",
            pending.key,
            pending.session_id
        );
        return Err(SessionError::StaleSubmission);
    }
    session.in_flight.remove(&pending.court_number);

    let updated = match outcome {
        Ok(updated) => updated,
        Err(e) => {
            log::warn!("failed to record match {}: {}", pending.key, e);
            return Err(e.into());
        }
    };

    for p in updated {
        if let Some(snapshot) = session.roster.get_mut(&p.id) {
            *snapshot = p;
        }
    }
    session.history.record_game(&pending.winners, &pending.losers);
    session.resting.credit_rest();
    session
        .resting
        .extend(pending.winners.iter().chain(pending.losers.iter()).cloned());
    if let Some(court) = session.court_mut(pending.court_number) {
        court.occupancy = CourtOccupancy::Empty;
    }
    log::info!(
        "match {} recorded: {:?} beat {:?}",
        pending.key,
        pending.winners,
        pending.losers
    );
    refill_empty_courts(session)
}

/// Give up on a pending result without recording it: the court unlocks and nothing else changes.
/// The sequence number stays used, so a later submission gets the next key.
pub fn abandon_finish_game(session: &mut Session, pending: &PendingMatch) -> Result<(), SessionError> {
    if pending.session_id != session.id {
        return Err(SessionError::StaleSubmission);
    }
    if session.in_flight.remove(&pending.court_number) {
        log::warn!("abandoned result {} for court {}", pending.key, pending.court_number);
    }
    Ok(())
}

/// Unlocks the court if dropped before the store call resolves.
struct InFlightGuard<'a> {
    session: &'a mut Session,
    court: CourtNumber,
    armed: bool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.session.in_flight.remove(&self.court);
            log::warn!("result for court {} cancelled before it was recorded", self.court);
        }
    }
}

/// Record a finished game end to end: validate, persist atomically, then rotate.
///
/// Holds the session for the duration of the store call; callers sharing a session
/// between tasks should use the begin/complete pair instead. Dropping the returned
/// future before it resolves unlocks the court.
pub async fn finish_game<S: ParticipantStore>(
    session: &mut Session,
    store: &S,
    court: CourtNumber,
    winners: &[ParticipantId],
    losers: &[ParticipantId],
) -> Result<Vec<CourtNumber>, SessionError> {
    let pending = begin_finish_game(session, court, winners, losers)?;
    let mut guard = InFlightGuard {
        session,
        court: pending.court_number,
        armed: true,
    };
    let outcome = store
        .transactional_record_match(
            pending.session_id,
            &pending.key,
            &pending.record,
            &pending.updates,
        )
        .await;
    guard.armed = false;
    complete_finish_game(&mut *guard.session, pending, outcome)
}
