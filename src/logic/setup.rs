//! Session lifecycle: start (Setup -> Active), end (Active -> Setup), and the registry calls setup needs.

use crate::logic::rest_queue::{pop_random, RestQueue};
use crate::logic::team_selector::select_teams;
use crate::models::{
    normalize_id, Court, Participant, ParticipantId, Session, SessionError, SessionPhase,
};
use crate::store::{ParticipantStore, UpsertOutcome};
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Start the session: seat four random participants per court, rest the remainder.
///
/// Requires Setup, `court_count > 0` and at least `4 * court_count` distinct participants.
/// Pairing history, rest counts and match sequence counters all start from zero.
pub fn start_session(
    session: &mut Session,
    court_count: u32,
    participants: Vec<Participant>,
) -> Result<(), SessionError> {
    if session.phase != SessionPhase::Setup {
        return Err(SessionError::InvalidState);
    }
    if court_count == 0 {
        return Err(SessionError::InvalidCourtCount);
    }
    let mut seen = HashSet::new();
    let participants: Vec<Participant> = participants
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .collect();
    let required = court_count as usize * 4;
    if participants.len() < required {
        return Err(SessionError::InsufficientPlayers {
            required,
            selected: participants.len(),
        });
    }

    session.reset();
    session.roster = participants
        .iter()
        .map(|p| (p.id.clone(), p.clone()))
        .collect();

    let mut pool: Vec<ParticipantId> = participants.into_iter().map(|p| p.id).collect();
    pool.shuffle(&mut session.rng);

    let mut courts = Vec::with_capacity(court_count as usize);
    for number in 1..=court_count {
        let ids = pop_random(&mut pool, 4, &mut session.rng);
        let four = ids
            .iter()
            .map(|id| {
                session
                    .roster
                    .get(id)
                    .ok_or_else(|| SessionError::ParticipantNotFound(id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let occupancy = select_teams(&four, &session.history, &session.config, &mut session.rng)?;
        courts.push(Court::new(number, occupancy));
    }
    session.courts = courts;
    session.resting = RestQueue::from_ids(pool);
    session.phase = SessionPhase::Active;
    log::info!(
        "session {} started: {} court(s), {} player(s), {} resting",
        session.id,
        court_count,
        session.roster.len(),
        session.resting.len()
    );
    Ok(())
}

/// End the session and return to Setup with a fresh identifier. Destructive: needs `confirmed`.
///
/// Refused while any match submission is outstanding.
pub fn end_session(session: &mut Session, confirmed: bool) -> Result<(), SessionError> {
    if session.phase != SessionPhase::Active {
        return Err(SessionError::InvalidState);
    }
    if !confirmed {
        return Err(SessionError::ConfirmationRequired);
    }
    if let Some(&court) = session.in_flight.iter().min() {
        return Err(SessionError::SubmissionInFlight(court));
    }
    let ended = session.id;
    session.reset();
    log::info!("session {} ended; new session {}", ended, session.id);
    Ok(())
}

/// Resolve selected ids into participant snapshots from the registry.
pub async fn load_participants<S: ParticipantStore>(
    store: &S,
    ids: &[ParticipantId],
) -> Result<Vec<Participant>, SessionError> {
    let mut participants = Vec::with_capacity(ids.len());
    for id in ids {
        let p = store
            .get_participant(id)
            .await?
            .ok_or_else(|| SessionError::ParticipantNotFound(id.clone()))?;
        participants.push(p);
    }
    Ok(participants)
}

/// Add a new participant with a zeroed record to the registry.
pub async fn register_participant<S: ParticipantStore>(
    store: &S,
    name: &str,
) -> Result<Participant, SessionError> {
    let name = name.trim();
    if normalize_id(name).is_empty() {
        return Err(SessionError::InvalidName);
    }
    let participant = Participant::new(name);
    match store.upsert_participant(participant.clone()).await? {
        UpsertOutcome::Created => {
            log::info!("registered player {}", participant.id);
            Ok(participant)
        }
        UpsertOutcome::AlreadyExists => Err(SessionError::DuplicateParticipant(name.to_string())),
    }
}
