//! Active-session court commands: add, delete, manual edit, refill, late arrivals.

use crate::logic::setup::register_participant;
use crate::logic::team_selector::select_teams;
use crate::models::{
    Court, CourtNumber, CourtOccupancy, Participant, ParticipantId, Session, SessionError,
    SessionPhase,
};
use crate::store::ParticipantStore;
use serde::Deserialize;

fn require_active(session: &Session) -> Result<(), SessionError> {
    if session.phase != SessionPhase::Active {
        return Err(SessionError::InvalidState);
    }
    Ok(())
}

/// Draw four participants with the fair scheduler and pick their teams.
/// If team selection fails the drawn participants go back to the queue.
fn seat_from_resting(session: &mut Session) -> Result<CourtOccupancy, SessionError> {
    let window = session.config.refill_window;
    let ids = session.resting.draw(4, window, &mut session.rng);
    let four = ids
        .iter()
        .map(|id| {
            session
                .roster
                .get(id)
                .ok_or_else(|| SessionError::ParticipantNotFound(id.clone()))
        })
        .collect::<Result<Vec<&Participant>, _>>();
    let selected = match four {
        Ok(four) => select_teams(&four, &session.history, &session.config, &mut session.rng),
        Err(e) => Err(e),
    };
    if selected.is_err() {
        session.resting.extend(ids);
    }
    selected
}

/// Fill every empty court in order while at least four participants rest.
/// Returns the numbers of the courts that were filled.
pub fn refill_empty_courts(session: &mut Session) -> Result<Vec<CourtNumber>, SessionError> {
    require_active(session)?;
    let mut filled = Vec::new();
    for idx in 0..session.courts.len() {
        if !session.courts[idx].occupancy.is_empty() || session.resting.len() < 4 {
            continue;
        }
        let occupancy = seat_from_resting(session)?;
        session.courts[idx].occupancy = occupancy;
        filled.push(session.courts[idx].number);
    }
    if !filled.is_empty() {
        log::debug!("refilled court(s) {:?}", filled);
    }
    Ok(filled)
}

/// Open a new court numbered one above the highest existing number, seated from the resting queue.
pub fn add_court(session: &mut Session) -> Result<CourtNumber, SessionError> {
    require_active(session)?;
    if session.resting.len() < 4 {
        return Err(SessionError::InsufficientPlayers {
            required: 4,
            selected: session.resting.len(),
        });
    }
    let number = session.courts.iter().map(|c| c.number).max().unwrap_or(0) + 1;
    let occupancy = seat_from_resting(session)?;
    session.courts.push(Court::new(number, occupancy));
    log::info!("court {} added", number);
    Ok(number)
}

/// Remove a court; its players (if any) join the end of the resting queue.
/// Refused while a result for the court is being recorded.
pub fn delete_court(session: &mut Session, number: CourtNumber) -> Result<(), SessionError> {
    require_active(session)?;
    let idx = session
        .courts
        .iter()
        .position(|c| c.number == number)
        .ok_or(SessionError::CourtNotFound(number))?;
    if session.in_flight.contains(&number) {
        return Err(SessionError::SubmissionInFlight(number));
    }
    let court = session.courts.remove(idx);
    session.resting.extend(court.occupancy.participants());
    log::info!("court {} deleted", number);
    Ok(())
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
    X(usize),
    Y(usize),
    Resting(usize),
}

/// Manually swap participants between the court's teams and the resting queue.
///
/// Each `(a, b)` exchanges the positions of `a` and `b`; both must be on this court or resting.
/// Swaps apply in order and all-or-nothing. Team sizes never change.
pub fn edit_court(
    session: &mut Session,
    number: CourtNumber,
    swaps: &[(ParticipantId, ParticipantId)],
) -> Result<(), SessionError> {
    require_active(session)?;
    let court = session.court(number).ok_or(SessionError::CourtNotFound(number))?;
    if session.in_flight.contains(&number) {
        return Err(SessionError::SubmissionInFlight(number));
    }
    let mut teams = match &court.occupancy {
        CourtOccupancy::Empty => None,
        CourtOccupancy::Occupied { team_x, team_y } => Some((team_x.clone(), team_y.clone())),
    };
    let mut resting = session.resting.clone();

    for (a, b) in swaps {
        if a == b {
            return Err(SessionError::InvalidSwap);
        }
        let locate = |id: &str, teams: &Option<([ParticipantId; 2], [ParticipantId; 2])>| {
            if let Some((x, y)) = teams {
                if let Some(i) = x.iter().position(|p| p == id) {
                    return Some(Slot::X(i));
                }
                if let Some(i) = y.iter().position(|p| p == id) {
                    return Some(Slot::Y(i));
                }
            }
            resting.position(id).map(Slot::Resting)
        };
        let slot_a = locate(a.as_str(), &teams).ok_or(SessionError::InvalidSwap)?;
        let slot_b = locate(b.as_str(), &teams).ok_or(SessionError::InvalidSwap)?;
        for (slot, id) in [(slot_a, b), (slot_b, a)] {
            match (slot, teams.as_mut()) {
                (Slot::X(i), Some((x, _))) => x[i] = id.clone(),
                (Slot::Y(i), Some((_, y))) => y[i] = id.clone(),
                (Slot::Resting(i), _) => {
                    resting.replace_at(i, id.clone());
                }
                _ => return Err(SessionError::InvalidSwap),
            }
        }
    }

    if let Some(court) = session.court_mut(number) {
        court.occupancy = match teams {
            Some((team_x, team_y)) => CourtOccupancy::Occupied { team_x, team_y },
            None => CourtOccupancy::Empty,
        };
    }
    session.resting = resting;
    log::info!("court {} edited ({} swap(s))", number, swaps.len());
    Ok(())
}

/// Someone joining an active session: a registered participant or a new name.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LateParticipant {
    Existing(ParticipantId),
    New(String),
}

/// Append a participant to the end of the resting queue.
pub fn add_late_participant(
    session: &mut Session,
    participant: Participant,
) -> Result<(), SessionError> {
    require_active(session)?;
    if session.contains(&participant.id) {
        return Err(SessionError::ParticipantAlreadyInSession(participant.id));
    }
    log::info!("{} joined the session and is resting", participant.id);
    session.resting.push_back(participant.id.clone());
    session.roster.insert(participant.id.clone(), participant);
    Ok(())
}

/// Checks that can run before touching the store: the session is active and
/// an existing participant is not already in it.
pub fn check_late_participant(session: &Session, late: &LateParticipant) -> Result<(), SessionError> {
    require_active(session)?;
    if let LateParticipant::Existing(id) = late {
        if session.contains(id) {
            return Err(SessionError::ParticipantAlreadyInSession(id.clone()));
        }
    }
    Ok(())
}

/// Look up (or register) a late participant in the store.
pub async fn resolve_late_participant<S: ParticipantStore>(
    store: &S,
    late: LateParticipant,
) -> Result<Participant, SessionError> {
    match late {
        LateParticipant::Existing(id) => store
            .get_participant(&id)
            .await?
            .ok_or(SessionError::ParticipantNotFound(id)),
        LateParticipant::New(name) => register_participant(store, &name).await,
    }
}

/// Resolve a late participant through the store and add them to the resting queue.
pub async fn register_late_participant<S: ParticipantStore>(
    session: &mut Session,
    store: &S,
    late: LateParticipant,
) -> Result<ParticipantId, SessionError> {
    check_late_participant(session, &late)?;
    let participant = resolve_late_participant(store, late).await?;
    let id = participant.id.clone();
    add_late_participant(session, participant)?;
    Ok(id)
}
