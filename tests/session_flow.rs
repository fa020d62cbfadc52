//! Integration tests for the session lifecycle and court commands.

use court_rotation::{
    add_court, add_late_participant, delete_court, edit_court, end_session, refill_empty_courts,
    start_session, CourtOccupancy, EngineConfig, Participant, Session, SessionError,
    SessionPhase,
};
use std::collections::HashSet;

fn players(n: usize) -> Vec<Participant> {
    (0..n).map(|i| Participant::new(format!("P{i}"))).collect()
}

fn session_with(n: usize, courts: u32) -> Session {
    let mut s = Session::with_seed(EngineConfig::default(), 42);
    start_session(&mut s, courts, players(n)).unwrap();
    s
}

/// Court players and resting players are disjoint and together make up `roster`.
fn assert_partition(s: &Session, roster: &HashSet<String>) {
    let on_court = s.on_court();
    let resting: Vec<String> = s.resting().iter().cloned().collect();
    let mut seen = HashSet::new();
    for id in on_court.iter().chain(resting.iter()) {
        assert!(seen.insert(id.clone()), "{id} appears twice");
    }
    assert_eq!(&seen, roster);
}

fn roster_ids(n: usize) -> HashSet<String> {
    players(n).into_iter().map(|p| p.id).collect()
}

fn occupied(s: &Session, number: u32) -> ([String; 2], [String; 2]) {
    match &s.court(number).unwrap().occupancy {
        CourtOccupancy::Occupied { team_x, team_y } => (team_x.clone(), team_y.clone()),
        CourtOccupancy::Empty => panic!("court {number} is empty"),
    }
}

#[test]
fn start_requires_four_players_per_court() {
    let mut s = Session::with_seed(EngineConfig::default(), 1);
    assert_eq!(
        start_session(&mut s, 2, players(7)),
        Err(SessionError::InsufficientPlayers {
            required: 8,
            selected: 7
        })
    );
    assert_eq!(start_session(&mut s, 0, players(8)), Err(SessionError::InvalidCourtCount));
    assert_eq!(s.phase(), SessionPhase::Setup);
    assert!(s.courts().is_empty());
}

#[test]
fn start_ignores_duplicate_selections() {
    let mut s = Session::with_seed(EngineConfig::default(), 1);
    let mut selected = players(7);
    selected.push(Participant::new("p0"));
    assert!(matches!(
        start_session(&mut s, 2, selected),
        Err(SessionError::InsufficientPlayers { selected: 7, .. })
    ));
}

#[test]
fn start_seats_courts_and_rests_the_remainder() {
    let mut s = Session::with_seed(EngineConfig::default(), 7);
    let setup_id = s.id();
    start_session(&mut s, 2, players(10)).unwrap();

    assert_eq!(s.phase(), SessionPhase::Active);
    assert_ne!(s.id(), setup_id);
    assert_eq!(s.courts().len(), 2);
    assert_eq!(s.courts()[0].number, 1);
    assert_eq!(s.courts()[1].number, 2);
    assert_eq!(s.on_court().len(), 8);
    assert_eq!(s.resting().len(), 2);
    assert_eq!(s.sequence(1), 0);
    assert_eq!(s.history().special().together_count(), 0);
    assert_partition(&s, &roster_ids(10));
    assert!(!s.can_add_court());

    assert_eq!(start_session(&mut s, 1, players(4)), Err(SessionError::InvalidState));
}

#[test]
fn add_court_draws_four_resting_players() {
    let mut s = session_with(9, 1);
    assert!(s.can_add_court());
    assert_eq!(add_court(&mut s), Ok(2));
    assert_eq!(s.resting().len(), 1);
    assert!(!s.court(2).unwrap().occupancy.is_empty());
    assert_partition(&s, &roster_ids(9));

    assert_eq!(
        add_court(&mut s),
        Err(SessionError::InsufficientPlayers {
            required: 4,
            selected: 1
        })
    );
    assert_eq!(s.courts().len(), 2);
}

#[test]
fn delete_court_rests_its_players_and_numbers_stay_unique() {
    let mut s = session_with(12, 3);
    let (x, y) = occupied(&s, 2);
    delete_court(&mut s, 2).unwrap();

    assert_eq!(s.courts().len(), 2);
    assert!(s.court(2).is_none());
    let tail: Vec<String> = s.resting().iter().rev().take(4).rev().cloned().collect();
    assert_eq!(tail, x.iter().chain(y.iter()).cloned().collect::<Vec<_>>());
    assert_partition(&s, &roster_ids(12));

    assert_eq!(add_court(&mut s), Ok(4));
    assert_eq!(delete_court(&mut s, 9), Err(SessionError::CourtNotFound(9)));
}

#[test]
fn edit_court_swaps_between_teams_and_resting() {
    let mut s = session_with(6, 1);
    let (x, y) = occupied(&s, 1);
    let resting: Vec<String> = s.resting().iter().cloned().collect();

    edit_court(
        &mut s,
        1,
        &[(x[0].clone(), resting[1].clone()), (x[1].clone(), y[0].clone())],
    )
    .unwrap();

    let (nx, ny) = occupied(&s, 1);
    assert_eq!(nx, [resting[1].clone(), y[0].clone()]);
    assert_eq!(ny, [x[1].clone(), y[1].clone()]);
    assert_eq!(s.resting().as_slice(), &[resting[0].clone(), x[0].clone()]);
    assert_partition(&s, &roster_ids(6));
}

#[test]
fn invalid_edit_changes_nothing() {
    let mut s = session_with(6, 1);
    let before_courts = s.courts().to_vec();
    let before_resting = s.resting().clone();
    let (x, _) = occupied(&s, 1);

    let bad = [
        (x[0].clone(), "p0".to_string()),
        (x[1].clone(), "nobody".to_string()),
    ];
    assert_eq!(edit_court(&mut s, 1, &bad), Err(SessionError::InvalidSwap));
    assert_eq!(
        edit_court(&mut s, 1, &[(x[0].clone(), x[0].clone())]),
        Err(SessionError::InvalidSwap)
    );
    assert_eq!(edit_court(&mut s, 5, &[]), Err(SessionError::CourtNotFound(5)));
    assert_eq!(s.courts(), &before_courts[..]);
    assert_eq!(s.resting(), &before_resting);
}

#[test]
fn late_participants_join_the_end_of_the_queue() {
    let mut s = session_with(7, 1);
    add_late_participant(&mut s, Participant::new("Zed")).unwrap();
    assert_eq!(s.resting().as_slice().last().map(String::as_str), Some("zed"));
    assert_eq!(s.participant("zed").unwrap().name, "Zed");
    assert!(s.can_add_court());

    assert_eq!(
        add_late_participant(&mut s, Participant::new("zed")),
        Err(SessionError::ParticipantAlreadyInSession("zed".into()))
    );
    let on_court = s.on_court()[0].clone();
    assert_eq!(
        add_late_participant(&mut s, Participant::new(on_court.clone())),
        Err(SessionError::ParticipantAlreadyInSession(on_court))
    );

    let mut roster = roster_ids(7);
    roster.insert("zed".into());
    assert_partition(&s, &roster);
}

#[test]
fn courts_can_be_rebuilt_after_deleting_all() {
    let mut s = session_with(12, 2);
    delete_court(&mut s, 1).unwrap();
    delete_court(&mut s, 2).unwrap();
    assert_eq!(s.resting().len(), 12);
    assert!(s.courts().is_empty());
    assert_eq!(refill_empty_courts(&mut s), Ok(vec![]));

    add_court(&mut s).unwrap();
    add_court(&mut s).unwrap();
    assert_eq!(s.resting().len(), 4);
    assert_partition(&s, &roster_ids(12));
}

#[test]
fn end_session_requires_confirmation_and_resets() {
    let mut s = session_with(8, 2);
    let active_id = s.id();
    assert_eq!(end_session(&mut s, false), Err(SessionError::ConfirmationRequired));
    assert_eq!(s.phase(), SessionPhase::Active);

    end_session(&mut s, true).unwrap();
    assert_eq!(s.phase(), SessionPhase::Setup);
    assert_ne!(s.id(), active_id);
    assert!(s.courts().is_empty());
    assert!(s.resting().is_empty());
    assert!(s.participant("p0").is_none());
    assert_eq!(end_session(&mut s, true), Err(SessionError::InvalidState));
    assert_eq!(add_court(&mut s), Err(SessionError::InvalidState));
}

#[test]
fn view_shows_names_and_add_court_permission() {
    let s = session_with(9, 1);
    let view = s.view();
    assert_eq!(view.phase, SessionPhase::Active);
    assert_eq!(view.courts.len(), 1);
    assert!(!view.courts[0].pending);
    let (tx, ty) = view.courts[0].teams.clone().unwrap();
    assert_eq!(tx.len() + ty.len(), 4);
    assert!(tx.iter().all(|e| e.name.starts_with('P')));
    assert_eq!(view.resting.len(), 5);
    assert!(view.can_add_court);
}

#[test]
fn phase_serializes_as_snake_case() {
    let s = session_with(4, 1);
    let json = serde_json::to_value(s.view()).unwrap();
    assert_eq!(json["phase"], "active");
    assert_eq!(serde_json::to_string(&SessionPhase::Setup).unwrap(), "\"setup\"");
}
