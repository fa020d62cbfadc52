//! Single binary web server: JSON API over one shared court rotation session.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT. Optional: ROSTER_CSV (name,wins,losses seed file),
//! STORE_LATENCY_MS, plus the engine settings read by `EngineConfig::from_env`.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use court_rotation::{
    add_court, add_late_participant, begin_finish_game_by_side, check_late_participant,
    complete_finish_game, delete_court, edit_court, end_session, load_participants,
    register_participant, resolve_late_participant, start_session, CourtNumber, EngineConfig,
    LateParticipant, MemoryStore, ParticipantId, ParticipantStore, Session, SessionError,
    TeamSide,
};
use serde::Deserialize;
use std::sync::RwLock;
use std::time::Duration;

/// The single in-memory session, driven by one request at a time.
type AppState = Data<RwLock<Session>>;
type StoreState = Data<MemoryStore>;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RegisterParticipantBody {
    name: String,
}

#[derive(Deserialize)]
struct StartSessionBody {
    court_count: u32,
    participant_ids: Vec<ParticipantId>,
}

#[derive(Deserialize)]
struct EndSessionBody {
    #[serde(default)]
    confirm: bool,
}

#[derive(Deserialize)]
struct EditCourtBody {
    /// Each pair swaps the positions of two participants.
    swaps: Vec<(ParticipantId, ParticipantId)>,
}

#[derive(Deserialize)]
struct CourtResultBody {
    winner: TeamSide,
}

/// Path segment: court number (e.g. /api/session/courts/{number})
#[derive(Deserialize)]
struct CourtPath {
    number: CourtNumber,
}

fn error_response(e: &SessionError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        SessionError::CourtNotFound(_) | SessionError::ParticipantNotFound(_) => {
            HttpResponse::NotFound().json(body)
        }
        SessionError::SubmissionInFlight(_)
        | SessionError::StaleSubmission
        | SessionError::DuplicateParticipant(_)
        | SessionError::ParticipantAlreadyInSession(_) => HttpResponse::Conflict().json(body),
        SessionError::PersistenceConflict(_) => HttpResponse::BadGateway().json(body),
        SessionError::TransientPersistenceFailure(_) => {
            HttpResponse::ServiceUnavailable().json(body)
        }
        SessionError::InvalidGroupSize(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-rotation",
    })
}

/// Browsers ask for this on every page; answer with no content.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Registered participants, ordered by name.
#[get("/api/participants")]
async fn api_list_participants(store: StoreState) -> HttpResponse {
    match store.list_participants().await {
        Ok(all) => HttpResponse::Ok().json(all),
        Err(e) => error_response(&SessionError::from(e)),
    }
}

/// Register a new participant with a zeroed record.
#[post("/api/participants")]
async fn api_register_participant(store: StoreState, body: Json<RegisterParticipantBody>) -> HttpResponse {
    match register_participant(store.get_ref(), &body.name).await {
        Ok(p) => HttpResponse::Ok().json(p),
        Err(e) => error_response(&e),
    }
}

#[get("/api/session")]
async fn api_get_session(state: AppState) -> HttpResponse {
    let g = match state.read() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    HttpResponse::Ok().json(g.view())
}

/// Start the session (Setup -> Active).
#[post("/api/session/start")]
async fn api_start_session(state: AppState, store: StoreState, body: Json<StartSessionBody>) -> HttpResponse {
    let body = body.into_inner();
    let participants = match load_participants(store.get_ref(), &body.participant_ids).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match start_session(&mut g, body.court_count, participants) {
        Ok(()) => HttpResponse::Ok().json(g.view()),
        Err(e) => error_response(&e),
    }
}

/// End the session (Active -> Setup). Requires `confirm: true`.
#[post("/api/session/end")]
async fn api_end_session(state: AppState, body: Option<Json<EndSessionBody>>) -> HttpResponse {
    let confirmed = body.map(|b| b.confirm).unwrap_or(false);
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match end_session(&mut g, confirmed) {
        Ok(()) => HttpResponse::Ok().json(g.view()),
        Err(e) => error_response(&e),
    }
}

/// Add a court seated from the resting queue.
#[post("/api/session/courts")]
async fn api_add_court(state: AppState) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match add_court(&mut g) {
        Ok(_) => HttpResponse::Ok().json(g.view()),
        Err(e) => error_response(&e),
    }
}

/// Delete a court; its players go to the resting queue.
#[delete("/api/session/courts/{number}")]
async fn api_delete_court(state: AppState, path: Path<CourtPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match delete_court(&mut g, path.number) {
        Ok(()) => HttpResponse::Ok().json(g.view()),
        Err(e) => error_response(&e),
    }
}

/// Manually swap players between a court and the resting queue.
#[put("/api/session/courts/{number}")]
async fn api_edit_court(state: AppState, path: Path<CourtPath>, body: Json<EditCourtBody>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match edit_court(&mut g, path.number, &body.swaps) {
        Ok(()) => HttpResponse::Ok().json(g.view()),
        Err(e) => error_response(&e),
    }
}

/// Submit the winning side for a court. The court stays locked while the store records it.
/// Recording runs in its own task, so a client that disconnects mid-request cannot leave
/// the court locked.
#[post("/api/session/courts/{number}/result")]
async fn api_court_result(
    state: AppState,
    store: StoreState,
    path: Path<CourtPath>,
    body: Json<CourtResultBody>,
) -> HttpResponse {
    let pending = {
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        match begin_finish_game_by_side(&mut g, path.number, body.winner) {
            Ok(p) => p,
            Err(e) => return error_response(&e),
        }
    };

    let task = actix_web::rt::spawn(async move {
        let outcome = store
            .transactional_record_match(
                pending.session_id,
                &pending.key,
                &pending.record,
                &pending.updates,
            )
            .await;
        let mut g = match state.write() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        match complete_finish_game(&mut g, pending, outcome) {
            Ok(_) => HttpResponse::Ok().json(g.view()),
            Err(e) => error_response(&e),
        }
    });
    match task.await {
        Ok(response) => response,
        Err(e) => {
            log::error!("recording task failed: {}", e);
            HttpResponse::InternalServerError().body("task error")
        }
    }
}

/// Add a late participant (existing id or new name) to the resting queue.
#[post("/api/session/late-participants")]
async fn api_add_late_participant(
    state: AppState,
    store: StoreState,
    body: Json<LateParticipant>,
) -> HttpResponse {
    {
        let g = match state.read() {
            Ok(guard) => guard,
            Err(_) => return HttpResponse::InternalServerError().body("lock error"),
        };
        // Nothing is registered in the store for a session that cannot take the participant.
        if let Err(e) = check_late_participant(&g, &body) {
            return error_response(&e);
        }
    }
    let participant = match resolve_late_participant(store.get_ref(), body.into_inner()).await {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return HttpResponse::InternalServerError().body("lock error"),
    };
    match add_late_participant(&mut g, participant) {
        Ok(()) => HttpResponse::Ok().json(g.view()),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn load_store() -> MemoryStore {
    let store = match std::env::var("ROSTER_CSV") {
        Ok(path) => match std::fs::File::open(&path)
            .map_err(csv::Error::from)
            .and_then(MemoryStore::from_csv_reader)
        {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Could not load roster from {}: {}", path, e);
                MemoryStore::new()
            }
        },
        Err(_) => MemoryStore::new(),
    };
    match std::env::var("STORE_LATENCY_MS").ok().and_then(|v| v.parse().ok()) {
        Some(ms) => store.with_latency(Duration::from_millis(ms)),
        None => store,
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);

    let config = EngineConfig::from_env();
    if let Some(pair) = &config.special_pair {
        log::info!("Special pair: {} & {}", pair.first, pair.second);
    }
    let state = Data::new(RwLock::new(Session::new(config)));
    let store = Data::new(load_store());
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(store.clone())
            .service(api_health)
            .service(favicon)
            .service(api_list_participants)
            .service(api_register_participant)
            .service(api_get_session)
            .service(api_start_session)
            .service(api_end_session)
            .service(api_add_court)
            .service(api_delete_court)
            .service(api_edit_court)
            .service(api_court_result)
            .service(api_add_late_participant)
    })
    .bind(bind)?
    .run()
    .await
}
