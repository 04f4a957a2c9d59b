use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::{
    ApiResponse, LedgerEntry, Player, RoundSummary, ScoutCandidate, SeasonHistoryEntry, SeasonPhase,
    SessionSnapshot, StandingRow, Team, TransferRecord,
};
use crate::services::Session;

/// Actions hold the lock for their whole duration, so they never interleave.
pub type SharedSession = Arc<Mutex<Session>>;

type ApiResult<T> = Result<Json<ApiResponse<T>>, (StatusCode, Json<ApiResponse<()>>)>;

pub async fn serve(port: u16, session: Session) -> anyhow::Result<()> {
    let state: SharedSession = Arc::new(Mutex::new(session));

    let app = create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("SeasonForge API server listening on port {}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn create_router() -> Router<SharedSession> {
    Router::new()
        .route("/health", get(health_check))
        .route("/session", get(get_session_handler))
        .route("/table", get(get_table_handler))
        .route("/history", get(get_history_handler))
        .route("/teams", get(get_teams_handler))
        .route("/teams/{name}", get(get_team_handler))
        .route("/scout", get(get_scout_handler))
        .route("/ledger", get(get_ledger_handler))
        .route("/funds", get(get_funds_handler))
        .route("/transfers", get(get_transfers_handler))
        .route("/season/advance", post(advance_round_handler))
        .route("/season/reset", post(reset_season_handler))
        .route("/scout/refresh", post(refresh_scout_handler))
        .route("/scout/{id}/sign", post(sign_candidate_handler))
        .route("/scout/{id}/reject", post(reject_candidate_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
        )
}

fn status_for(err: &EngineError) -> StatusCode {
    match err {
        EngineError::SeasonComplete => StatusCode::CONFLICT,
        EngineError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
        EngineError::InvalidCandidate(_) => StatusCode::NOT_FOUND,
        EngineError::RosterLoad { .. } => StatusCode::BAD_REQUEST,
    }
}

fn refused(err: EngineError) -> (StatusCode, Json<ApiResponse<()>>) {
    tracing::warn!("Action refused: {}", err);
    (status_for(&err), Json(ApiResponse::error(err.to_string())))
}

// Health check endpoint
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("SeasonForge API is running"))
}

// GET /session - Everything at once
async fn get_session_handler(State(session): State<SharedSession>) -> Json<ApiResponse<SessionSnapshot>> {
    Json(ApiResponse::success(session.lock().await.snapshot()))
}

async fn get_table_handler(State(session): State<SharedSession>) -> Json<ApiResponse<Vec<StandingRow>>> {
    Json(ApiResponse::success(session.lock().await.table()))
}

async fn get_history_handler(State(session): State<SharedSession>) -> Json<ApiResponse<Vec<SeasonHistoryEntry>>> {
    Json(ApiResponse::success(session.lock().await.history().to_vec()))
}

async fn get_teams_handler(State(session): State<SharedSession>) -> Json<ApiResponse<Vec<Team>>> {
    Json(ApiResponse::success(session.lock().await.teams().to_vec()))
}

// GET /teams/{name} - One club's roster
async fn get_team_handler(State(session): State<SharedSession>, Path(name): Path<String>) -> ApiResult<Team> {
    match session.lock().await.team(&name) {
        Some(team) => Ok(Json(ApiResponse::success(team.clone()))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("no team named '{}'", name))),
        )),
    }
}

async fn get_scout_handler(State(session): State<SharedSession>) -> Json<ApiResponse<Vec<ScoutCandidate>>> {
    Json(ApiResponse::success(session.lock().await.candidates().to_vec()))
}

async fn get_ledger_handler(State(session): State<SharedSession>) -> Json<ApiResponse<Vec<LedgerEntry>>> {
    Json(ApiResponse::success(session.lock().await.ledger_entries()))
}

#[derive(Debug, Serialize)]
struct FundsResponse {
    club: String,
    funds: u64,
    phase: SeasonPhase,
}

async fn get_funds_handler(State(session): State<SharedSession>) -> Json<ApiResponse<FundsResponse>> {
    let session = session.lock().await;
    Json(ApiResponse::success(FundsResponse {
        club: session.human().name.clone(),
        funds: session.funds(),
        phase: session.phase(),
    }))
}

async fn get_transfers_handler(State(session): State<SharedSession>) -> Json<ApiResponse<Vec<TransferRecord>>> {
    Json(ApiResponse::success(session.lock().await.transfers().to_vec()))
}

// POST /season/advance - Play the next round
async fn advance_round_handler(State(session): State<SharedSession>) -> ApiResult<RoundSummary> {
    session
        .lock()
        .await
        .advance_round()
        .map(|summary| Json(ApiResponse::success(summary)))
        .map_err(refused)
}

// POST /season/reset - Start the season over
async fn reset_season_handler(State(session): State<SharedSession>) -> Json<ApiResponse<SeasonPhase>> {
    let mut session = session.lock().await;
    session.reset_season();
    Json(ApiResponse::success(session.phase()))
}

// POST /scout/refresh - Roll a new candidate list
async fn refresh_scout_handler(State(session): State<SharedSession>) -> Json<ApiResponse<Vec<ScoutCandidate>>> {
    Json(ApiResponse::success(session.lock().await.refresh_candidates().to_vec()))
}

// POST /scout/{id}/sign - Buy a candidate
async fn sign_candidate_handler(State(session): State<SharedSession>, Path(id): Path<Uuid>) -> ApiResult<Player> {
    session
        .lock()
        .await
        .sign(id)
        .map(|player| Json(ApiResponse::success(player)))
        .map_err(refused)
}

// POST /scout/{id}/reject - Turn a candidate down
async fn reject_candidate_handler(
    State(session): State<SharedSession>,
    Path(id): Path<Uuid>,
) -> ApiResult<ScoutCandidate> {
    session
        .lock()
        .await
        .reject(id)
        .map(|candidate| Json(ApiResponse::success(candidate)))
        .map_err(refused)
}
