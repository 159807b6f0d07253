use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::models::{AppState, SessionCreated, SessionView, SetKeyRequest, TablePreview};
use crate::session::Session;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/session", post(create_session))
        .route("/api/session/{id}", get(get_session))
        .route("/api/session/{id}/key", post(set_key))
        .with_state(state)
}

async fn create_session(State(state): State<AppState>) -> Json<SessionCreated> {
    let session_id = state.sessions.create().await;
    info!(%session_id, "Session created");
    Json(SessionCreated { session_id })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SessionView>> {
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
    Ok(Json(view_of(&session, state.config.limits.preview_rows)))
}

async fn set_key(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetKeyRequest>,
) -> AppResult<Json<SessionView>> {
    let preview_rows = state.config.limits.preview_rows;
    let view = state
        .sessions
        .update(&id, |session| {
            session.set_api_key(&request.api_key);
            view_of(session, preview_rows)
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;
    info!(session_id = %id, phase = ?view.phase, "Credential updated");
    Ok(Json(view))
}

pub(crate) fn view_of(session: &Session, preview_rows: usize) -> SessionView {
    SessionView {
        phase: session.phase,
        tables: session
            .tables
            .iter()
            .map(|t| TablePreview::of(t, preview_rows))
            .collect(),
        failures: session.failures.clone(),
        question: session.question.clone(),
        outcome: session.outcome.clone(),
    }
}
