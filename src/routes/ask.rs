use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{AppState, AskRequest, AskResponse};
use crate::prompt::build_prompt;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/session/{id}/ask", post(ask))
        .with_state(state)
}

/// Submit a question. One gateway call per submission, awaited synchronously;
/// the session lock is released while the call is in flight.
async fn ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> AppResult<Json<AskResponse>> {
    let snapshot = state
        .sessions
        .update(&id, |session| {
            session.begin_question(&request.question)?;
            Ok::<_, AppError>((session.api_key.clone(), session.tables.clone()))
        })
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))??;
    let (api_key, tables) = snapshot;

    info!(session_id = %id, tables = tables.len(), "Question accepted");

    let prompt = build_prompt(&tables, &request.question, state.config.limits.summary_columns);

    let gateway = match state.agents.create(&api_key) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!(session_id = %id, error = %e, "Agent initialization failed");
            let message = e.to_string();
            let _ = state
                .sessions
                .update(&id, |session| session.record_init_failure(message))
                .await;
            return Err(e);
        }
    };

    match gateway.answer(&prompt, &tables).await {
        Ok(answer) => {
            info!(session_id = %id, answer_len = answer.len(), "Answer received");
            let _ = state
                .sessions
                .update(&id, |session| session.record_result(Ok(answer.clone())))
                .await;
            Ok(Json(AskResponse {
                status: "success".to_string(),
                answer,
            }))
        }
        Err(e) => {
            error!(session_id = %id, error = %e, "Agent call failed");
            let message = e.to_string();
            let _ = state
                .sessions
                .update(&id, |session| session.record_result(Err(message)))
                .await;
            Err(e)
        }
    }
}
