use axum::{
    extract::{Multipart, Path, State},
    routing::post,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::models::{AppState, TablePreview, UploadResponse};
use crate::table::{load_tables, ParseFailure};
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/session/{id}/files", post(upload_files))
        .with_state(state)
}

/// Parse each uploaded CSV into a table owned by the session. A malformed
/// file is reported alongside the successful ones; the upload replaces any
/// previously loaded tables.
async fn upload_files(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut rejected: Vec<ParseFailure> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?
    {
        let name = field
            .file_name()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "upload.csv".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

        // Upload surface is restricted to the CSV extension.
        if !name.to_lowercase().ends_with(".csv") {
            rejected.push(ParseFailure {
                file: name,
                error: "only .csv files are accepted".to_string(),
            });
            continue;
        }
        files.push((name, data.to_vec()));
    }

    let mut outcome = load_tables(&files);
    outcome.failures.extend(rejected);

    let previews: Vec<TablePreview> = outcome
        .tables
        .iter()
        .map(|t| TablePreview::of(t, state.config.limits.preview_rows))
        .collect();
    let failures = outcome.failures.clone();

    state
        .sessions
        .update(&id, |session| session.set_tables(outcome))
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {}", id)))?;

    info!(
        session_id = %id,
        loaded = previews.len(),
        failed = failures.len(),
        "CSV upload processed"
    );

    Ok(Json(UploadResponse {
        loaded: previews,
        failures,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::agent::{AgentFactory, AgentGateway};
    use crate::config::Config;
    use crate::session::SessionRegistry;
    use crate::types::AppError;

    struct NullFactory;

    impl AgentFactory for NullFactory {
        fn create(&self, _api_key: &str) -> crate::types::AppResult<Box<dyn AgentGateway>> {
            Err(AppError::AgentInit("no agent in upload tests".to_string()))
        }
    }

    fn test_state() -> AppState {
        AppState {
            config: Config::default(),
            sessions: SessionRegistry::default(),
            agents: Arc::new(NullFactory),
        }
    }

    const BOUNDARY: &str = "csv-chat-test-boundary";

    fn multipart_body(parts: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (filename, data) in parts {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n{data}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn post_files(
        state: &AppState,
        id: Uuid,
        parts: &[(&str, &str)],
    ) -> (StatusCode, serde_json::Value) {
        let app = crate::create_router(state.clone());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/session/{}/files", id))
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(multipart_body(parts)))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    const SALES: &str = "Date,Region,Amount\n2023-01-02,North,120.5\n2023-01-03,South,88\n2023-01-04,North,240\n2023-01-05,East,15.75\n";

    #[tokio::test]
    async fn test_upload_isolates_bad_and_non_csv_files() {
        // One rejected extension, one malformed CSV, one good file: the good
        // file still loads with a capped preview, the others report themselves.
        let state = test_state();
        let id = state.sessions.create().await;

        let (status, json) = post_files(
            &state,
            id,
            &[
                ("notes.txt", "just some notes"),
                ("broken.csv", "A,B\n1,2,3\n"),
                ("sales.csv", SALES),
            ],
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let loaded = json["loaded"].as_array().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0]["name"], "sales.csv");
        assert_eq!(
            loaded[0]["columns"],
            serde_json::json!(["Date", "Region", "Amount"])
        );
        assert_eq!(loaded[0]["rows"].as_array().unwrap().len(), 3); // preview cap
        assert_eq!(loaded[0]["row_count"], 4);

        let failures = json["failures"].as_array().unwrap();
        assert_eq!(failures.len(), 2);
        let failure_for = |file: &str| {
            failures
                .iter()
                .find(|f| f["file"] == file)
                .unwrap_or_else(|| panic!("no failure entry for {file}"))
        };
        assert_eq!(
            failure_for("notes.txt")["error"],
            "only .csv files are accepted"
        );
        assert!(failure_for("broken.csv")["error"]
            .as_str()
            .unwrap()
            .contains("broken.csv"));

        // The session holds only the successfully parsed table.
        let session = state.sessions.get(&id).await.unwrap();
        assert_eq!(session.tables.len(), 1);
        assert_eq!(session.tables[0].name, "sales.csv");
    }

    #[tokio::test]
    async fn test_upload_replaces_previous_tables() {
        let state = test_state();
        let id = state.sessions.create().await;

        let (status, _) = post_files(&state, id, &[("sales.csv", SALES)]).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) =
            post_files(&state, id, &[("faq.csv", "Question,Answer\nReturns?,30 days\n")]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["loaded"].as_array().unwrap().len(), 1);

        let session = state.sessions.get(&id).await.unwrap();
        assert_eq!(session.tables.len(), 1);
        assert_eq!(session.tables[0].name, "faq.csv");
    }

    #[tokio::test]
    async fn test_upload_to_unknown_session_is_404() {
        let state = test_state();
        let (status, json) = post_files(&state, Uuid::new_v4(), &[("sales.csv", SALES)]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], "error");
    }
}
