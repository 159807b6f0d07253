use std::sync::Arc;

use crate::agent::AgentFactory;
use crate::config::Config;
use crate::session::{Outcome, Phase, SessionRegistry};
use crate::table::{ParseFailure, Table};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionRegistry,
    pub agents: Arc<dyn AgentFactory>,
}

// API Request/Response types

#[derive(Debug, serde::Serialize)]
pub struct SessionCreated {
    pub session_id: uuid::Uuid,
}

#[derive(Debug, serde::Deserialize)]
pub struct SetKeyRequest {
    pub api_key: String,
}

/// What the UI renders for one loaded table: its columns and the first few rows.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TablePreview {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
}

impl TablePreview {
    pub fn of(table: &Table, preview_rows: usize) -> Self {
        Self {
            name: table.name.clone(),
            columns: table.column_names(),
            rows: table.preview(preview_rows).to_vec(),
            row_count: table.rows.len(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct UploadResponse {
    pub loaded: Vec<TablePreview>,
    pub failures: Vec<ParseFailure>,
}

#[derive(Debug, serde::Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, serde::Serialize)]
pub struct AskResponse {
    pub status: String,
    pub answer: String,
}

#[derive(Debug, serde::Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub tables: Vec<TablePreview>,
    pub failures: Vec<ParseFailure>,
    pub question: Option<String>,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}
