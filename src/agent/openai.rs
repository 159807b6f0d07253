// OpenAI chat-completions adapter
//
// The hosted model cannot see in-process memory, so each table is rendered to
// row-capped CSV text and sent as a system message alongside the prompt. The
// model decides internally how to work the tables; we only carry the wire
// exchange and surface its errors verbatim.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::agent::AgentGateway;
use crate::config::AgentConfig;
use crate::table::Table;
use crate::types::{AppError, AppResult};

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

pub struct OpenAiAdapter {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    table_rows: usize,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAiAdapter {
    pub fn new(api_key: &str, config: &AgentConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: config
                .api_base
                .clone()
                .unwrap_or_else(|| OPENAI_API_BASE.to_string()),
            model: config.model.clone(),
            temperature: config.temperature,
            table_rows: config.table_rows,
        }
    }

    /// Serialize the loaded tables into one context block for the model.
    fn tables_context(&self, tables: &[Table]) -> String {
        let mut blocks = Vec::with_capacity(tables.len());
        for table in tables {
            blocks.push(format!(
                "### Table '{}' ({} rows total, first {} shown)\n{}",
                table.name,
                table.rows.len(),
                table.rows.len().min(self.table_rows),
                table.to_csv_text(self.table_rows)
            ));
        }
        format!("TABLE DATA\n\n{}", blocks.join("\n"))
    }
}

#[async_trait]
impl AgentGateway for OpenAiAdapter {
    async fn answer(&self, prompt: &str, tables: &[Table]) -> AppResult<String> {
        let url = format!("{}/chat/completions", self.base_url);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: self.tables_context(tables),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::AgentExecution(format!("request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(parsed) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(AppError::AgentExecution(format!(
                    "API error ({}): {}",
                    status, parsed.error.message
                )));
            }

            return Err(AppError::AgentExecution(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::AgentExecution(format!("failed to parse response: {}", e)))?;

        let choice = chat_response
            .choices
            .first()
            .ok_or_else(|| AppError::AgentExecution("model returned no choices".to_string()))?;

        Ok(choice.message.content.clone().unwrap_or_default())
    }
}
