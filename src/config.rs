use anyhow::Result;
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub agent: AgentConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub api_base: Option<String>,
    /// Rows of each table serialized into the agent request.
    pub table_rows: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Rows shown per table in the UI preview.
    pub preview_rows: usize,
    /// Column names listed per table in the prompt summary.
    pub summary_columns: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            agent: AgentConfig {
                provider: env::var("AGENT_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
                model: env::var("AGENT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
                temperature: env::var("AGENT_TEMPERATURE")
                    .unwrap_or_else(|_| "0.0".to_string())
                    .parse()?,
                api_base: env::var("AGENT_API_BASE").ok(),
                table_rows: env::var("AGENT_TABLE_ROWS")
                    .unwrap_or_else(|_| "200".to_string())
                    .parse()?,
            },
            limits: LimitsConfig {
                preview_rows: env::var("PREVIEW_ROWS")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()?,
                summary_columns: env::var("SUMMARY_COLUMNS")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()?,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                port: 3000,
                host: "0.0.0.0".to_string(),
                cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            },
            agent: AgentConfig {
                provider: "openai".to_string(),
                model: "gpt-4o".to_string(),
                temperature: 0.0,
                api_base: None,
                table_rows: 200,
            },
            limits: LimitsConfig {
                preview_rows: 3,
                summary_columns: 15,
            },
        }
    }
}
