// Agent gateway abstraction layer
//
// The gateway is an opaque external collaborator: prompt + tables in, answer
// text out. How it plans and executes table operations is the hosted model's
// business, not ours. Handlers build one gateway per submitted question from
// the session's credential, so tests can swap in a mock factory.

pub mod openai;

use async_trait::async_trait;

use crate::config::AgentConfig;
use crate::table::Table;
use crate::types::{AppError, AppResult};

#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Invoked synchronously once per submitted question. Failures surface
    /// their message verbatim as `AppError::AgentExecution`.
    async fn answer(&self, prompt: &str, tables: &[Table]) -> AppResult<String>;
}

impl std::fmt::Debug for dyn AgentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AgentGateway")
    }
}

/// Construction seam: builds a gateway from the session's credential.
/// A rejected credential fails with `AppError::AgentInit`.
pub trait AgentFactory: Send + Sync {
    fn create(&self, api_key: &str) -> AppResult<Box<dyn AgentGateway>>;
}

pub struct OpenAiAgentFactory {
    config: AgentConfig,
}

impl OpenAiAgentFactory {
    pub fn new(config: AgentConfig) -> Self {
        Self { config }
    }
}

impl AgentFactory for OpenAiAgentFactory {
    fn create(&self, api_key: &str) -> AppResult<Box<dyn AgentGateway>> {
        if api_key.trim().is_empty() {
            return Err(AppError::AgentInit("API key is empty".to_string()));
        }
        match self.config.provider.as_str() {
            "openai" => Ok(Box::new(openai::OpenAiAdapter::new(api_key, &self.config))),
            other => Err(AppError::AgentInit(format!(
                "Unsupported provider: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_factory_rejects_empty_key() {
        let factory = OpenAiAgentFactory::new(Config::default().agent);
        let err = factory.create("  ").unwrap_err();
        assert!(matches!(err, AppError::AgentInit(_)));
    }

    #[test]
    fn test_factory_rejects_unknown_provider() {
        let mut agent = Config::default().agent;
        agent.provider = "parrot".to_string();
        let factory = OpenAiAgentFactory::new(agent);
        let err = factory.create("sk-test").unwrap_err();
        assert!(err.to_string().contains("parrot"));
    }

    #[test]
    fn test_factory_builds_openai_gateway() {
        let factory = OpenAiAgentFactory::new(Config::default().agent);
        assert!(factory.create("sk-test").is_ok());
    }
}
