//! Per-session context and the in-memory session registry.
//!
//! Each user session owns its credential, loaded tables, and the most recent
//! question/answer. There are no ambient globals; handlers look the session
//! up by id and every field lives on the [`Session`] struct. State never
//! crosses session boundaries.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::table::{LoadOutcome, ParseFailure, Table};
use crate::types::{AppError, AppResult};

/// Where the session sits in the input-gathering flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    AwaitingCredential,
    AwaitingFiles,
    AwaitingQuestion,
    Processing,
    Displaying,
}

/// Result of the most recent question, rendered as a banner by the UI.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "status", content = "text", rename_all = "snake_case")]
pub enum Outcome {
    Answer(String),
    Error(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub api_key: String,
    pub tables: Vec<Table>,
    pub failures: Vec<ParseFailure>,
    pub question: Option<String>,
    pub outcome: Option<Outcome>,
    pub phase: Phase,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            api_key: String::new(),
            tables: Vec::new(),
            failures: Vec::new(),
            question: None,
            outcome: None,
            phase: Phase::AwaitingCredential,
        }
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.api_key = key.to_string();
        self.recompute_phase();
    }

    /// Replace the loaded tables wholesale; previous tables are discarded.
    pub fn set_tables(&mut self, outcome: LoadOutcome) {
        self.tables = outcome.tables;
        self.failures = outcome.failures;
        self.recompute_phase();
    }

    /// A missing prerequisite sends the session back to the matching
    /// instructional phase; otherwise a session that was gathering inputs
    /// becomes ready for a question.
    fn recompute_phase(&mut self) {
        if self.api_key.trim().is_empty() {
            self.phase = Phase::AwaitingCredential;
        } else if self.tables.is_empty() {
            self.phase = Phase::AwaitingFiles;
        } else if matches!(self.phase, Phase::AwaitingCredential | Phase::AwaitingFiles) {
            self.phase = Phase::AwaitingQuestion;
        }
    }

    /// The agent is invoked only when a non-empty credential and at least one
    /// parsed table exist.
    pub fn readiness(&self) -> AppResult<()> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::MissingCredential);
        }
        if self.tables.is_empty() {
            return Err(AppError::NoFilesUploaded);
        }
        Ok(())
    }

    /// Accept a question and enter `Processing`. No call is attempted when a
    /// prerequisite is missing. One question is in flight per session at
    /// most; a submission while `Processing` is rejected.
    pub fn begin_question(&mut self, question: &str) -> AppResult<()> {
        if question.trim().is_empty() {
            return Err(AppError::InvalidRequest("question is empty".to_string()));
        }
        if self.phase == Phase::Processing {
            return Err(AppError::InvalidRequest(
                "a question is already being processed".to_string(),
            ));
        }
        self.readiness()?;
        self.question = Some(question.to_string());
        self.phase = Phase::Processing;
        Ok(())
    }

    /// Gateway construction failed; the session stays ready for a question.
    pub fn record_init_failure(&mut self, message: String) {
        self.outcome = Some(Outcome::Error(message));
        self.phase = Phase::AwaitingQuestion;
    }

    /// The gateway call returned; enter `Displaying` unconditionally, no
    /// retry. The question is kept so the user may resubmit after an error.
    pub fn record_result(&mut self, result: Result<String, String>) {
        self.outcome = Some(match result {
            Ok(answer) => Outcome::Answer(answer),
            Err(message) => Outcome::Error(message),
        });
        self.phase = Phase::Displaying;
    }
}

#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionRegistry {
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let mut guard = self.inner.write().await;
        guard.insert(id, Session::new(id));
        id
    }

    pub async fn get(&self, id: &Uuid) -> Option<Session> {
        let guard = self.inner.read().await;
        guard.get(id).cloned()
    }

    /// Run a closure against one session under the write lock. The lock is
    /// never held across an agent call; handlers snapshot what they need,
    /// await, then update again.
    pub async fn update<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        let mut guard = self.inner.write().await;
        guard.get_mut(id).map(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::load_tables;

    fn loaded_files() -> LoadOutcome {
        load_tables(&[(
            "faq.csv".to_string(),
            b"Question,Answer\nReturns?,30 days\n".to_vec(),
        )])
    }

    #[test]
    fn test_phase_progression() {
        let mut session = Session::new(Uuid::new_v4());
        assert_eq!(session.phase, Phase::AwaitingCredential);

        session.set_api_key("sk-test");
        assert_eq!(session.phase, Phase::AwaitingFiles);

        session.set_tables(loaded_files());
        assert_eq!(session.phase, Phase::AwaitingQuestion);

        session.begin_question("what is the return policy").unwrap();
        assert_eq!(session.phase, Phase::Processing);

        session.record_result(Ok("30 days".to_string()));
        assert_eq!(session.phase, Phase::Displaying);
        assert!(matches!(session.outcome, Some(Outcome::Answer(_))));
    }

    #[test]
    fn test_files_before_credential_still_awaits_credential() {
        // Scenario C: files present, credential empty.
        let mut session = Session::new(Uuid::new_v4());
        session.set_tables(loaded_files());
        assert_eq!(session.phase, Phase::AwaitingCredential);

        let err = session.begin_question("anything").unwrap_err();
        assert!(matches!(err, AppError::MissingCredential));
        assert_eq!(err.to_string(), "Please enter your OpenAI API key to proceed.");
    }

    #[test]
    fn test_no_files_blocks_question() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_api_key("sk-test");
        let err = session.begin_question("anything").unwrap_err();
        assert!(matches!(err, AppError::NoFilesUploaded));
    }

    #[test]
    fn test_empty_question_rejected() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_api_key("sk-test");
        session.set_tables(loaded_files());
        assert!(session.begin_question("   ").is_err());
        assert_eq!(session.phase, Phase::AwaitingQuestion);
    }

    #[test]
    fn test_second_question_rejected_while_processing() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_api_key("sk-test");
        session.set_tables(loaded_files());
        session.begin_question("first question").unwrap();

        let err = session.begin_question("second question").unwrap_err();
        assert!(matches!(err, AppError::InvalidRequest(_)));
        assert_eq!(session.question.as_deref(), Some("first question"));
        assert_eq!(session.phase, Phase::Processing);

        // Once the in-flight call returns, a new question is accepted again.
        session.record_result(Ok("done".to_string()));
        session.begin_question("second question").unwrap();
        assert_eq!(session.phase, Phase::Processing);
    }

    #[test]
    fn test_clearing_credential_regresses_phase() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_api_key("sk-test");
        session.set_tables(loaded_files());
        assert_eq!(session.phase, Phase::AwaitingQuestion);

        session.set_api_key("");
        assert_eq!(session.phase, Phase::AwaitingCredential);
    }

    #[test]
    fn test_new_upload_replaces_tables() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_api_key("sk-test");
        session.set_tables(loaded_files());
        assert_eq!(session.tables.len(), 1);

        let replacement = load_tables(&[
            ("a.csv".to_string(), b"X\n1\n".to_vec()),
            ("b.csv".to_string(), b"Y\n2\n".to_vec()),
        ]);
        session.set_tables(replacement);
        assert_eq!(session.tables.len(), 2);
        assert_eq!(session.tables[0].name, "a.csv");
    }

    #[test]
    fn test_execution_error_keeps_question_for_resubmission() {
        // Scenario D: the literal error text is shown and the question stays.
        let mut session = Session::new(Uuid::new_v4());
        session.set_api_key("sk-test");
        session.set_tables(loaded_files());
        session.begin_question("what is the return policy").unwrap();

        session.record_result(Err("tool execution failed".to_string()));
        assert_eq!(session.phase, Phase::Displaying);
        assert!(matches!(
            session.outcome,
            Some(Outcome::Error(ref m)) if m == "tool execution failed"
        ));
        assert_eq!(session.question.as_deref(), Some("what is the return policy"));

        // Resubmitting restarts at Processing.
        session.begin_question("what is the return policy").unwrap();
        assert_eq!(session.phase, Phase::Processing);
    }

    #[test]
    fn test_init_failure_returns_to_awaiting_question() {
        let mut session = Session::new(Uuid::new_v4());
        session.set_api_key("sk-test");
        session.set_tables(loaded_files());
        session.begin_question("q").unwrap();

        session.record_init_failure("bad key format".to_string());
        assert_eq!(session.phase, Phase::AwaitingQuestion);
        assert!(matches!(session.outcome, Some(Outcome::Error(_))));
    }

    #[tokio::test]
    async fn test_registry_isolation() {
        let registry = SessionRegistry::default();
        let a = registry.create().await;
        let b = registry.create().await;

        registry
            .update(&a, |s| s.set_api_key("sk-a"))
            .await
            .unwrap();

        assert_eq!(registry.get(&a).await.unwrap().api_key, "sk-a");
        assert!(registry.get(&b).await.unwrap().api_key.is_empty());
        assert!(registry.get(&Uuid::new_v4()).await.is_none());
    }
}
