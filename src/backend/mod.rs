//! Read access to the exam REST backend.
//!
//! Everything the results service knows about sessions, skills, disciplines
//! and teachers comes through [`ExamBackend`]. The production implementation
//! is [`client::HttpExamBackend`]; tests plug in a stub.

pub(crate) mod client;
pub(crate) mod models;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use self::models::{Discipline, ExamResult, Profile, Session, Skill};

#[derive(Debug, Error)]
pub(crate) enum BackendError {
    #[error("exam backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("exam backend returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("exam backend returned an invalid body: {0}")]
    Decode(String),
}

impl BackendError {
    pub(crate) fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

#[async_trait]
pub(crate) trait ExamBackend: Send + Sync {
    /// All results, or only those recorded in `session_id`.
    async fn exam_results(&self, session_id: Option<i64>) -> Result<Vec<ExamResult>, BackendError>;

    async fn session(&self, id: i64) -> Result<Session, BackendError>;

    async fn skill(&self, id: i64) -> Result<Skill, BackendError>;

    async fn disciplines(&self) -> Result<Vec<Discipline>, BackendError>;

    async fn profile(&self, teacher_id: i64) -> Result<Profile, BackendError>;

    async fn delete_exam_result(&self, id: i64) -> Result<(), BackendError>;

    async fn health(&self) -> Result<(), BackendError>;

    /// A handle that authenticates with the caller's bearer token when one is given.
    fn with_bearer(&self, bearer: Option<&str>) -> Arc<dyn ExamBackend>;
}
