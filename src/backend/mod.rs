//! Network boundary of the workout core.
//!
//! The REST service is reached through [`WorkoutBackend`]; the controller
//! only relies on success/failure plus payload and on being able to tell a
//! "not found" answer apart from other failures.

pub mod local;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{CompletedSet, Exercise, StartedSession};

pub use local::LocalBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("not found: {0}")]
    NotFound(String),
    /// The server answered but refused the request.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

#[async_trait]
pub trait WorkoutBackend: Send + Sync {
    async fn start_session(&self, user_id: i64, plan_id: i64) -> BackendResult<StartedSession>;

    async fn get_exercises(&self, plan_id: i64) -> BackendResult<Vec<Exercise>>;

    /// `BackendError::NotFound` when the server has nothing for this session.
    async fn get_completed_series(&self, session_id: &str) -> BackendResult<Vec<CompletedSet>>;

    async fn submit_series(
        &self,
        session_id: &str,
        set: &CompletedSet,
        idempotency_token: &str,
    ) -> BackendResult<()>;

    async fn complete_session(
        &self,
        session_id: &str,
        elapsed_minutes: u64,
        note: Option<&str>,
    ) -> BackendResult<()>;

    async fn delete_session(&self, session_id: &str) -> BackendResult<()>;
}
