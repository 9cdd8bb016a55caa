use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::db::{Database, SeriesInsertOutcome, SessionRecord};
use crate::models::{CompletedSet, Exercise, SessionStatus, StartedSession};

use super::{BackendError, BackendResult, WorkoutBackend};

/// Offline implementation of the workout API on top of the local SQLite
/// database. Plans are seeded with [`LocalBackend::seed_plan`].
#[derive(Clone)]
pub struct LocalBackend {
    db: Database,
}

impl LocalBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn open(db_path: PathBuf) -> Result<Self> {
        Ok(Self::new(Database::new(db_path)?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn seed_plan(&self, plan_id: i64, exercises: &[Exercise]) -> Result<()> {
        self.db.replace_plan_exercises(plan_id, exercises).await?;
        info!("Seeded plan {} with {} exercises", plan_id, exercises.len());
        Ok(())
    }

    pub async fn session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        self.db.get_workout_session(session_id).await
    }
}

#[async_trait]
impl WorkoutBackend for LocalBackend {
    async fn start_session(&self, user_id: i64, plan_id: i64) -> BackendResult<StartedSession> {
        let exercises = self.db.get_plan_exercises(plan_id).await?;
        if exercises.is_empty() {
            return Err(BackendError::NotFound(format!("plan {plan_id}")));
        }

        let record = SessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id,
            plan_id,
            status: SessionStatus::Running,
            started_at: Utc::now(),
            elapsed_minutes: 0,
            note: None,
        };
        self.db.insert_workout_session(&record).await?;

        Ok(StartedSession {
            session_id: record.id,
            message: Some("Allenamento avviato".to_string()),
        })
    }

    async fn get_exercises(&self, plan_id: i64) -> BackendResult<Vec<Exercise>> {
        Ok(self.db.get_plan_exercises(plan_id).await?)
    }

    async fn get_completed_series(&self, session_id: &str) -> BackendResult<Vec<CompletedSet>> {
        if self.db.get_workout_session(session_id).await?.is_none() {
            return Err(BackendError::NotFound(format!("session {session_id}")));
        }
        Ok(self.db.get_completed_series(session_id).await?)
    }

    async fn submit_series(
        &self,
        session_id: &str,
        set: &CompletedSet,
        idempotency_token: &str,
    ) -> BackendResult<()> {
        match self
            .db
            .insert_completed_series(session_id, set, idempotency_token)
            .await?
        {
            SeriesInsertOutcome::Recorded | SeriesInsertOutcome::Replayed => Ok(()),
            SeriesInsertOutcome::SlotTaken => Err(BackendError::Rejected(format!(
                "series {} already recorded for exercise {}",
                set.series_number, set.exercise_id
            ))),
            SeriesInsertOutcome::SessionMissing => {
                Err(BackendError::NotFound(format!("session {session_id}")))
            }
        }
    }

    async fn complete_session(
        &self,
        session_id: &str,
        elapsed_minutes: u64,
        note: Option<&str>,
    ) -> BackendResult<()> {
        let updated = self
            .db
            .mark_workout_completed(
                session_id,
                elapsed_minutes,
                note.map(str::to_string),
                Utc::now(),
            )
            .await?;
        if updated {
            Ok(())
        } else {
            Err(BackendError::NotFound(format!("session {session_id}")))
        }
    }

    async fn delete_session(&self, session_id: &str) -> BackendResult<()> {
        if self.db.delete_workout_session(session_id).await? {
            Ok(())
        } else {
            Err(BackendError::NotFound(format!("session {session_id}")))
        }
    }
}
