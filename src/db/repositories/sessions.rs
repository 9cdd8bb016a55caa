use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_status, to_i64},
};
use crate::models::SessionStatus;

/// Stored view of a workout session.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: i64,
    pub plan_id: i64,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub elapsed_minutes: u64,
    pub note: Option<String>,
}

impl Database {
    pub async fn insert_workout_session(&self, record: &SessionRecord) -> Result<()> {
        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO workout_sessions (id, user_id, plan_id, status, started_at, elapsed_minutes, note, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    record.user_id,
                    record.plan_id,
                    record.status.as_str(),
                    record.started_at.to_rfc3339(),
                    to_i64(record.elapsed_minutes)?,
                    record.note,
                    record.started_at.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert workout session")?;
            Ok(())
        })
        .await
    }

    pub async fn get_workout_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, plan_id, status, started_at, elapsed_minutes, note
                     FROM workout_sessions
                     WHERE id = ?1",
                    params![session_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, String>(4)?,
                            row.get::<_, i64>(5)?,
                            row.get::<_, Option<String>>(6)?,
                        ))
                    },
                )
                .optional()?;

            let Some((id, user_id, plan_id, status, started_at, elapsed, note)) = row else {
                return Ok(None);
            };

            Ok(Some(SessionRecord {
                id,
                user_id,
                plan_id,
                status: parse_status(&status)?,
                started_at: parse_datetime(&started_at, "started_at")?,
                elapsed_minutes: elapsed.max(0) as u64,
                note,
            }))
        })
        .await
    }

    /// Returns false when the session does not exist.
    pub async fn mark_workout_completed(
        &self,
        session_id: &str,
        elapsed_minutes: u64,
        note: Option<String>,
        completed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let updated = conn
                .execute(
                    "UPDATE workout_sessions
                     SET status = ?1,
                         elapsed_minutes = ?2,
                         note = ?3,
                         completed_at = ?4,
                         updated_at = ?4
                     WHERE id = ?5",
                    params![
                        SessionStatus::Completed.as_str(),
                        to_i64(elapsed_minutes)?,
                        note,
                        completed_at.to_rfc3339(),
                        session_id,
                    ],
                )
                .with_context(|| "failed to complete workout session")?;
            Ok(updated > 0)
        })
        .await
    }

    /// Deletes the session with its sets and tokens. Returns false when absent.
    pub async fn delete_workout_session(&self, session_id: &str) -> Result<bool> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let deleted = conn
                .execute(
                    "DELETE FROM workout_sessions WHERE id = ?1",
                    params![session_id],
                )
                .with_context(|| "failed to delete workout session")?;
            Ok(deleted > 0)
        })
        .await
    }
}
