use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, to_u32},
};
use crate::models::CompletedSet;

/// What happened to a submitted set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesInsertOutcome {
    Recorded,
    /// The idempotency token was already used; nothing was written.
    Replayed,
    /// Another set already occupies this exercise/series slot.
    SlotTaken,
    SessionMissing,
}

fn row_to_set(row: &Row) -> Result<CompletedSet> {
    let recorded_at: String = row.get("recorded_at")?;

    Ok(CompletedSet {
        id: row.get("id")?,
        exercise_id: row.get("exercise_id")?,
        series_number: to_u32(row.get("series_number")?, "series_number")?,
        weight: row.get("weight")?,
        reps: to_u32(row.get("reps")?, "reps")?,
        rest_seconds_used: to_u32(row.get("rest_seconds_used")?, "rest_seconds_used")?,
        timestamp: parse_datetime(&recorded_at, "recorded_at")?,
    })
}

impl Database {
    pub async fn insert_completed_series(
        &self,
        session_id: &str,
        set: &CompletedSet,
        idempotency_token: &str,
    ) -> Result<SeriesInsertOutcome> {
        let session_id = session_id.to_string();
        let token = idempotency_token.to_string();
        let record = set.clone();
        self.execute(move |conn| {
            let tx = conn.transaction()?;

            let session_exists: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM workout_sessions WHERE id = ?1)",
                params![session_id],
                |row| row.get(0),
            )?;
            if !session_exists {
                return Ok(SeriesInsertOutcome::SessionMissing);
            }

            let replayed: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM idempotency_keys WHERE token = ?1)",
                params![token],
                |row| row.get(0),
            )?;
            if replayed {
                return Ok(SeriesInsertOutcome::Replayed);
            }

            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM completed_series
                               WHERE session_id = ?1 AND exercise_id = ?2 AND series_number = ?3)",
                params![session_id, record.exercise_id, record.series_number],
                |row| row.get(0),
            )?;
            if taken {
                return Ok(SeriesInsertOutcome::SlotTaken);
            }

            tx.execute(
                "INSERT INTO completed_series (id, session_id, exercise_id, series_number, weight, reps, rest_seconds_used, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id,
                    session_id,
                    record.exercise_id,
                    record.series_number,
                    record.weight,
                    record.reps,
                    record.rest_seconds_used,
                    record.timestamp.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert completed series")?;
            tx.execute(
                "INSERT INTO idempotency_keys (token, session_id, created_at) VALUES (?1, ?2, ?3)",
                params![token, session_id, Utc::now().to_rfc3339()],
            )
            .with_context(|| "failed to record idempotency token")?;

            tx.commit()?;
            Ok(SeriesInsertOutcome::Recorded)
        })
        .await
    }

    /// Sets of a session in submission order.
    pub async fn get_completed_series(&self, session_id: &str) -> Result<Vec<CompletedSet>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, exercise_id, series_number, weight, reps, rest_seconds_used, recorded_at
                 FROM completed_series
                 WHERE session_id = ?1
                 ORDER BY seq",
            )?;

            let mut rows = stmt.query(params![session_id])?;
            let mut sets = Vec::new();
            while let Some(row) = rows.next()? {
                sets.push(row_to_set(row)?);
            }

            Ok(sets)
        })
        .await
    }
}
