use anyhow::{Context, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::to_u32,
};
use crate::models::Exercise;

fn row_to_exercise(row: &Row) -> Result<Exercise> {
    let set_type: String = row.get("set_type")?;

    Ok(Exercise {
        id: row.get("exercise_id")?,
        name: row.get("name")?,
        target_series: to_u32(row.get("target_series")?, "target_series")?,
        target_reps_or_seconds: to_u32(
            row.get("target_reps_or_seconds")?,
            "target_reps_or_seconds",
        )?,
        target_weight: row.get("target_weight")?,
        rest_seconds: to_u32(row.get("rest_seconds")?, "rest_seconds")?,
        set_type: set_type.parse()?,
        linked_to_previous: row.get("linked_to_previous")?,
        is_isometric: row.get("is_isometric")?,
        display_order: row.get("display_order")?,
    })
}

impl Database {
    /// Replace every exercise of a plan in one transaction.
    pub async fn replace_plan_exercises(&self, plan_id: i64, exercises: &[Exercise]) -> Result<()> {
        let records = exercises.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM plan_exercises WHERE plan_id = ?1",
                params![plan_id],
            )?;
            for exercise in &records {
                tx.execute(
                    "INSERT INTO plan_exercises (plan_id, exercise_id, name, target_series,
                         target_reps_or_seconds, target_weight, rest_seconds, set_type,
                         linked_to_previous, is_isometric, display_order)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        plan_id,
                        exercise.id,
                        exercise.name,
                        exercise.target_series,
                        exercise.target_reps_or_seconds,
                        exercise.target_weight,
                        exercise.rest_seconds,
                        exercise.set_type.as_str(),
                        exercise.linked_to_previous,
                        exercise.is_isometric,
                        exercise.display_order,
                    ],
                )
                .with_context(|| format!("failed to insert exercise {}", exercise.id))?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub async fn get_plan_exercises(&self, plan_id: i64) -> Result<Vec<Exercise>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT exercise_id, name, target_series, target_reps_or_seconds, target_weight,
                        rest_seconds, set_type, linked_to_previous, is_isometric, display_order
                 FROM plan_exercises
                 WHERE plan_id = ?1
                 ORDER BY display_order, exercise_id",
            )?;

            let mut rows = stmt.query(params![plan_id])?;
            let mut exercises = Vec::new();
            while let Some(row) = rows.next()? {
                exercises.push(row_to_exercise(row)?);
            }

            Ok(exercises)
        })
        .await
    }
}
