use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A set confirmed by the backend. Never mutated once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSet {
    pub id: String,
    pub exercise_id: i64,
    /// 1-based, counted per exercise.
    pub series_number: u32,
    pub weight: f64,
    pub reps: u32,
    pub rest_seconds_used: u32,
    pub timestamp: DateTime<Utc>,
}

impl CompletedSet {
    pub fn new(
        exercise_id: i64,
        series_number: u32,
        weight: f64,
        reps: u32,
        rest_seconds_used: u32,
    ) -> Self {
        let timestamp = Utc::now();
        Self {
            id: client_set_id(timestamp),
            exercise_id,
            series_number,
            weight,
            reps,
            rest_seconds_used,
            timestamp,
        }
    }

    pub fn key(&self) -> (i64, u32) {
        (self.exercise_id, self.series_number)
    }
}

/// Millisecond timestamp plus a random suffix so two taps in the same
/// millisecond still get distinct ids.
fn client_set_id(timestamp: DateTime<Utc>) -> String {
    let suffix: u32 = rand::thread_rng().gen();
    format!("{}_{:08x}", timestamp.timestamp_millis(), suffix)
}
