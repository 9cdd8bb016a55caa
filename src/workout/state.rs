use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CompletedSet, Exercise};
use crate::utils::format_clock;

/// Lifecycle of one controller operation as seen by the UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum OperationState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> OperationState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, OperationState::Loading)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, OperationState::Idle)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            OperationState::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OperationState::Error(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub session_id: String,
    pub user_id: i64,
    pub plan_id: i64,
    pub started_at: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
    /// Sets already on the server when the session was loaded.
    pub resumed_sets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedSeries {
    pub set: CompletedSet,
    /// Whether this submission started a rest countdown.
    pub recovery_started: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub session_id: String,
    pub elapsed_minutes: u64,
    pub total_sets: usize,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryTimerState {
    pub remaining_seconds: u32,
    pub running: bool,
    /// Exercise whose card shows the countdown.
    pub exercise_id: Option<i64>,
}

impl RecoveryTimerState {
    pub fn display(&self) -> String {
        format_clock(u64::from(self.remaining_seconds))
    }
}

/// Sets confirmed by the backend for the current session, per exercise in
/// submission order. At most one entry per (exercise, series number).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesLedger {
    by_exercise: BTreeMap<i64, Vec<CompletedSet>>,
}

impl SeriesLedger {
    /// Build from server order, dropping repeated (exercise, series) slots.
    pub fn from_sets(sets: impl IntoIterator<Item = CompletedSet>) -> Self {
        let mut ledger = Self::default();
        for set in sets {
            ledger.record(set);
        }
        ledger
    }

    pub fn contains(&self, exercise_id: i64, series_number: u32) -> bool {
        self.by_exercise
            .get(&exercise_id)
            .map(|sets| sets.iter().any(|set| set.series_number == series_number))
            .unwrap_or(false)
    }

    /// Returns false and leaves the ledger untouched when the slot is taken.
    pub fn record(&mut self, set: CompletedSet) -> bool {
        if self.contains(set.exercise_id, set.series_number) {
            return false;
        }
        self.by_exercise.entry(set.exercise_id).or_default().push(set);
        true
    }

    pub fn sets_for(&self, exercise_id: i64) -> &[CompletedSet] {
        self.by_exercise
            .get(&exercise_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn completed_count(&self, exercise_id: i64) -> usize {
        self.sets_for(exercise_id).len()
    }

    pub fn total(&self) -> usize {
        self.by_exercise.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_exercise.is_empty()
    }

    pub fn exercise_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.by_exercise.keys().copied()
    }

    pub fn clear(&mut self) {
        self.by_exercise.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(exercise_id: i64, series_number: u32) -> CompletedSet {
        CompletedSet::new(exercise_id, series_number, 40.0, 10, 60)
    }

    #[test]
    fn ledger_rejects_second_entry_for_same_slot() {
        let mut ledger = SeriesLedger::default();
        assert!(ledger.record(set(1, 1)));
        assert!(!ledger.record(set(1, 1)));
        assert!(ledger.record(set(1, 2)));
        assert!(ledger.record(set(2, 1)));

        assert_eq!(ledger.completed_count(1), 2);
        assert_eq!(ledger.completed_count(2), 1);
        assert_eq!(ledger.completed_count(3), 0);
        assert_eq!(ledger.total(), 3);
    }

    #[test]
    fn ledger_keeps_submission_order() {
        let ledger = SeriesLedger::from_sets(vec![set(5, 3), set(5, 1), set(5, 2)]);
        let order: Vec<u32> = ledger.sets_for(5).iter().map(|s| s.series_number).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn clearing_empties_everything() {
        let mut ledger = SeriesLedger::from_sets(vec![set(1, 1), set(2, 1)]);
        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.total(), 0);
        assert!(!ledger.contains(1, 1));
    }

    #[test]
    fn operation_state_accessors() {
        let state: OperationState<u32> = OperationState::Success(3);
        assert_eq!(state.data(), Some(&3));
        assert!(state.error().is_none());

        let failed: OperationState<u32> = OperationState::Error("offline".into());
        assert_eq!(failed.error(), Some("offline"));
        assert!(OperationState::<u32>::default().is_idle());
        assert!(OperationState::<u32>::Loading.is_loading());
    }

    #[test]
    fn operation_state_serializes_as_tagged_union() {
        let json = serde_json::to_value(OperationState::Success(7u32)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "success", "data": 7 }));
        let idle = serde_json::to_value(OperationState::<u32>::Idle).unwrap();
        assert_eq!(idle, serde_json::json!({ "status": "idle" }));
    }

    #[test]
    fn recovery_display_uses_clock_format() {
        let state = RecoveryTimerState {
            remaining_seconds: 75,
            running: true,
            exercise_id: Some(1),
        };
        assert_eq!(state.display(), "01:15");
    }
}
