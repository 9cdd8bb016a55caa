#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fitgymtrack_lib::{
    BackendError, BackendResult, CompletedSet, ControllerConfig, Exercise, SetType,
    SettingsStore, StartedSession, WorkoutBackend, WorkoutController,
};

pub const SESSION_ID: &str = "sess-42";

/// Scripted backend recording every call the controller makes.
#[derive(Default)]
pub struct MockState {
    pub exercises: Vec<Exercise>,
    /// `None` answers "not found".
    pub prior_sets: Option<Vec<CompletedSet>>,
    pub start_error: Option<String>,
    pub exercises_error: Option<String>,
    pub fail_submissions: bool,
    pub fail_complete: bool,
    pub fail_delete: bool,

    pub start_calls: usize,
    pub submitted: Vec<(String, CompletedSet, String)>,
    pub completed: Vec<(String, u64, Option<String>)>,
    pub deleted: Vec<String>,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn with_exercises(exercises: Vec<Exercise>) -> Arc<Self> {
        let backend = Self::default();
        backend.update(|state| state.exercises = exercises);
        Arc::new(backend)
    }

    pub fn update(&self, f: impl FnOnce(&mut MockState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn read<T>(&self, f: impl FnOnce(&MockState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

#[async_trait]
impl WorkoutBackend for MockBackend {
    async fn start_session(&self, _user_id: i64, _plan_id: i64) -> BackendResult<StartedSession> {
        let mut state = self.state.lock().unwrap();
        state.start_calls += 1;
        if let Some(message) = &state.start_error {
            return Err(BackendError::Rejected(message.clone()));
        }
        Ok(StartedSession {
            session_id: SESSION_ID.to_string(),
            message: None,
        })
    }

    async fn get_exercises(&self, _plan_id: i64) -> BackendResult<Vec<Exercise>> {
        let state = self.state.lock().unwrap();
        match &state.exercises_error {
            Some(message) => Err(anyhow::anyhow!(message.clone()).into()),
            None => Ok(state.exercises.clone()),
        }
    }

    async fn get_completed_series(&self, session_id: &str) -> BackendResult<Vec<CompletedSet>> {
        let state = self.state.lock().unwrap();
        state
            .prior_sets
            .clone()
            .ok_or_else(|| BackendError::NotFound(format!("session {session_id}")))
    }

    async fn submit_series(
        &self,
        session_id: &str,
        set: &CompletedSet,
        idempotency_token: &str,
    ) -> BackendResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_submissions {
            return Err(BackendError::Rejected("Errore nel salvataggio".into()));
        }
        state
            .submitted
            .push((session_id.to_string(), set.clone(), idempotency_token.to_string()));
        Ok(())
    }

    async fn complete_session(
        &self,
        session_id: &str,
        elapsed_minutes: u64,
        note: Option<&str>,
    ) -> BackendResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_complete {
            return Err(anyhow::anyhow!("timeout").into());
        }
        state
            .completed
            .push((session_id.to_string(), elapsed_minutes, note.map(str::to_string)));
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> BackendResult<()> {
        let mut state = self.state.lock().unwrap();
        state.deleted.push(session_id.to_string());
        if state.fail_delete {
            return Err(anyhow::anyhow!("network unreachable").into());
        }
        Ok(())
    }
}

pub fn config() -> ControllerConfig {
    ControllerConfig {
        elapsed_tick: Duration::from_secs(60),
        recovery_tick: Duration::from_secs(1),
    }
}

pub fn controller(backend: Arc<MockBackend>) -> WorkoutController {
    WorkoutController::new(backend, Arc::new(SettingsStore::in_memory()), config())
}

pub fn normal(id: i64, rest_seconds: u32) -> Exercise {
    Exercise::new(id, format!("exercise-{id}")).with_rest(rest_seconds)
}

pub fn chained(id: i64, set_type: SetType, linked: bool, rest_seconds: u32) -> Exercise {
    normal(id, rest_seconds).with_set_type(set_type, linked)
}
