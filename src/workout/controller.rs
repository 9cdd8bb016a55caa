use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use tokio::{
    sync::{watch, Mutex},
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::backend::{BackendError, WorkoutBackend};
use crate::grouping::{group_exercises, group_of, ExerciseGroup};
use crate::models::{CompletedSet, Exercise, Session};
use crate::settings::SettingsStore;

use super::config::ControllerConfig;
use super::recovery::RecoveryTimer;
use super::state::{
    ActiveSession, CompletionSummary, OperationState, RecoveryTimerState, SavedSeries,
    SeriesLedger,
};
use super::ticker::Ticker;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

struct LiveSession {
    session: Session,
    exercises: Vec<Exercise>,
    anchor: Instant,
}

impl LiveSession {
    fn elapsed_minutes(&self) -> u64 {
        self.anchor.elapsed().as_secs() / 60
    }
}

struct Channels {
    session: watch::Sender<OperationState<ActiveSession>>,
    save: watch::Sender<OperationState<SavedSeries>>,
    completion: watch::Sender<OperationState<CompletionSummary>>,
    ledger: watch::Sender<SeriesLedger>,
    elapsed_minutes: watch::Sender<u64>,
}

impl Channels {
    fn new() -> Self {
        Self {
            session: watch::channel(OperationState::Idle).0,
            save: watch::channel(OperationState::Idle).0,
            completion: watch::channel(OperationState::Idle).0,
            ledger: watch::channel(SeriesLedger::default()).0,
            elapsed_minutes: watch::channel(0).0,
        }
    }
}

struct ControllerInner {
    backend: Arc<dyn WorkoutBackend>,
    settings: Arc<SettingsStore>,
    config: ControllerConfig,
    /// Held for the whole of every lifecycle or submission operation, which
    /// keeps a single writer over the session.
    session: Mutex<Option<LiveSession>>,
    channels: Arc<Channels>,
    recovery: RecoveryTimer,
    elapsed_ticker: StdMutex<Option<Ticker>>,
}

impl Drop for ControllerInner {
    fn drop(&mut self) {
        let slot = match self.elapsed_ticker.get_mut() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(ticker) = slot.take() {
            ticker.stop();
        }
        self.recovery.stop();
    }
}

/// Drives one active workout: session lifecycle against the backend, the
/// ledger of confirmed sets, elapsed minutes and the rest countdown.
///
/// Every operation reports its outcome through the watch channels exposed by
/// the `subscribe_*` methods; none of them returns an error to the caller.
#[derive(Clone)]
pub struct WorkoutController {
    inner: Arc<ControllerInner>,
}

impl WorkoutController {
    pub fn new(
        backend: Arc<dyn WorkoutBackend>,
        settings: Arc<SettingsStore>,
        config: ControllerConfig,
    ) -> Self {
        let recovery = RecoveryTimer::new(config.recovery_tick);
        Self {
            inner: Arc::new(ControllerInner {
                backend,
                settings,
                config,
                session: Mutex::new(None),
                channels: Arc::new(Channels::new()),
                recovery,
                elapsed_ticker: StdMutex::new(None),
            }),
        }
    }

    /// Controller with in-memory settings and tick periods taken from the
    /// environment.
    pub fn with_backend(backend: Arc<dyn WorkoutBackend>) -> Self {
        Self::new(
            backend,
            Arc::new(SettingsStore::in_memory()),
            ControllerConfig::from_env(),
        )
    }

    pub async fn initialize(&self, user_id: i64, plan_id: i64) {
        let mut guard = self.inner.session.lock().await;

        if let Some(live) = guard.as_ref() {
            if !live.session.completed {
                if live.session.plan_id == plan_id {
                    log_info!(
                        "Session {} already active for plan {}; nothing to reload",
                        live.session.session_id,
                        plan_id
                    );
                } else {
                    log_warn!(
                        "Ignoring initialize for plan {}: session {} is active for plan {}",
                        plan_id,
                        live.session.session_id,
                        live.session.plan_id
                    );
                }
                return;
            }
        }

        self.clear_local(&mut guard);
        let channels = &self.inner.channels;
        channels.session.send_replace(OperationState::Loading);

        let backend = &self.inner.backend;
        let started = match backend.start_session(user_id, plan_id).await {
            Ok(started) => started,
            Err(err) => {
                log_error!("Failed to start session for plan {}: {}", plan_id, err);
                channels.session.send_replace(OperationState::Error(err.to_string()));
                return;
            }
        };
        let session_id = started.session_id;
        let started_at = Utc::now();
        let anchor = Instant::now();

        let exercises = match backend.get_exercises(plan_id).await {
            Ok(exercises) => exercises,
            Err(err) => {
                log_error!("Failed to load exercises for plan {}: {}", plan_id, err);
                channels.session.send_replace(OperationState::Error(err.to_string()));
                return;
            }
        };

        let resumed = match backend.get_completed_series(&session_id).await {
            Ok(sets) => sets,
            Err(BackendError::NotFound(_)) => Vec::new(),
            Err(err) => {
                log_warn!(
                    "Could not load completed series for session {}: {}; starting empty",
                    session_id,
                    err
                );
                Vec::new()
            }
        };

        let ledger = SeriesLedger::from_sets(resumed);
        let resumed_sets = ledger.total();
        channels.ledger.send_replace(ledger);
        channels.elapsed_minutes.send_replace(0);

        log_info!(
            "Session {} started for plan {} ({} exercises, {} sets resumed)",
            session_id,
            plan_id,
            exercises.len(),
            resumed_sets
        );

        channels.session.send_replace(OperationState::Success(ActiveSession {
            session_id: session_id.clone(),
            user_id,
            plan_id,
            started_at,
            exercises: exercises.clone(),
            resumed_sets,
        }));

        *guard = Some(LiveSession {
            session: Session {
                session_id,
                plan_id,
                user_id,
                started_at,
                elapsed_minutes: 0,
                completed: false,
            },
            exercises,
            anchor,
        });

        self.spawn_elapsed_ticker(anchor);
    }

    /// Record one set. `rest_seconds` defaults to the configured rest.
    pub async fn add_completed_series(
        &self,
        exercise_id: i64,
        weight: f64,
        reps: u32,
        series_number: u32,
        rest_seconds: Option<u32>,
    ) {
        let guard = self.inner.session.lock().await;
        let Some(live) = guard.as_ref() else {
            log_warn!("Ignoring set for exercise {}: no active session", exercise_id);
            return;
        };

        let channels = &self.inner.channels;
        if series_number == 0 {
            channels.save.send_replace(OperationState::Error(
                "series numbers start at 1".to_string(),
            ));
            return;
        }

        if channels.ledger.borrow().contains(exercise_id, series_number) {
            log_info!(
                "Series {} of exercise {} already recorded; ignoring duplicate",
                series_number,
                exercise_id
            );
            return;
        }

        let settings = self.inner.settings.recovery();
        let rest_seconds = rest_seconds.unwrap_or(settings.default_rest_seconds);
        let set = CompletedSet::new(exercise_id, series_number, weight, reps, rest_seconds);
        let idempotency_token = Uuid::new_v4().to_string();

        channels.save.send_replace(OperationState::Loading);

        let session_id = live.session.session_id.as_str();
        if let Err(err) = self
            .inner
            .backend
            .submit_series(session_id, &set, &idempotency_token)
            .await
        {
            log_error!(
                "Series {} of exercise {} rejected: {}",
                series_number,
                exercise_id,
                err
            );
            channels.save.send_replace(OperationState::Error(err.to_string()));
            return;
        }

        channels.ledger.send_modify(|ledger| {
            ledger.record(set.clone());
        });
        log_info!(
            "Recorded series {} of exercise {} ({} kg x {})",
            series_number,
            exercise_id,
            weight,
            reps
        );

        self.inner.recovery.mark(exercise_id);
        let recovery_started =
            settings.auto_start && self.trigger_recovery(&live.exercises, exercise_id);

        channels.save.send_replace(OperationState::Success(SavedSeries {
            set,
            recovery_started,
        }));
    }

    /// Start the rest countdown after a recorded set. Chained supersets and
    /// circuits only rest once the last exercise of the round is done.
    fn trigger_recovery(&self, exercises: &[Exercise], exercise_id: i64) -> bool {
        let Some(group) = group_of(exercises, exercise_id) else {
            log_warn!("Exercise {} is not part of this plan; no recovery", exercise_id);
            return false;
        };
        let Some(last) = group.last() else {
            return false;
        };
        if last.id != exercise_id {
            log_info!(
                "Exercise {} is mid-{}; continuing without rest",
                exercise_id,
                group.set_type().as_str()
            );
            return false;
        }
        if last.rest_seconds == 0 {
            return false;
        }

        self.inner.recovery.start(last.rest_seconds, exercise_id);
        true
    }

    pub fn start_recovery_timer(&self, seconds: u32, exercise_id: i64) {
        self.inner.recovery.start(seconds, exercise_id);
    }

    /// Skip the remaining rest.
    pub fn stop_recovery_timer(&self) {
        self.inner.recovery.stop();
    }

    pub async fn complete_workout(&self, note: Option<String>) {
        let mut guard = self.inner.session.lock().await;
        let channels = &self.inner.channels;
        let Some(live) = guard.as_mut() else {
            channels
                .completion
                .send_replace(OperationState::Error("no active workout".to_string()));
            return;
        };
        if live.session.completed {
            log_info!(
                "Session {} is already completed; not sending it again",
                live.session.session_id
            );
            return;
        }

        let elapsed_minutes = live.elapsed_minutes().max(*channels.elapsed_minutes.borrow());
        channels.elapsed_minutes.send_replace(elapsed_minutes);
        channels.completion.send_replace(OperationState::Loading);

        let session_id = live.session.session_id.clone();
        if let Err(err) = self
            .inner
            .backend
            .complete_session(&session_id, elapsed_minutes, note.as_deref())
            .await
        {
            log_error!("Failed to complete session {}: {}", session_id, err);
            channels.completion.send_replace(OperationState::Error(err.to_string()));
            return;
        }

        live.session.completed = true;
        live.session.elapsed_minutes = elapsed_minutes;
        self.stop_elapsed_ticker();
        self.inner.recovery.stop();

        let total_sets = channels.ledger.borrow().total();
        log_info!(
            "Session {} completed after {} min with {} sets",
            session_id,
            elapsed_minutes,
            total_sets
        );
        channels
            .completion
            .send_replace(OperationState::Success(CompletionSummary {
                session_id,
                elapsed_minutes,
                total_sets,
                note,
            }));
    }

    /// Abandon the workout. The remote delete is best effort; local state is
    /// always reset.
    pub async fn cancel_workout(&self) {
        let mut guard = self.inner.session.lock().await;
        if let Some(live) = guard.as_ref() {
            let session_id = &live.session.session_id;
            match self.inner.backend.delete_session(session_id).await {
                Ok(()) => log_info!("Session {} cancelled", session_id),
                Err(err) => log_warn!(
                    "Remote delete of session {} failed ({}); resetting locally anyway",
                    session_id,
                    err
                ),
            }
        }
        self.clear_local(&mut guard);
    }

    /// Drop all local session state without contacting the backend.
    pub async fn reset(&self) {
        let mut guard = self.inner.session.lock().await;
        self.clear_local(&mut guard);
    }

    fn clear_local(&self, session: &mut Option<LiveSession>) {
        *session = None;
        self.stop_elapsed_ticker();
        self.inner.recovery.stop();

        let channels = &self.inner.channels;
        channels.ledger.send_modify(SeriesLedger::clear);
        channels.elapsed_minutes.send_replace(0);
        channels.session.send_replace(OperationState::Idle);
        channels.save.send_replace(OperationState::Idle);
        channels.completion.send_replace(OperationState::Idle);
    }

    fn spawn_elapsed_ticker(&self, anchor: Instant) {
        let mut slot = self.lock_elapsed_ticker();
        if let Some(previous) = slot.take() {
            previous.stop();
        }

        let channels = self.inner.channels.clone();
        let period = self.inner.config.elapsed_tick;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(anchor + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let minutes = anchor.elapsed().as_secs() / 60;
                        channels.elapsed_minutes.send_if_modified(|current| {
                            if token.is_cancelled() || minutes <= *current {
                                return false;
                            }
                            *current = minutes;
                            true
                        });
                    }
                }
            }
        });

        *slot = Some(Ticker::new(handle, cancel));
    }

    fn stop_elapsed_ticker(&self) {
        if let Some(ticker) = self.lock_elapsed_ticker().take() {
            ticker.stop();
        }
    }

    fn lock_elapsed_ticker(&self) -> std::sync::MutexGuard<'_, Option<Ticker>> {
        match self.inner.elapsed_ticker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn subscribe_session(&self) -> watch::Receiver<OperationState<ActiveSession>> {
        self.inner.channels.session.subscribe()
    }

    pub fn subscribe_save(&self) -> watch::Receiver<OperationState<SavedSeries>> {
        self.inner.channels.save.subscribe()
    }

    pub fn subscribe_completion(&self) -> watch::Receiver<OperationState<CompletionSummary>> {
        self.inner.channels.completion.subscribe()
    }

    pub fn subscribe_ledger(&self) -> watch::Receiver<SeriesLedger> {
        self.inner.channels.ledger.subscribe()
    }

    pub fn subscribe_elapsed_minutes(&self) -> watch::Receiver<u64> {
        self.inner.channels.elapsed_minutes.subscribe()
    }

    pub fn subscribe_recovery(&self) -> watch::Receiver<RecoveryTimerState> {
        self.inner.recovery.subscribe()
    }

    pub fn session_state(&self) -> OperationState<ActiveSession> {
        self.inner.channels.session.borrow().clone()
    }

    pub fn save_state(&self) -> OperationState<SavedSeries> {
        self.inner.channels.save.borrow().clone()
    }

    pub fn completion_state(&self) -> OperationState<CompletionSummary> {
        self.inner.channels.completion.borrow().clone()
    }

    pub fn ledger(&self) -> SeriesLedger {
        self.inner.channels.ledger.borrow().clone()
    }

    pub fn elapsed_minutes(&self) -> u64 {
        *self.inner.channels.elapsed_minutes.borrow()
    }

    pub fn recovery_state(&self) -> RecoveryTimerState {
        self.inner.recovery.snapshot()
    }

    /// Snapshot of the live session with current elapsed minutes.
    pub async fn session(&self) -> Option<Session> {
        let guard = self.inner.session.lock().await;
        guard.as_ref().map(|live| {
            let mut session = live.session.clone();
            if !session.completed {
                session.elapsed_minutes = live.elapsed_minutes();
            }
            session
        })
    }

    pub fn session_id(&self) -> Option<String> {
        self.inner
            .channels
            .session
            .borrow()
            .data()
            .map(|active| active.session_id.clone())
    }

    pub fn exercises(&self) -> Vec<Exercise> {
        self.inner
            .channels
            .session
            .borrow()
            .data()
            .map(|active| active.exercises.clone())
            .unwrap_or_default()
    }

    pub fn groups(&self) -> Vec<ExerciseGroup> {
        group_exercises(&self.exercises())
    }

    pub fn completed_count(&self, exercise_id: i64) -> usize {
        self.inner.channels.ledger.borrow().completed_count(exercise_id)
    }

    pub fn next_series_number(&self, exercise_id: i64) -> u32 {
        self.completed_count(exercise_id) as u32 + 1
    }

    pub fn is_exercise_complete(&self, exercise_id: i64) -> bool {
        let session = self.inner.channels.session.borrow();
        let ledger = self.inner.channels.ledger.borrow();
        session
            .data()
            .and_then(|active| active.exercises.iter().find(|e| e.id == exercise_id))
            .is_some_and(|exercise| reached_target(&ledger, exercise))
    }

    pub fn is_workout_complete(&self) -> bool {
        let session = self.inner.channels.session.borrow();
        let ledger = self.inner.channels.ledger.borrow();
        session.data().is_some_and(|active| {
            !active.exercises.is_empty()
                && active
                    .exercises
                    .iter()
                    .all(|exercise| reached_target(&ledger, exercise))
        })
    }

    pub fn total_completed_sets(&self) -> usize {
        self.inner.channels.ledger.borrow().total()
    }
}

fn reached_target(ledger: &SeriesLedger, exercise: &Exercise) -> bool {
    ledger.completed_count(exercise.id) >= exercise.target_series as usize
}
