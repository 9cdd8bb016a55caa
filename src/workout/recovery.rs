use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::{sync::watch, time};
use tokio_util::sync::CancellationToken;

use super::state::RecoveryTimerState;
use super::ticker::Ticker;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Rest countdown between sets.
///
/// One countdown at a time: starting a new one replaces the running one.
/// `stop` is synchronous, the published state reads "stopped" as soon as it
/// returns.
#[derive(Clone)]
pub struct RecoveryTimer {
    state: Arc<watch::Sender<RecoveryTimerState>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick: Duration,
}

impl RecoveryTimer {
    pub fn new(tick: Duration) -> Self {
        let (state, _) = watch::channel(RecoveryTimerState::default());
        Self {
            state: Arc::new(state),
            ticker: Arc::new(Mutex::new(None)),
            tick,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RecoveryTimerState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> RecoveryTimerState {
        self.state.borrow().clone()
    }

    /// Flag `exercise_id` as the exercise currently resting, without
    /// touching a running countdown.
    pub fn mark(&self, exercise_id: i64) {
        self.state.send_modify(|state| state.exercise_id = Some(exercise_id));
    }

    pub fn start(&self, seconds: u32, exercise_id: i64) {
        if seconds == 0 {
            return;
        }

        let mut slot = self.lock_ticker();
        if let Some(previous) = slot.take() {
            previous.stop();
        }

        self.state.send_replace(RecoveryTimerState {
            remaining_seconds: seconds,
            running: true,
            exercise_id: Some(exercise_id),
        });
        log_info!("Recovery started: {}s for exercise {}", seconds, exercise_id);

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(countdown(
            self.state.clone(),
            self.tick,
            cancel.clone(),
        ));
        *slot = Some(Ticker::new(handle, cancel));
    }

    /// Clears the countdown and the marker. Returns whether a running
    /// countdown was cut short.
    pub fn stop(&self) -> bool {
        if let Some(ticker) = self.lock_ticker().take() {
            ticker.stop();
        }
        let previous = self.state.send_replace(RecoveryTimerState::default());
        if previous.running {
            log_info!(
                "Recovery stopped early with {}s left",
                previous.remaining_seconds
            );
        }
        previous.running
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    fn lock_ticker(&self) -> std::sync::MutexGuard<'_, Option<Ticker>> {
        match self.ticker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log_warn!("recovery ticker lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

async fn countdown(
    state: Arc<watch::Sender<RecoveryTimerState>>,
    tick: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = time::sleep(tick) => {
                let mut expired = false;
                // Checked under the channel lock so a cancelled countdown can
                // never overwrite the state published by `stop`.
                state.send_if_modified(|current| {
                    if cancel.is_cancelled() || !current.running {
                        return false;
                    }
                    current.remaining_seconds = current.remaining_seconds.saturating_sub(1);
                    if current.remaining_seconds == 0 {
                        current.running = false;
                        current.exercise_id = None;
                        expired = true;
                    }
                    true
                });

                if expired {
                    log_info!("Recovery finished");
                    break;
                }
                if !state.borrow().running {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn runs_to_zero_and_clears_marker() {
        let timer = RecoveryTimer::new(Duration::from_secs(1));
        timer.start(3, 9);
        assert_eq!(
            timer.snapshot(),
            RecoveryTimerState {
                remaining_seconds: 3,
                running: true,
                exercise_id: Some(9)
            }
        );

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(timer.snapshot().remaining_seconds, 2);

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(timer.snapshot(), RecoveryTimerState::default());
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_immediate() {
        let timer = RecoveryTimer::new(Duration::from_secs(1));
        timer.start(90, 1);
        time::sleep(Duration::from_millis(10_500)).await;
        assert_eq!(timer.snapshot().remaining_seconds, 80);

        assert!(timer.stop());
        let state = timer.snapshot();
        assert!(!state.running);
        assert_eq!(state.remaining_seconds, 0);
        assert_eq!(state.exercise_id, None);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.snapshot(), RecoveryTimerState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_after_expiry_is_quiet() {
        let timer = RecoveryTimer::new(Duration::from_secs(1));
        timer.start(2, 3);
        time::sleep(Duration::from_millis(2_500)).await;
        assert!(!timer.is_running());

        assert!(!timer.stop());
        assert!(!timer.stop());
        assert_eq!(timer.snapshot(), RecoveryTimerState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_running_countdown() {
        let timer = RecoveryTimer::new(Duration::from_secs(1));
        timer.start(30, 1);
        time::sleep(Duration::from_millis(5_500)).await;
        timer.start(45, 2);

        time::sleep(Duration::from_millis(2_500)).await;
        let state = timer.snapshot();
        assert_eq!(state.remaining_seconds, 43);
        assert_eq!(state.exercise_id, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_seconds_does_not_start() {
        let timer = RecoveryTimer::new(Duration::from_secs(1));
        timer.start(0, 1);
        assert!(!timer.is_running());
        assert_eq!(timer.snapshot().exercise_id, None);
    }

    #[tokio::test(start_paused = true)]
    async fn mark_keeps_countdown_values() {
        let timer = RecoveryTimer::new(Duration::from_secs(1));
        timer.mark(4);
        assert_eq!(timer.snapshot().exercise_id, Some(4));
        assert!(!timer.is_running());
    }
}
