//! Active workout session core of FitGymTrack.
//!
//! [`WorkoutController`] runs a live session against a [`WorkoutBackend`]:
//! it records confirmed sets, tracks elapsed minutes and sequences rest
//! countdowns around supersets and circuits (see [`grouping`]).

pub mod backend;
pub mod db;
pub mod grouping;
pub mod models;
pub mod settings;
pub mod utils;
pub mod workout;

pub use backend::{BackendError, BackendResult, LocalBackend, WorkoutBackend};
pub use grouping::{group_exercises, ExerciseGroup};
pub use models::{CompletedSet, Exercise, Session, SetType, StartedSession};
pub use settings::{RecoverySettings, SettingsStore};
pub use utils::init_logging;
pub use workout::{
    ActiveSession, CompletionSummary, ControllerConfig, OperationState, RecoveryTimerState,
    SavedSeries, SeriesLedger, WorkoutController,
};
