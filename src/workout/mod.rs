pub mod config;
pub mod controller;
pub mod recovery;
pub mod state;
mod ticker;

pub use config::{ControllerConfig, DEFAULT_REST_SECONDS};
pub use controller::WorkoutController;
pub use recovery::RecoveryTimer;
pub use state::{
    ActiveSession, CompletionSummary, OperationState, RecoveryTimerState, SavedSeries,
    SeriesLedger,
};
