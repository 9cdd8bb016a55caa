use std::time::Duration;

pub const DEFAULT_REST_SECONDS: u32 = 60;

/// Tick periods of the controller's background loops.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub elapsed_tick: Duration,
    pub recovery_tick: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            elapsed_tick: Duration::from_secs(60),
            recovery_tick: Duration::from_secs(1),
        }
    }
}

impl ControllerConfig {
    /// `FITGYMTRACK_DEBUG=1` refreshes elapsed minutes every second.
    pub fn from_env() -> Self {
        let debug_mode = std::env::var("FITGYMTRACK_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let mut config = Self::default();
        if debug_mode {
            config.elapsed_tick = Duration::from_secs(1);
        }
        config
    }
}
