use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default quiescence window before an edited pattern pair is considered stable
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Milliseconds of no further edits before the pattern pair stabilizes
    pub debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl PreviewConfig {
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
