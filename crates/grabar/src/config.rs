//! Timing policy configuration.

use serde::{Deserialize, Serialize};

/// Maximum gap between two qualifying clicks for them to merge into one
/// double-click step (inclusive).
pub const DEFAULT_DOUBLE_CLICK_GAP_MS: u64 = 350;

/// Minimum spacing between accepted pointer-move samples. Samples arriving
/// faster are dropped, not deferred.
pub const DEFAULT_POINTER_SAMPLE_INTERVAL_MS: u64 = 50;

/// Inactivity window after which a pending pointer-move batch flushes as one
/// composite event.
pub const DEFAULT_POINTER_MOVE_WINDOW_MS: u64 = 500;

/// Per-target scroll coalescing window.
pub const DEFAULT_SCROLL_WINDOW_MS: u64 = 1000;

/// Per-target wheel leading-edge debounce: the first wheel of a burst is
/// forwarded, the rest of the burst is swallowed.
pub const DEFAULT_WHEEL_DEBOUNCE_MS: u64 = 500;

/// Timing policy for one matcher instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Double-click gap in milliseconds (inclusive bound)
    pub double_click_gap_ms: u64,
    /// Pointer-move sample throttle in milliseconds
    pub pointer_sample_interval_ms: u64,
    /// Pointer-move batch-flush window in milliseconds
    pub pointer_move_window_ms: u64,
    /// Per-target scroll coalescing window in milliseconds
    pub scroll_window_ms: u64,
    /// Per-target wheel debounce in milliseconds
    pub wheel_debounce_ms: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            double_click_gap_ms: DEFAULT_DOUBLE_CLICK_GAP_MS,
            pointer_sample_interval_ms: DEFAULT_POINTER_SAMPLE_INTERVAL_MS,
            pointer_move_window_ms: DEFAULT_POINTER_MOVE_WINDOW_MS,
            scroll_window_ms: DEFAULT_SCROLL_WINDOW_MS,
            wheel_debounce_ms: DEFAULT_WHEEL_DEBOUNCE_MS,
        }
    }
}

impl MatcherConfig {
    /// Create a config with the default policy constants.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the double-click gap.
    #[must_use]
    pub const fn with_double_click_gap(mut self, gap_ms: u64) -> Self {
        self.double_click_gap_ms = gap_ms;
        self
    }

    /// Set the pointer-move sample throttle.
    #[must_use]
    pub const fn with_pointer_sample_interval(mut self, interval_ms: u64) -> Self {
        self.pointer_sample_interval_ms = interval_ms;
        self
    }

    /// Set the pointer-move batch-flush window.
    #[must_use]
    pub const fn with_pointer_move_window(mut self, window_ms: u64) -> Self {
        self.pointer_move_window_ms = window_ms;
        self
    }

    /// Set the per-target scroll coalescing window.
    #[must_use]
    pub const fn with_scroll_window(mut self, window_ms: u64) -> Self {
        self.scroll_window_ms = window_ms;
        self
    }

    /// Set the per-target wheel debounce.
    #[must_use]
    pub const fn with_wheel_debounce(mut self, window_ms: u64) -> Self {
        self.wheel_debounce_ms = window_ms;
        self
    }
}
