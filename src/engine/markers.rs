//! Fixed-cadence marker scheduling.

use crate::config::MarkerConfig;

/// Next elapsed time at which a marker is due.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSchedule {
    next_time: f64,
}

impl MarkerSchedule {
    pub fn new(cfg: &MarkerConfig) -> Self {
        Self {
            next_time: cfg.interval_secs,
        }
    }

    pub fn reset(&mut self, cfg: &MarkerConfig) {
        self.next_time = cfg.interval_secs;
    }

    pub fn next_time(&self) -> f64 {
        self.next_time
    }

    /// `next <= elapsed <= window_end`.
    pub fn is_due(&self, cfg: &MarkerConfig, elapsed: f64) -> bool {
        cfg.enabled && elapsed >= self.next_time && elapsed <= cfg.window_end_secs
    }

    /// At most one marker per tick; the schedule moves forward by one interval.
    pub fn advance(&mut self, cfg: &MarkerConfig) {
        self.next_time += cfg.interval_secs;
    }
}
