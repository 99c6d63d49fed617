//! Per-character trajectory log of one tracked anatomical point.
//!
//! A [`TrajectoryStore`] collects one [`Sample`] per collecting tick until the
//! character's motion source loops once. After that the store is closed and
//! its sync frames are extracted exactly once.

use nalgebra::{Point3, Vector3};

use crate::data::kinematics::{self, MagnitudeMode};

/// Default number of samples reserved up front (one loop of a typical clip).
pub const DEFAULT_SAMPLE_CAPACITY: usize = 1000;

/// One observation of the tracked point.
///
/// `displacement` and `velocity` start at zero and are filled in by the
/// kinematics pass when the store closes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Source frame index at the time of sampling.
    pub index: i64,
    /// Global time (seconds) the pose was evaluated at.
    pub time: f64,
    pub position: Point3<f64>,
    /// Change of position versus the previous sample.
    pub displacement: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl Sample {
    pub fn new(index: i64, time: f64, position: Point3<f64>) -> Self {
        Self {
            index,
            time,
            position,
            displacement: Vector3::zeros(),
            velocity: Vector3::zeros(),
        }
    }
}

/// Result of offering a sample to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Appended,
    /// The store already saw a full loop.
    Closed,
    /// The timestamp did not advance past the last stored sample.
    OutOfOrder,
}

#[derive(Debug, Clone, Default)]
pub struct TrajectoryStore {
    samples: Vec<Sample>,
    cycle_count: u32,
    sync_frames: Option<Vec<f64>>,
}

impl TrajectoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            cycle_count: 0,
            sync_frames: None,
        }
    }

    /// Build a closed store from pre-recorded samples (one full loop).
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn cycle_count(&self) -> u32 {
        self.cycle_count
    }

    /// `true` once the source has looped and sampling has stopped.
    pub fn is_closed(&self) -> bool {
        self.cycle_count > 0
    }

    /// Record that the source wrapped around its clip.
    pub fn complete_cycle(&mut self) -> u32 {
        self.cycle_count = self.cycle_count.saturating_add(1);
        self.cycle_count
    }

    /// Append a sample while the first loop is still running.
    pub fn record(&mut self, index: i64, time: f64, position: Point3<f64>) -> RecordOutcome {
        if self.is_closed() {
            return RecordOutcome::Closed;
        }
        if let Some(last) = self.samples.last() {
            if time <= last.time {
                return RecordOutcome::OutOfOrder;
            }
        }
        self.samples.push(Sample::new(index, time, position));
        RecordOutcome::Appended
    }

    /// Memoized sync frames, `None` until extracted.
    pub fn sync_frames(&self) -> Option<&[f64]> {
        self.sync_frames.as_deref()
    }

    /// Sync frames that can drive a warp (at least two boundaries).
    pub fn usable_sync_frames(&self) -> Option<&[f64]> {
        self.sync_frames().filter(|s| s.len() >= 2)
    }

    /// Run the kinematics pass and extract sync frames, once.
    ///
    /// Returns `true` only on the call that performed the extraction.
    pub fn ensure_sync_frames(&mut self, time_step: f64, mode: MagnitudeMode) -> bool {
        if !self.is_closed() || self.sync_frames.is_some() {
            return false;
        }
        self.samples.shrink_to_fit();
        kinematics::compute_kinematics(&mut self.samples, time_step, mode);
        self.sync_frames = Some(kinematics::extract_sync_frames(&self.samples));
        true
    }

    /// Vertical displacement channel as `[time, dy]` pairs (for plotting).
    pub fn vertical_displacement(&self) -> Vec<[f64; 2]> {
        self.samples
            .iter()
            .skip(1)
            .map(|s| [s.time, s.displacement.y])
            .collect()
    }

    /// Tracked-point height as `[time, y]` pairs (for plotting).
    pub fn heights(&self) -> Vec<[f64; 2]> {
        self.samples.iter().map(|s| [s.time, s.position.y]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(y: f64) -> Point3<f64> {
        Point3::new(0.0, y, 0.0)
    }

    #[test]
    fn record_stops_after_first_cycle() {
        let mut store = TrajectoryStore::new();
        assert_eq!(store.record(0, 0.1, p(0.0)), RecordOutcome::Appended);
        assert_eq!(store.record(1, 0.2, p(1.0)), RecordOutcome::Appended);
        store.complete_cycle();
        assert_eq!(store.record(0, 0.3, p(0.0)), RecordOutcome::Closed);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn record_rejects_non_increasing_time() {
        let mut store = TrajectoryStore::new();
        store.record(0, 0.5, p(0.0));
        assert_eq!(store.record(1, 0.5, p(1.0)), RecordOutcome::OutOfOrder);
        assert_eq!(store.record(1, 0.1, p(1.0)), RecordOutcome::OutOfOrder);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sync_frames_are_memoized() {
        let mut store = TrajectoryStore::new();
        for (i, y) in [0.0, 2.0, 3.0, 3.0, 2.0, 2.5, 4.0].iter().enumerate() {
            store.record(i as i64, i as f64, p(*y));
        }
        assert!(!store.ensure_sync_frames(1.0, MagnitudeMode::Euclidean));
        store.complete_cycle();
        assert!(store.ensure_sync_frames(1.0, MagnitudeMode::Euclidean));
        let first = store.sync_frames().map(|s| s.to_vec());
        assert!(!store.ensure_sync_frames(1.0, MagnitudeMode::Euclidean));
        assert_eq!(store.sync_frames().map(|s| s.to_vec()), first);
    }
}
