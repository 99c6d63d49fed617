//! Procedural walking clips.
//!
//! Stand-ins for captured performances: the tracked toe lifts and lands once
//! per stride while travelling forward, which is all the sync-frame detector
//! looks at.

use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};
use crate::motion::sequence::MotionSequence;
use crate::motion::BoneSegment;

/// Name of the root bone every synthetic clip carries.
pub const ROOT_BONE: &str = "Hips";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitParams {
    /// Seconds per stride.
    pub stride_period_secs: f64,
    /// Peak toe lift.
    pub step_height: f64,
    /// Forward travel per stride.
    pub stride_length: f64,
    /// Whole strides in one loop of the clip.
    pub strides_per_clip: u32,
    pub frame_rate: f64,
    /// Phase offset as a fraction of a stride, `[0, 1)`.
    pub phase: f64,
}

impl Default for GaitParams {
    fn default() -> Self {
        Self {
            stride_period_secs: 1.0,
            step_height: 0.3,
            stride_length: 1.4,
            strides_per_clip: 3,
            frame_rate: 120.0,
            phase: 0.0,
        }
    }
}

impl GaitParams {
    pub fn with_period(mut self, stride_period_secs: f64) -> Self {
        self.stride_period_secs = stride_period_secs;
        self
    }

    pub fn with_phase(mut self, phase: f64) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_strides(mut self, strides_per_clip: u32) -> Self {
        self.strides_per_clip = strides_per_clip;
        self
    }

    pub fn clip_duration(&self) -> f64 {
        self.stride_period_secs * self.strides_per_clip as f64
    }

    /// Toe height at clip time `t`.
    pub fn toe_height(&self, t: f64) -> f64 {
        let angle = TAU * (t / self.stride_period_secs + self.phase);
        self.step_height * (1.0 - angle.cos()) / 2.0
    }

    fn validate(&self) -> SyncResult<()> {
        if !(self.stride_period_secs > 0.0) || !(self.frame_rate > 0.0) {
            return Err(SyncError::Config(
                "stride period and frame rate must be positive".to_string(),
            ));
        }
        if self.strides_per_clip == 0 {
            return Err(SyncError::Config("clip needs at least one stride".to_string()));
        }
        Ok(())
    }
}

/// Bake a looping clip with a root bone and the tracked toe bone.
pub fn synthesize(name: &str, tracked_point: &str, params: &GaitParams) -> SyncResult<MotionSequence> {
    params.validate()?;
    let mut seq = MotionSequence::new(
        name,
        params.frame_rate,
        vec![ROOT_BONE.to_string(), tracked_point.to_string()],
    )?;

    let n = (params.clip_duration() * params.frame_rate).round().max(1.0) as usize;
    let speed = params.stride_length / params.stride_period_secs;
    let toe_offset = Vector3::new(0.0, 0.0, 0.12);
    for f in 0..n {
        let t = f as f64 / params.frame_rate;
        let hips = Point3::new(speed * t, 0.9, 0.0);
        let toe = Point3::new(speed * t, params.toe_height(t), 0.1);
        seq.push_frame(vec![
            BoneSegment::new(hips, hips + Vector3::new(0.0, 0.1, 0.0)),
            BoneSegment::new(toe - toe_offset, toe),
        ])?;
    }
    Ok(seq)
}
