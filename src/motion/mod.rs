//! Motion-source collaborators driven by the engine.
//!
//! The engine only needs three things from a character's motion: advance it
//! to a time, read back one bone's world position, and observe the clip's
//! own looped time/frame. File parsing and skeleton construction live
//! outside this crate; [`sequence`] plays pre-baked clips and [`synthetic`]
//! generates procedural gait clips for demos and tests.

pub mod sequence;
pub mod synthetic;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// World-space endpoints of one bone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoneSegment {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl BoneSegment {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }
}

/// A source that exposes its own looped clock.
pub trait PhaseObservable {
    /// Time within the current loop of the clip, as of the last update.
    fn local_time(&self) -> f64;
    /// Clip frame used for the last update. Decreases when the clip loops.
    fn local_frame(&self) -> i64;
}

/// Per-character pose provider.
pub trait MotionSource: PhaseObservable {
    /// Pose the character at global `time` (seconds).
    fn update(&mut self, time: f64);

    /// Endpoints of the named bone for the current pose.
    ///
    /// Returns `None` when the skeleton has no bone of that name. Bone naming
    /// differs between capture sources, so each character is configured with
    /// its own tracked point name.
    fn tracked_point(&self, name: &str) -> Option<BoneSegment>;

    /// Human-readable label used in logs and the HUD.
    fn describe(&self) -> String {
        String::from("motion source")
    }
}
