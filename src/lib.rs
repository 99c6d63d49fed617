//! GaitSync crate root: re-exports and module wiring.
//!
//! Keeps several independently captured walking performances phase-locked:
//! each character's tracked foot is recorded for one loop of its clip, the
//! gait-phase boundaries ("sync frames") are extracted from the vertical
//! displacement, and playback then remaps one shared clock onto every
//! character's own timeline.
//!
//! - `data`: trajectory stores, sync-frame extraction, time warping, playback state
//! - `motion`: motion-source traits, looped clip player, procedural gait clips
//! - `engine`: the [`SyncEngine`] orchestrator
//! - `events`: marker / mode / cycle events for renderers
//! - `controllers`: input-side requests and HUD telemetry
//! - `config`: engine configuration loaded from YAML or JSON
//! - `app` (feature `viewer`): native egui window

pub mod config;
pub mod controllers;
pub mod data;
pub mod engine;
pub mod error;
pub mod events;
pub mod motion;

#[cfg(feature = "viewer")]
pub mod app;

// Public re-exports for a compact external API
pub use config::{CharacterSpec, MarkerConfig, SyncConfig};
pub use controllers::{PlaybackController, PlaybackRequests, TelemetryController};
pub use data::characters::CharacterId;
pub use data::kinematics::{compute_kinematics, extract_sync_frames, MagnitudeMode};
pub use data::playback::{GatingPolicy, PlaybackMode};
pub use data::trajectory::{Sample, TrajectoryStore};
pub use data::warp::{warp, warp_clamped, WarpError};
pub use engine::snapshot::{CharacterTelemetry, PlaybackSnapshot};
pub use engine::SyncEngine;
pub use error::{SyncError, SyncResult};
pub use events::{EventController, EventFilter, EventKind, SyncEvent};
pub use motion::{BoneSegment, MotionSource, PhaseObservable};

#[cfg(feature = "viewer")]
pub use app::{run_viewer, ViewerApp};
