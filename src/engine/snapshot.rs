//! Read-only telemetry handed to the HUD between ticks.

use serde::Serialize;

use crate::data::characters::{Character, CharacterId};
use crate::data::playback::PlaybackMode;

/// Per-character view of the last tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterTelemetry {
    pub id: CharacterId,
    pub tracked_point: String,
    /// Looped clip time reported by the motion source.
    pub local_time: f64,
    /// Looped clip frame reported by the motion source.
    pub local_frame: i64,
    /// Global time last pushed into the source (warped for non-reference characters).
    pub presented_time: f64,
    pub cycle_count: u32,
    pub sample_count: usize,
    /// `None` until extraction ran.
    pub sync_frame_count: Option<usize>,
    pub frozen: bool,
    pub is_reference: bool,
}

impl CharacterTelemetry {
    pub(crate) fn capture(character: &Character, is_reference: bool) -> Self {
        Self {
            id: character.id.clone(),
            tracked_point: character.tracked_point.clone(),
            local_time: character.source.local_time(),
            local_frame: character.source.local_frame(),
            presented_time: character.presented_time,
            cycle_count: character.store.cycle_count(),
            sample_count: character.store.len(),
            sync_frame_count: character.store.sync_frames().map(|s| s.len()),
            frozen: character.frozen,
            is_reference,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub mode: PlaybackMode,
    pub elapsed_time: f64,
    pub time_warp: f64,
    pub characters: Vec<CharacterTelemetry>,
}

impl PlaybackSnapshot {
    pub fn character(&self, id: &CharacterId) -> Option<&CharacterTelemetry> {
        self.characters.iter().find(|c| &c.id == id)
    }
}
