use tracing::{debug, trace};

use super::SyncEngine;
use crate::data::characters::{Character, CharacterId};
use crate::data::warp::warp_clamped;
use crate::events::{EventKind, FreezeMeta, SyncEvent};

impl SyncEngine {
    /// One warping tick: advance the reference clock by the scaled wall-clock
    /// increment, loop it at the reference's last sync frame, and pose every
    /// other character at the warped time.
    ///
    /// A loop rewinds the marker schedule along with the clock.
    pub(super) fn warp_step(&mut self, elapsed_wall_time: f64, pending: &mut Vec<SyncEvent>) {
        let increment = if elapsed_wall_time.is_finite() && elapsed_wall_time > 0.0 {
            elapsed_wall_time
        } else {
            trace!(elapsed_wall_time, "ignoring non-positive wall-clock increment");
            0.0
        };
        self.playback.elapsed_time += self.playback.time_warp * increment;

        let last = self
            .reference_id()
            .and_then(|id| self.characters.get(id))
            .and_then(|c| c.store.usable_sync_frames())
            .and_then(|s| s.last().copied());
        if let Some(last) = last {
            if self.playback.elapsed_time > last {
                debug!(elapsed = self.playback.elapsed_time, window_end = last, "playback wrapped");
                self.playback.elapsed_time = 0.0;
                self.markers.reset(&self.config.marker);
                pending.push(SyncEvent::new(
                    EventKind::PLAYBACK_WRAPPED | EventKind::MARKERS_CLEARED,
                    0.0,
                ));
            }
        }
        self.pose_warped(pending);
    }

    /// Pose the reference at the current clock and every other character at
    /// the clock warped onto its own sync frames.
    pub(super) fn pose_warped(&mut self, pending: &mut Vec<SyncEvent>) {
        let Some(reference) = self.reference_clone() else {
            return;
        };
        let reference_frames: Option<Vec<f64>> = self
            .characters
            .get(&reference)
            .and_then(|c| c.store.usable_sync_frames())
            .map(|s| s.to_vec());
        let now = self.playback.elapsed_time;

        let ids: Vec<CharacterId> = self.characters.ids().to_vec();
        for id in &ids {
            let Some(character) = self.characters.get_mut(id) else {
                continue;
            };
            if *id == reference {
                character.pose_at(now);
                set_frozen(character, false, now, pending);
                continue;
            }

            let target = match (&reference_frames, character.store.usable_sync_frames()) {
                (Some(source), Some(own)) => warp_clamped(now, source, own),
                _ => None,
            };
            match target {
                Some(time) => {
                    character.pose_at(time);
                    set_frozen(character, false, now, pending);
                }
                None => set_frozen(character, true, now, pending),
            }
        }
    }
}

/// Track freeze transitions; a frozen character keeps its last pose.
fn set_frozen(character: &mut Character, frozen: bool, now: f64, pending: &mut Vec<SyncEvent>) {
    if character.frozen == frozen {
        return;
    }
    character.frozen = frozen;
    if frozen {
        debug!(character = %character.id, "no usable sync frames; holding pose");
    } else {
        debug!(character = %character.id, "resumed warped playback");
    }
    let mut event = SyncEvent::new(EventKind::FREEZE_CHANGED, now);
    event.freeze = Some(FreezeMeta {
        character: character.id.clone(),
        frozen,
    });
    pending.push(event);
}
