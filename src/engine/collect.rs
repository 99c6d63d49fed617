use tracing::{debug, info};

use super::{warn_lookup_once, SyncEngine};
use crate::data::characters::CharacterId;
use crate::data::playback::PlaybackMode;
use crate::data::trajectory::RecordOutcome;
use crate::events::{CycleMeta, EventKind, LookupMeta, ModeMeta, SyncEvent, SyncFramesMeta};

impl SyncEngine {
    /// One collecting tick: advance by the fixed step, pose and sample every
    /// character at that same time, then evaluate the gate.
    pub(super) fn collect_step(&mut self, pending: &mut Vec<SyncEvent>) {
        let step = self.config.collect_step_secs;
        let magnitude = self.config.magnitude;
        self.playback.elapsed_time += step;
        let now = self.playback.elapsed_time;

        let ids: Vec<CharacterId> = self.characters.ids().to_vec();
        for id in &ids {
            let Some(character) = self.characters.get_mut(id) else {
                continue;
            };
            character.pose_at(now);
            character.frozen = false;
            let frame = character.source.local_frame();

            // Wrap detection runs before the append so the wrapped frame is not recorded.
            if self.playback.observe_frame(id, frame) {
                let cycle_count = character.store.complete_cycle();
                debug!(character = %id, cycle_count, samples = character.store.len(), "clip looped");
                let mut event = SyncEvent::new(EventKind::CYCLE_COMPLETED, now);
                event.cycle = Some(CycleMeta {
                    character: id.clone(),
                    cycle_count,
                    sample_count: character.store.len(),
                });
                pending.push(event);
            }

            if !character.store.is_closed() {
                match character.source.tracked_point(&character.tracked_point) {
                    Some(segment) => {
                        if character.store.record(frame, now, segment.end)
                            == RecordOutcome::OutOfOrder
                        {
                            debug!(character = %id, time = now, "sample skipped: clock behind store");
                        }
                    }
                    None => {
                        if warn_lookup_once(character) {
                            let mut event = SyncEvent::new(EventKind::LOOKUP_FAILED, now);
                            event.lookup = Some(LookupMeta {
                                character: id.clone(),
                                point: character.tracked_point.clone(),
                            });
                            pending.push(event);
                        }
                    }
                }
            }

            if character.store.ensure_sync_frames(step, magnitude) {
                let frames = character.store.sync_frames().unwrap_or_default().to_vec();
                let usable = frames.len() >= 2;
                info!(
                    character = %id,
                    samples = character.store.len(),
                    sync_frames = frames.len(),
                    usable,
                    "sync frames extracted"
                );
                let mut event = SyncEvent::new(EventKind::SYNC_FRAMES_READY, now);
                event.sync_frames = Some(SyncFramesMeta {
                    character: id.clone(),
                    sync_frames: frames,
                    usable,
                });
                pending.push(event);
            }
        }

        let reference = self.reference_clone();
        if self
            .config
            .gating
            .is_satisfied(&self.characters, reference.as_ref())
        {
            self.enter_warping(now, pending);
        }
    }

    fn enter_warping(&mut self, now: f64, pending: &mut Vec<SyncEvent>) {
        let from = self.playback.mode;
        self.playback.mode = PlaybackMode::Warping;
        self.playback.elapsed_time = 0.0;
        self.markers.reset(&self.config.marker);
        info!(collected_for = now, gating = ?self.config.gating, "switching to warping");

        let mut event = SyncEvent::new(EventKind::MODE_CHANGED, now);
        event.mode = Some(ModeMeta {
            from,
            to: PlaybackMode::Warping,
        });
        pending.push(event);
    }
}
