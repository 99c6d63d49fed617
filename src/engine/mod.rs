//! The synchronization orchestrator.
//!
//! [`SyncEngine`] owns every character, its trajectory store and the playback
//! state. The host calls [`SyncEngine::tick`] once per frame:
//!
//! - while **collecting**, every character is posed on a fixed clock step and
//!   its tracked point recorded until the clip loops once; sync frames are
//!   then extracted for that store.
//! - once the gating policy is satisfied the engine switches to **warping**:
//!   the reference character follows the (time-warped) wall clock and every
//!   other character is posed at the time obtained by warping the reference
//!   clock onto its own sync frames.
//!
//! Nothing inside `tick` fails. Missing bones, short sync-frame sets and
//! out-of-range warps are logged and degrade to skipping or freezing the
//! affected character for that tick.

mod collect;
pub mod markers;
pub mod snapshot;
mod warping;

use tracing::{debug, info, warn};

use crate::config::SyncConfig;
use crate::controllers::{PlaybackRequests, TelemetryController};
use crate::data::characters::{Character, CharacterId, CharacterSet};
use crate::data::playback::{PlaybackMode, PlaybackState};
use crate::error::{SyncError, SyncResult};
use crate::events::{EventController, EventKind, MarkerMeta, SyncEvent, TimeWarpMeta};
use crate::motion::sequence::SequencePlayer;
use crate::motion::synthetic;
use crate::motion::MotionSource;

use markers::MarkerSchedule;
use snapshot::{CharacterTelemetry, PlaybackSnapshot};

/// Bounds for the time warp multiplier (2^-10 .. 2^10).
pub const MIN_TIME_WARP: f64 = 1.0 / 1024.0;
pub const MAX_TIME_WARP: f64 = 1024.0;

pub struct SyncEngine {
    config: SyncConfig,
    characters: CharacterSet,
    playback: PlaybackState,
    markers: MarkerSchedule,
    events: Option<EventController>,
    telemetry: Option<TelemetryController>,
}

impl SyncEngine {
    /// Build an engine with no characters. Fails if the config is invalid.
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        config.validate()?;
        let playback = PlaybackState::new(config.initial_time_warp);
        let markers = MarkerSchedule::new(&config.marker);
        Ok(Self {
            config,
            characters: CharacterSet::new(),
            playback,
            markers,
            events: None,
            telemetry: None,
        })
    }

    /// Build an engine and load every character listed in the config as a
    /// procedural gait clip.
    pub fn from_config(config: SyncConfig) -> SyncResult<Self> {
        let mut engine = Self::new(config)?;
        engine.load_configured_characters()?;
        Ok(engine)
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn set_event_controller(&mut self, events: EventController) {
        self.events = Some(events);
    }

    pub fn set_telemetry_controller(&mut self, telemetry: TelemetryController) {
        self.telemetry = Some(telemetry);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────

    /// Register a character. The engine is ready once one is loaded.
    ///
    /// Characters must be added while collecting: a late arrival would never
    /// be sampled. Call [`teardown`](Self::teardown) to start over.
    pub fn add_character<I: Into<CharacterId>, S: Into<String>>(
        &mut self,
        id: I,
        tracked_point: S,
        source: Box<dyn MotionSource>,
    ) -> SyncResult<&mut Character> {
        let character = Character::new(
            id.into(),
            tracked_point.into(),
            source,
            self.config.sample_capacity,
        );
        self.insert_character(character)
    }

    fn insert_character(&mut self, character: Character) -> SyncResult<&mut Character> {
        let id = character.id.clone();
        if self.playback.mode != PlaybackMode::Collecting {
            return Err(SyncError::CollectionFinished(id.to_string()));
        }
        let point = character.tracked_point.clone();
        let source = character.source.describe();
        if self.characters.insert(character).is_err() {
            return Err(SyncError::DuplicateCharacter(id.to_string()));
        }
        info!(character = %id, point = %point, source = %source, "loaded character");
        self.characters
            .get_mut(&id)
            .ok_or_else(|| SyncError::UnknownCharacter(id.to_string()))
    }

    /// Synthesize and register the characters described in the config.
    pub fn load_configured_characters(&mut self) -> SyncResult<()> {
        let specs = self.config.characters.clone();
        for spec in specs {
            let gait = spec.gait.clone().unwrap_or_default();
            let clip = synthetic::synthesize(spec.id.as_str(), &spec.tracked_point, &gait)?;
            let character = self.add_character(
                spec.id.clone(),
                spec.tracked_point.clone(),
                Box::new(SequencePlayer::new(clip)),
            )?;
            character.color = spec.color;
        }
        Ok(())
    }

    /// Drop every character and return to the initial, not-ready state.
    pub fn teardown(&mut self) {
        info!(count = self.characters.len(), "tearing down engine");
        self.characters.clear();
        self.playback = PlaybackState::new(self.config.initial_time_warp);
        self.markers.reset(&self.config.marker);
    }

    pub fn is_ready(&self) -> bool {
        !self.characters.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Frame loop
    // ─────────────────────────────────────────────────────────────────────

    /// Advance one frame by `elapsed_wall_time` seconds.
    ///
    /// Returns `false` without touching any state when no character is loaded.
    pub fn tick(&mut self, elapsed_wall_time: f64) -> bool {
        if !self.is_ready() {
            return false;
        }
        let mut pending = Vec::new();
        match self.playback.mode {
            PlaybackMode::Collecting => self.collect_step(&mut pending),
            PlaybackMode::Warping => self.warp_step(elapsed_wall_time, &mut pending),
        }
        self.emit_marker_if_due(&mut pending);
        self.flush(pending);
        self.publish_snapshot();
        true
    }

    /// Apply the requests drained from a
    /// [`PlaybackController`](crate::controllers::PlaybackController).
    pub fn apply_requests(&mut self, requests: &PlaybackRequests) {
        if requests.restart {
            self.restart();
        }
        for _ in 0..requests.time_warp_steps.max(0) {
            self.increase_time_warp();
        }
        for _ in 0..(-requests.time_warp_steps).max(0) {
            self.decrease_time_warp();
        }
    }

    /// Rewind the synchronized window to zero.
    ///
    /// The mode, trajectory stores and sync frames are kept. Every character
    /// is posed at the rewound clock, markers are rescheduled and a
    /// `RESTARTED | MARKERS_CLEARED` event is emitted.
    pub fn restart(&mut self) {
        if !self.is_ready() {
            debug!("restart ignored: no characters loaded");
            return;
        }
        info!(mode = %self.playback.mode, from = self.playback.elapsed_time, "restart");
        self.playback.elapsed_time = 0.0;
        self.playback.forget_frames();
        self.markers.reset(&self.config.marker);

        let mut pending = vec![SyncEvent::new(
            EventKind::RESTARTED | EventKind::MARKERS_CLEARED,
            0.0,
        )];
        match self.playback.mode {
            PlaybackMode::Collecting => self.characters.for_each_mut(|c| c.pose_at(0.0)),
            PlaybackMode::Warping => self.pose_warped(&mut pending),
        }
        self.flush(pending);
        self.publish_snapshot();
    }

    pub fn increase_time_warp(&mut self) {
        self.set_time_warp(self.playback.time_warp * 2.0);
    }

    pub fn decrease_time_warp(&mut self) {
        self.set_time_warp(self.playback.time_warp / 2.0);
    }

    fn set_time_warp(&mut self, requested: f64) {
        let previous = self.playback.time_warp;
        let current = requested.clamp(MIN_TIME_WARP, MAX_TIME_WARP);
        if current == previous {
            debug!(time_warp = previous, "time warp at limit");
            return;
        }
        self.playback.time_warp = current;
        info!(previous, current, "time warp changed");
        let mut event = SyncEvent::new(EventKind::TIME_WARP_CHANGED, self.playback.elapsed_time);
        event.time_warp = Some(TimeWarpMeta { previous, current });
        self.flush(vec![event]);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn time_warp(&self) -> f64 {
        self.playback.time_warp
    }

    pub fn elapsed_time(&self) -> f64 {
        self.playback.elapsed_time
    }

    pub fn mode(&self) -> PlaybackMode {
        self.playback.mode
    }

    pub fn characters(&self) -> &CharacterSet {
        &self.characters
    }

    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    /// The configured reference, or the first loaded character.
    pub fn reference_id(&self) -> Option<&CharacterId> {
        match &self.config.reference {
            Some(id) if self.characters.contains(id) => Some(id),
            _ => self.characters.first_id(),
        }
    }

    /// Sync frames of a character, `None` until extracted.
    pub fn sync_frames(&self, id: &CharacterId) -> Option<&[f64]> {
        self.characters.get(id).and_then(|c| c.store.sync_frames())
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        let reference = self.reference_id();
        PlaybackSnapshot {
            mode: self.playback.mode,
            elapsed_time: self.playback.elapsed_time,
            time_warp: self.playback.time_warp,
            characters: self
                .characters
                .iter()
                .map(|c| CharacterTelemetry::capture(c, Some(&c.id) == reference))
                .collect(),
        }
    }

    pub fn next_marker_time(&self) -> f64 {
        self.markers.next_time()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    fn reference_clone(&self) -> Option<CharacterId> {
        self.reference_id().cloned()
    }

    fn emit_marker_if_due(&mut self, pending: &mut Vec<SyncEvent>) {
        let elapsed = self.playback.elapsed_time;
        if !self.markers.is_due(&self.config.marker, elapsed) {
            return;
        }
        self.markers.advance(&self.config.marker);

        let Some(reference) = self.reference_clone() else {
            return;
        };
        let Some(character) = self.characters.get(&reference) else {
            return;
        };
        match character.source.tracked_point(&character.tracked_point) {
            Some(segment) => {
                let mut event = SyncEvent::new(EventKind::MARKER, elapsed);
                event.marker = Some(MarkerMeta {
                    character: reference,
                    position: segment.end,
                    color: self.config.marker.color,
                });
                pending.push(event);
            }
            None => debug!(character = %reference, "marker skipped: tracked point missing"),
        }
    }

    fn flush(&self, pending: Vec<SyncEvent>) {
        let Some(events) = &self.events else {
            return;
        };
        for event in pending {
            events.emit(event);
        }
    }

    fn publish_snapshot(&self) {
        if let Some(telemetry) = &self.telemetry {
            telemetry.publish(self.snapshot());
        }
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("mode", &self.playback.mode)
            .field("elapsed_time", &self.playback.elapsed_time)
            .field("time_warp", &self.playback.time_warp)
            .field("characters", &self.characters)
            .finish()
    }
}

pub(crate) fn warn_lookup_once(character: &mut Character) -> bool {
    if character.lookup_failed {
        return false;
    }
    character.lookup_failed = true;
    warn!(
        character = %character.id,
        point = %character.tracked_point,
        "tracked point missing from skeleton; skipping samples"
    );
    true
}
