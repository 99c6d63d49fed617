//! Event stream emitted by the synchronization engine.
//!
//! Rendering and HUD code subscribe through [`EventController`] with an
//! [`EventFilter`]. Each event carries a set of [`EventKind`] flags so a
//! single occurrence can match several categories (a restart is also a
//! markers-cleared event).
//!
//! The filter is a simple OR mask: an event is delivered when
//! `(event.kinds & filter) != 0`.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use nalgebra::Point3;

use crate::data::characters::CharacterId;
use crate::data::playback::PlaybackMode;

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the *categories* an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Visualization ───────────────────────────────────────────────────
    /// Drop a transient marker at the reference character's tracked point.
    pub const MARKER: Self = Self(1 << 0);
    /// All previously emitted markers should be removed.
    pub const MARKERS_CLEARED: Self = Self(1 << 1);

    // ── Collection ──────────────────────────────────────────────────────
    /// A character's clip looped (its cycle counter advanced).
    pub const CYCLE_COMPLETED: Self = Self(1 << 2);
    /// Sync frames were extracted for a character.
    pub const SYNC_FRAMES_READY: Self = Self(1 << 3);
    /// A tracked point could not be found on a character's skeleton.
    pub const LOOKUP_FAILED: Self = Self(1 << 4);

    // ── Playback ────────────────────────────────────────────────────────
    /// The engine switched between collecting and warping.
    pub const MODE_CHANGED: Self = Self(1 << 5);
    /// The synchronized window looped back to zero.
    pub const PLAYBACK_WRAPPED: Self = Self(1 << 6);
    /// `restart()` was applied.
    pub const RESTARTED: Self = Self(1 << 7);
    /// The global time warp multiplier changed.
    pub const TIME_WARP_CHANGED: Self = Self(1 << 8);
    /// A character started or stopped being held still.
    pub const FREEZE_CHANGED: Self = Self(1 << 9);

    /// Wildcard: matches *every* event kind.
    pub const ALL: Self = Self(u64::MAX);

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether `self` intersects with `other` (at least one bit in common).
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for EventKind {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }

        let pairs: &[(EventKind, &str)] = &[
            (EventKind::MARKER, "MARKER"),
            (EventKind::MARKERS_CLEARED, "MARKERS_CLEARED"),
            (EventKind::CYCLE_COMPLETED, "CYCLE_COMPLETED"),
            (EventKind::SYNC_FRAMES_READY, "SYNC_FRAMES_READY"),
            (EventKind::LOOKUP_FAILED, "LOOKUP_FAILED"),
            (EventKind::MODE_CHANGED, "MODE_CHANGED"),
            (EventKind::PLAYBACK_WRAPPED, "PLAYBACK_WRAPPED"),
            (EventKind::RESTARTED, "RESTARTED"),
            (EventKind::TIME_WARP_CHANGED, "TIME_WARP_CHANGED"),
            (EventKind::FREEZE_CHANGED, "FREEZE_CHANGED"),
        ];

        let mut names = Vec::new();
        let mut known_bits: u64 = 0;
        for (kind, name) in pairs {
            known_bits |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }

        // Bits that weren't covered by the known list
        let extra = self.0 & !known_bits;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata – per-event-type payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Where and how to draw a marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerMeta {
    /// Character whose tracked point was sampled (the reference).
    pub character: CharacterId,
    pub position: Point3<f64>,
    /// RGB in `0..=1`.
    pub color: [f32; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleMeta {
    pub character: CharacterId,
    pub cycle_count: u32,
    /// Samples held by the character's trajectory store.
    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncFramesMeta {
    pub character: CharacterId,
    pub sync_frames: Vec<f64>,
    /// At least two boundaries, so the character can be warped.
    pub usable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupMeta {
    pub character: CharacterId,
    pub point: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeMeta {
    pub from: PlaybackMode,
    pub to: PlaybackMode,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWarpMeta {
    pub previous: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreezeMeta {
    pub character: CharacterId,
    pub frozen: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// SyncEvent – the top-level event type
// ─────────────────────────────────────────────────────────────────────────────

/// An event emitted by the engine during a tick or a control call.
#[derive(Debug, Clone)]
pub struct SyncEvent {
    pub kinds: EventKind,
    /// Engine elapsed time (seconds) when the event was raised.
    pub timestamp: f64,

    pub marker: Option<MarkerMeta>,
    pub cycle: Option<CycleMeta>,
    pub sync_frames: Option<SyncFramesMeta>,
    pub lookup: Option<LookupMeta>,
    pub mode: Option<ModeMeta>,
    pub time_warp: Option<TimeWarpMeta>,
    pub freeze: Option<FreezeMeta>,
}

impl SyncEvent {
    pub fn new(kinds: EventKind, timestamp: f64) -> Self {
        Self {
            kinds,
            timestamp,
            marker: None,
            cycle: None,
            sync_frames: None,
            lookup: None,
            mode: None,
            time_warp: None,
            freeze: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// Selects which event categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &SyncEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

pub(crate) struct Subscriber {
    filter: EventFilter,
    sender: Sender<SyncEvent>,
}

/// Collects and distributes engine events to subscribers.
///
/// Attach a clone to the engine with
/// [`SyncEngine::set_event_controller`](crate::engine::SyncEngine::set_event_controller),
/// then call [`subscribe`](Self::subscribe) to receive events on an `mpsc` channel.
#[derive(Clone)]
pub struct EventController {
    pub(crate) inner: Arc<Mutex<EventCtrlInner>>,
}

pub(crate) struct EventCtrlInner {
    pub(crate) subscribers: Vec<Subscriber>,
    pub(crate) emitted: u64,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                emitted: 0,
            })),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<SyncEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribers.push(Subscriber { filter, sender: tx });
        }
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<SyncEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Deliver an event to every matching subscriber.
    ///
    /// Subscribers whose receiver was dropped are pruned the next time an
    /// event matches them.
    pub fn emit(&self, event: SyncEvent) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.emitted += 1;
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }

    /// Number of events emitted so far.
    pub fn emitted_count(&self) -> u64 {
        self.inner.lock().map(|i| i.emitted).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().map(|i| i.subscribers.len()).unwrap_or(0)
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_union_and_intersection() {
        let combined = EventKind::RESTARTED | EventKind::MARKERS_CLEARED;
        assert!(combined.contains(EventKind::RESTARTED));
        assert!(combined.contains(EventKind::MARKERS_CLEARED));
        assert!(!EventKind::MARKER.intersects(combined));
        assert_eq!(
            EventKind::MARKER.union(EventKind::MODE_CHANGED),
            EventKind::MARKER | EventKind::MODE_CHANGED
        );
    }

    #[test]
    fn filter_routes_by_kind() {
        let ctrl = EventController::new();
        let rx_all = ctrl.subscribe_all();
        let rx_markers = ctrl.subscribe(EventFilter::only(EventKind::MARKER));
        let rx_mode = ctrl.subscribe(EventFilter::only(EventKind::MODE_CHANGED));

        ctrl.emit(SyncEvent::new(EventKind::MARKER, 0.1));

        assert!(rx_all.try_recv().is_ok());
        assert!(rx_markers.try_recv().is_ok());
        assert!(rx_mode.try_recv().is_err());
        assert_eq!(ctrl.emitted_count(), 1);
    }

    #[test]
    fn timestamp_is_preserved() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe_all();
        ctrl.emit(SyncEvent::new(EventKind::PLAYBACK_WRAPPED, 2.5));
        let evt = rx.try_recv().unwrap();
        assert_eq!(evt.timestamp, 2.5);
    }

    #[test]
    fn dropped_receiver_is_pruned() {
        let ctrl = EventController::new();
        let rx1 = ctrl.subscribe_all();
        let rx2 = ctrl.subscribe_all();
        drop(rx1);

        ctrl.emit(SyncEvent::new(EventKind::MARKER, 0.0));
        assert!(rx2.try_recv().is_ok());
        assert_eq!(ctrl.subscriber_count(), 1);
    }

    #[test]
    fn display_names() {
        assert_eq!(format!("{}", EventKind::MARKER), "MARKER");
        let combo = EventKind::RESTARTED | EventKind::MARKERS_CLEARED;
        assert_eq!(format!("{}", combo), "MARKERS_CLEARED|RESTARTED");
        assert_eq!(format!("{}", EventKind::ALL), "ALL");
        assert!(format!("{}", EventKind(1 << 63)).starts_with("0x"));
    }

    #[test]
    fn event_kinds_do_not_overlap() {
        let all_kinds = [
            EventKind::MARKER,
            EventKind::MARKERS_CLEARED,
            EventKind::CYCLE_COMPLETED,
            EventKind::SYNC_FRAMES_READY,
            EventKind::LOOKUP_FAILED,
            EventKind::MODE_CHANGED,
            EventKind::PLAYBACK_WRAPPED,
            EventKind::RESTARTED,
            EventKind::TIME_WARP_CHANGED,
            EventKind::FREEZE_CHANGED,
        ];
        for (i, a) in all_kinds.iter().enumerate() {
            for (j, b) in all_kinds.iter().enumerate() {
                if i != j {
                    assert!(!a.intersects(*b), "EventKind bits {} and {} overlap", i, j);
                }
            }
        }
    }
}
