//! Controllers for driving the engine from input handlers and reading it back.
//!
//! Input code (keyboard handlers, scripts, other threads) records requests on a
//! [`PlaybackController`]; the host loop drains them once per frame with
//! [`SyncEngine::apply_requests`](crate::engine::SyncEngine::apply_requests)
//! before calling `tick`. The [`TelemetryController`] holds the snapshot the
//! engine published after its last tick so a HUD can read committed values
//! between ticks.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::engine::snapshot::PlaybackSnapshot;

/// Requests pending for the next frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackRequests {
    pub restart: bool,
    /// Net number of time warp doublings (negative halves).
    pub time_warp_steps: i32,
    /// Pause (`Some(true)`) or resume (`Some(false)`) the host loop.
    pub pause: Option<bool>,
    pub toggle_pause: bool,
}

impl PlaybackRequests {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Records restart / time-warp / pause requests from input handlers.
#[derive(Clone)]
pub struct PlaybackController {
    pub(crate) inner: Arc<Mutex<PlaybackCtrlInner>>,
}

pub(crate) struct PlaybackCtrlInner {
    pub(crate) pending: PlaybackRequests,
}

impl PlaybackController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(PlaybackCtrlInner {
                pending: PlaybackRequests::default(),
            })),
        }
    }

    /// Request a restart of the synchronized window.
    pub fn request_restart(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.pending.restart = true;
        }
    }

    /// Request doubling the time warp multiplier.
    pub fn request_faster(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.pending.time_warp_steps += 1;
        }
    }

    /// Request halving the time warp multiplier.
    pub fn request_slower(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.pending.time_warp_steps -= 1;
        }
    }

    pub fn pause(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.pending.pause = Some(true);
            inner.pending.toggle_pause = false;
        }
    }

    pub fn resume(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.pending.pause = Some(false);
            inner.pending.toggle_pause = false;
        }
    }

    pub fn toggle_pause(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.pending.toggle_pause = !inner.pending.toggle_pause;
        }
    }

    /// Drain all pending requests.
    pub fn take(&self) -> PlaybackRequests {
        self.inner
            .lock()
            .map(|mut inner| std::mem::take(&mut inner.pending))
            .unwrap_or_default()
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest committed [`PlaybackSnapshot`] plus subscription to new ones.
#[derive(Clone)]
pub struct TelemetryController {
    pub(crate) inner: Arc<Mutex<TelemetryCtrlInner>>,
}

pub(crate) struct TelemetryCtrlInner {
    pub(crate) latest: Option<PlaybackSnapshot>,
    pub(crate) listeners: Vec<Sender<PlaybackSnapshot>>,
}

impl TelemetryController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TelemetryCtrlInner {
                latest: None,
                listeners: Vec::new(),
            })),
        }
    }

    /// Snapshot published after the most recent tick.
    pub fn latest(&self) -> Option<PlaybackSnapshot> {
        self.inner.lock().ok().and_then(|inner| inner.latest.clone())
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> Receiver<PlaybackSnapshot> {
        let (tx, rx) = std::sync::mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            inner.listeners.push(tx);
        }
        rx
    }

    pub(crate) fn publish(&self, snapshot: PlaybackSnapshot) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .listeners
                .retain(|s| s.send(snapshot.clone()).is_ok());
            inner.latest = Some(snapshot);
        }
    }
}

impl Default for TelemetryController {
    fn default() -> Self {
        Self::new()
    }
}
