//! Native viewer: drives a [`SyncEngine`] from the egui frame loop.
//!
//! The viewer is the rendering, HUD and keyboard-input collaborator. It
//! ticks the engine with the frame's wall-clock delta, turns marker events
//! into plotted points and shows the telemetry snapshot in a side panel.

mod hud;
mod plot;
mod run;

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::time::Duration;

use eframe::egui;

use crate::controllers::{PlaybackController, TelemetryController};
use crate::data::export;
use crate::data::hotkeys::{self, HotkeyName, Hotkeys};
use crate::engine::SyncEngine;
use crate::events::{EventController, EventKind, MarkerMeta, SyncEvent};

pub use run::run_viewer;

/// Markers kept for drawing; the oldest are dropped first.
const MAX_MARKERS: usize = 512;
const MAX_LOG_LINES: usize = 64;

pub struct ViewerApp {
    pub(crate) engine: SyncEngine,
    pub(crate) playback: PlaybackController,
    pub(crate) telemetry: TelemetryController,
    events: Receiver<SyncEvent>,
    pub(crate) hotkeys: Hotkeys,
    pub(crate) paused: bool,
    pub(crate) markers: VecDeque<MarkerMeta>,
    pub(crate) log: VecDeque<String>,
    pub(crate) status: Option<String>,
}

impl ViewerApp {
    pub fn new(mut engine: SyncEngine, hotkeys: Hotkeys) -> Self {
        let events_ctrl = EventController::new();
        let events = events_ctrl.subscribe_all();
        engine.set_event_controller(events_ctrl);
        let telemetry = TelemetryController::new();
        engine.set_telemetry_controller(telemetry.clone());

        Self {
            engine,
            playback: PlaybackController::new(),
            telemetry,
            events,
            hotkeys,
            paused: false,
            markers: VecDeque::with_capacity(MAX_MARKERS),
            log: VecDeque::with_capacity(MAX_LOG_LINES),
            status: None,
        }
    }

    /// Controller handle for pushing requests from outside the UI.
    pub fn playback_controller(&self) -> PlaybackController {
        self.playback.clone()
    }

    fn handle_hotkeys(&mut self, ctx: &egui::Context) {
        for action in hotkeys::detect_hotkey_actions(&self.hotkeys, ctx) {
            match action {
                HotkeyName::Restart => self.playback.request_restart(),
                HotkeyName::Slower => self.playback.request_slower(),
                HotkeyName::Faster => self.playback.request_faster(),
                HotkeyName::Pause => self.playback.toggle_pause(),
                HotkeyName::Export => self.export_dialog(),
            }
        }
    }

    fn apply_requests(&mut self) {
        let requests = self.playback.take();
        if let Some(p) = requests.pause {
            self.paused = p;
        }
        if requests.toggle_pause {
            self.paused = !self.paused;
        }
        self.engine.apply_requests(&requests);
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if event.kinds.contains(EventKind::MARKERS_CLEARED) {
                self.markers.clear();
            }
            if let Some(marker) = event.marker.clone() {
                if self.markers.len() == MAX_MARKERS {
                    self.markers.pop_front();
                }
                self.markers.push_back(marker);
            }
            if event.kinds != EventKind::MARKER {
                if self.log.len() == MAX_LOG_LINES {
                    self.log.pop_front();
                }
                self.log.push_back(describe_event(&event));
            }
        }
    }

    pub(crate) fn export_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("gaitsync-session.json")
            .add_filter("JSON", &["json"])
            .save_file()
        else {
            return;
        };
        self.status = Some(match export::save_session(&path, &self.engine) {
            Ok(()) => format!("Exported to {}", path.display()),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                format!("Export failed: {}", e)
            }
        });
    }
}

fn describe_event(event: &SyncEvent) -> String {
    let detail = if let Some(m) = &event.mode {
        format!(" {} -> {}", m.from, m.to)
    } else if let Some(c) = &event.cycle {
        format!(" {} cycle {}", c.character, c.cycle_count)
    } else if let Some(s) = &event.sync_frames {
        format!(" {} ({} frames)", s.character, s.sync_frames.len())
    } else if let Some(w) = &event.time_warp {
        format!(" x{}", w.current)
    } else if let Some(f) = &event.freeze {
        format!(" {} {}", f.character, if f.frozen { "frozen" } else { "resumed" })
    } else if let Some(l) = &event.lookup {
        format!(" {} missing '{}'", l.character, l.point)
    } else {
        String::new()
    };
    format!("{:7.3}s {}{}", event.timestamp, event.kinds, detail)
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_hotkeys(ctx);
        self.apply_requests();

        if !self.paused {
            let dt = ctx.input(|i| i.stable_dt) as f64;
            self.engine.tick(dt);
        }
        self.drain_events();

        egui::SidePanel::left("hud")
            .resizable(true)
            .default_width(340.0)
            .min_width(220.0)
            .show(ctx, |ui| {
                hud::show(self, ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            plot::show(self, ui);
        });

        // Request continuous repainting (~60 fps).
        ctx.request_repaint_after(Duration::from_millis(16));
    }
}
