use eframe::egui;
use egui_phosphor::regular::{
    ARROW_COUNTER_CLOCKWISE, FAST_FORWARD, FLOPPY_DISK, PAUSE, PLAY, REWIND,
};

use super::ViewerApp;

pub(super) fn show(app: &mut ViewerApp, ui: &mut egui::Ui) {
    ui.heading("GaitSync");

    ui.horizontal(|ui| {
        if ui
            .button(ARROW_COUNTER_CLOCKWISE)
            .on_hover_text(tooltip("Restart", app.hotkeys.restart))
            .clicked()
        {
            app.playback.request_restart();
        }
        if ui
            .button(REWIND)
            .on_hover_text(tooltip("Halve time warp", app.hotkeys.slower))
            .clicked()
        {
            app.playback.request_slower();
        }
        let (icon, label) = if app.paused { (PLAY, "Resume") } else { (PAUSE, "Pause") };
        if ui
            .button(icon)
            .on_hover_text(tooltip(label, app.hotkeys.pause))
            .clicked()
        {
            app.playback.toggle_pause();
        }
        if ui
            .button(FAST_FORWARD)
            .on_hover_text(tooltip("Double time warp", app.hotkeys.faster))
            .clicked()
        {
            app.playback.request_faster();
        }
        if ui
            .button(FLOPPY_DISK)
            .on_hover_text(tooltip("Export session", app.hotkeys.export))
            .clicked()
        {
            app.export_dialog();
        }
    });
    if let Some(status) = &app.status {
        ui.small(status);
    }
    ui.separator();

    let snap = app
        .telemetry
        .latest()
        .unwrap_or_else(|| app.engine.snapshot());
    if snap.characters.is_empty() {
        ui.label("No characters loaded");
        return;
    }

    egui::Grid::new("hud_playback").num_columns(2).show(ui, |ui| {
        ui.label("Mode");
        ui.label(if app.paused {
            format!("{} (paused)", snap.mode)
        } else {
            snap.mode.to_string()
        });
        ui.end_row();
        ui.label("Run time");
        ui.label(format!("{:.3} s", snap.elapsed_time));
        ui.end_row();
        ui.label("Time warp");
        ui.label(format!("x{}", snap.time_warp));
        ui.end_row();
        ui.label("Markers");
        ui.label(format!("{} (next at {:.1} s)", app.markers.len(), app.engine.next_marker_time()));
        ui.end_row();
    });
    ui.separator();

    egui::Grid::new("hud_characters")
        .striped(true)
        .num_columns(6)
        .show(ui, |ui| {
            ui.strong("Character");
            ui.strong("Seq time");
            ui.strong("Frame");
            ui.strong("Cycles");
            ui.strong("Sync");
            ui.strong("");
            ui.end_row();
            for c in &snap.characters {
                let name = if c.is_reference {
                    format!("{} (ref)", c.id)
                } else {
                    c.id.to_string()
                };
                ui.label(name).on_hover_text(format!(
                    "tracked point: {}\npresented time: {:.3} s\nsamples: {}",
                    c.tracked_point, c.presented_time, c.sample_count
                ));
                ui.label(format!("{:.3}", c.local_time));
                ui.label(c.local_frame.to_string());
                ui.label(c.cycle_count.to_string());
                ui.label(
                    c.sync_frame_count
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                ui.label(if c.frozen { "frozen" } else { "" });
                ui.end_row();
            }
        });
    ui.separator();

    ui.label("Events");
    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .max_height(ui.available_height())
        .show(ui, |ui| {
            for line in &app.log {
                ui.monospace(line);
            }
        });
}

fn tooltip(label: &str, hotkey: Option<crate::data::hotkeys::Hotkey>) -> String {
    match hotkey {
        Some(hk) => format!("{} ({})", label, hk),
        None => label.to_string(),
    }
}
