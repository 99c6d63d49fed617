//! Entry point for running the viewer as a native window.

use eframe::egui;

use crate::data::hotkeys::Hotkeys;
use crate::engine::SyncEngine;

use super::ViewerApp;

/// Open a native window driving `engine` once per frame.
///
/// Hotkeys are read from `$HOME/.gaitsync/hotkeys.yaml` when present. The
/// call blocks until the window is closed.
pub fn run_viewer(engine: SyncEngine, title: &str) -> eframe::Result<()> {
    let hotkeys = match Hotkeys::load_or_default() {
        Ok(hk) => hk,
        Err(e) => {
            tracing::warn!(error = %e, "could not load hotkeys, using defaults");
            Hotkeys::default()
        }
    };
    let app = ViewerApp::new(engine, hotkeys);

    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(egui::vec2(1280.0, 820.0)),
        ..Default::default()
    };

    eframe::run_native(
        title,
        opts,
        Box::new(|cc| {
            // Install Phosphor icon font before creating the app.
            let mut fonts = egui::FontDefinitions::default();
            egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
            cc.egui_ctx.set_fonts(fonts);
            Ok(Box::new(app))
        }),
    )
}
