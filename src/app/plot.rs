use eframe::egui;
use egui::Color32;
use egui_plot::{Legend, Line, LineStyle, MarkerShape, Plot, Points, VLine};

use super::ViewerApp;

fn to_color32(rgb: [f32; 3]) -> Color32 {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgb(c(rgb[0]), c(rgb[1]), c(rgb[2]))
}

/// Tracked-point heights with sync frames and playback cursors on top,
/// marker positions (side view) underneath.
pub(super) fn show(app: &ViewerApp, ui: &mut egui::Ui) {
    let height = (ui.available_height() * 0.6).max(160.0);

    ui.label("Tracked point height over the recorded loop");
    Plot::new("heights")
        .legend(Legend::default())
        .height(height)
        .x_axis_label("time [s]")
        .show(ui, |plot_ui| {
            for c in app.engine.characters().iter() {
                let color = to_color32(c.color);
                let label = c.id.to_string();
                plot_ui.line(Line::new(label.clone(), c.store.heights()).color(color).width(1.5));

                for t in c.store.sync_frames().unwrap_or_default() {
                    plot_ui.vline(
                        VLine::new(label.clone(), *t)
                            .color(color.gamma_multiply(0.5))
                            .width(1.0)
                            .style(LineStyle::Dashed { length: 6.0 }),
                    );
                }

                let cursor = if c.frozen {
                    color.gamma_multiply(0.4)
                } else {
                    color
                };
                plot_ui.vline(VLine::new(label, c.presented_time).color(cursor).width(2.0));
            }
        });

    ui.separator();
    ui.label("Markers at the reference tracked point (side view)");
    Plot::new("markers")
        .data_aspect(1.0)
        .x_axis_label("x")
        .y_axis_label("y")
        .show(ui, |plot_ui| {
            for m in &app.markers {
                plot_ui.points(
                    Points::new(m.character.to_string(), vec![[m.position.x, m.position.y]])
                        .radius(3.0)
                        .shape(MarkerShape::Square)
                        .color(to_color32(m.color)),
                );
            }
        });
}
