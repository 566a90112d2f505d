use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::channel_color;
use crate::data::model::Channel;
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – session overview
// ---------------------------------------------------------------------------

/// Render the left panel: loaded channels, reference geometry, backend.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Channels");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            let mut to_remove = None;
            for channel in Channel::ALL {
                let text = RichText::new(channel.to_string()).strong().color(channel_color(channel));
                match state.datasets.get(&channel) {
                    Some(ds) => {
                        egui::CollapsingHeader::new(text)
                            .id_salt(channel.label())
                            .default_open(true)
                            .show(ui, |ui: &mut Ui| {
                                ui.label(&ds.name);
                                if ds.is_empty() {
                                    ui.label(RichText::new("no usable rows").color(Color32::YELLOW));
                                } else {
                                    ui.label(format!("{} rows ({})", ds.len(), ds.encoding));
                                }
                                if let Some((lo, hi)) = ds.depth_range() {
                                    ui.label(format!("depth {lo:.2} – {hi:.2} m"));
                                }
                                if ds.skipped_rows > 0 {
                                    ui.label(
                                        RichText::new(format!("{} rows skipped", ds.skipped_rows))
                                            .color(Color32::YELLOW),
                                    );
                                }
                                if ds.precomputed_trend.is_some() {
                                    ui.label("has trend column");
                                } else if ds.trend_gaps > 0 {
                                    ui.label(
                                        RichText::new(format!("trend column ignored ({} gaps)", ds.trend_gaps))
                                            .color(Color32::YELLOW),
                                    );
                                }
                                if let Some(record) = &ds.stretch {
                                    ui.label(format!("stretched ×{:.3}", record.scale_factor));
                                }
                                if let Some(e) = state.smoothing_errors.get(&channel) {
                                    ui.label(RichText::new(e).color(Color32::RED));
                                }
                                if ui.small_button("Remove").clicked() {
                                    to_remove = Some(channel);
                                }
                            });
                    }
                    None => {
                        ui.label(text);
                        ui.label("  not loaded");
                    }
                }
            }
            if let Some(channel) = to_remove {
                state.remove_channel(channel);
            }

            ui.add_space(8.0);
            ui.heading("Reference");
            ui.separator();
            let g = &state.config.geometry;
            ui.label(format!("distance {:.3} m", g.reference_distance));
            ui.label(format!("direction {:.3}°", g.direction_angle));
            ui.label(format!(
                "station {}+{} (×{})",
                g.reference_main, g.reference_sub, g.conversion_factor
            ));
            match &state.config.source {
                Some(path) => ui.label(format!("from {}", path.display())),
                None => ui.label(RichText::new("built-in defaults").italics()),
            };

            ui.add_space(8.0);
            ui.heading("Output");
            ui.separator();
            ui.label(state.output_dir.display().to_string());
            if ui.button("Change folder…").clicked() {
                if let Some(dir) = rfd::FileDialog::new().set_title("Output folder").pick_folder() {
                    state.set_output_dir(dir);
                }
            }
            let backend = if state.exporter.is_available() {
                RichText::new(format!("{} (.{})", state.exporter.name(), state.exporter.extension()))
            } else {
                RichText::new("point-cloud export unavailable").color(Color32::YELLOW)
            };
            ui.label(backend);
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu and the tab strip.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open logs…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in Tab::ALL {
            ui.selectable_value(&mut state.tab, tab, tab.title());
        }

        ui.separator();

        if let Some(merged) = &state.merged {
            ui.label(format!(
                "{} rows, {} placed in 3D",
                merged.rows.len(),
                merged.report.total_resolved()
            ));
        }
    });
}

/// Render the last action's outcome.
pub fn status_bar(ui: &mut Ui, state: &AppState) {
    match &state.status {
        Some(status) if status.is_error => {
            ui.label(RichText::new(&status.text).color(Color32::RED));
        }
        Some(status) => {
            ui.label(&status.text);
        }
        None => {
            ui.label("Ready");
        }
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open drilling logs (L / M / R)")
        .add_filter("Drilling logs", &["csv", "txt"])
        .add_filter("All files", &["*"])
        .pick_files();

    if let Some(paths) = files {
        state.load_files(&paths);
    }
}
