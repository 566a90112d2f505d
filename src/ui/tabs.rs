use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, DatePickerButton, TableBuilder};

use super::plot::{self, Projection};
use crate::color::channel_color;
use super::Drafts;
use crate::data::model::{Channel, ChannelDataset};
use crate::data::noise::{SmoothingMethod, SpikePolicy};
use crate::data::process::{RowStatus, SurveyRegion};
use crate::state::AppState;

fn empty_hint(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open drilling logs to begin  (File → Open logs…)");
    });
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Merged rows as a table above the raw energy plot.
pub fn overview(ui: &mut Ui, state: &mut AppState, drafts: &mut Drafts) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Header row");
        ui.add(egui::DragValue::new(&mut state.load_options.header_row).range(0..=50))
            .on_hover_text("Lines to skip before the column names when opening files");

        ui.separator();
        ui.label("Depth");
        ui.add(egui::DragValue::new(&mut drafts.crop_from).speed(0.1).suffix(" m"));
        ui.label("to");
        ui.add(egui::DragValue::new(&mut drafts.crop_to).speed(0.1).suffix(" m"));
        if ui.add_enabled(!state.datasets.is_empty(), egui::Button::new("Crop")).clicked() {
            state.crop_depth(drafts.crop_from, drafts.crop_to);
        }

        ui.separator();
        ui.label("Step");
        ui.add(
            egui::DragValue::new(&mut drafts.resample_step)
                .range(0.001..=10.0)
                .speed(0.01)
                .suffix(" m"),
        );
        if ui.add_enabled(!state.datasets.is_empty(), egui::Button::new("Resample")).clicked() {
            state.resample_channels(drafts.resample_step);
        }
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        let loaded = !state.datasets.is_empty();
        ui.label("Energy");
        ui.add(egui::DragValue::new(&mut drafts.energy_min).speed(1.0));
        ui.label("to");
        ui.add(egui::DragValue::new(&mut drafts.energy_max).speed(1.0));
        if ui.add_enabled(loaded, egui::Button::new("Keep energies")).clicked() {
            state.crop_energy(drafts.energy_min, drafts.energy_max);
        }

        ui.separator();
        ui.label("Rows");
        ui.add(
            egui::DragValue::new(&mut drafts.percentile_start)
                .range(0.0..=100.0)
                .suffix(" %"),
        );
        ui.label("to");
        ui.add(egui::DragValue::new(&mut drafts.percentile_end).range(0.0..=100.0).suffix(" %"));
        if ui.add_enabled(loaded, egui::Button::new("Keep rows")).clicked() {
            state.crop_percentile(drafts.percentile_start, drafts.percentile_end);
        }
    });

    if !state.datasets.is_empty() {
        egui::CollapsingHeader::new("Stretch depths")
            .id_salt("stretch_depths")
            .show(ui, |ui: &mut Ui| stretch_grid(ui, state, drafts));
    }

    let Some(merged) = &state.merged else {
        empty_hint(ui);
        return;
    };

    let available = ui.available_height();
    ui.push_id("merged_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(available * 0.45)
            .column(Column::auto())
            .columns(Column::initial(90.0).at_least(60.0), 8)
            .header(20.0, |mut header| {
                for title in ["Ch", "Depth", "Raw", "Energy", "Spike", "Distance", "X", "Y", "Z"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, merged.rows.len(), |mut row| {
                    let r = &merged.rows[row.index()];
                    row.col(|ui: &mut Ui| {
                        ui.label(r.channel.label());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.3}", r.depth));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.2}", r.raw));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.2}", r.energy));
                    });
                    row.col(|ui: &mut Ui| {
                        if r.is_spike {
                            ui.label(RichText::new("●").color(Color32::RED));
                        }
                    });
                    row.col(|ui: &mut Ui| match r.distance {
                        Some(d) => {
                            ui.label(format!("{d:.3}"));
                        }
                        None => {
                            let why = match r.status {
                                RowStatus::NoRegion => "no region",
                                _ => "bad station",
                            };
                            ui.label(RichText::new(why).italics());
                        }
                    });
                    let pos = r.position.unwrap_or_default();
                    for v in [pos.x, pos.y, pos.z] {
                        row.col(|ui: &mut Ui| {
                            if r.position.is_some() {
                                ui.label(format!("{v:.3}"));
                            }
                        });
                    }
                });
            });
    });

    ui.separator();
    let datasets: Vec<&ChannelDataset> = state.datasets.values().collect();
    plot::raw_energy_plot(ui, "overview_raw", &datasets);
}

/// Per-channel target hole length with stretch and reset buttons.
fn stretch_grid(ui: &mut Ui, state: &mut AppState, drafts: &mut Drafts) {
    let mut action = None;
    egui::Grid::new("stretch_grid").striped(true).show(ui, |ui: &mut Ui| {
        for title in ["Channel", "Depth", "Target", "", "Scale"] {
            ui.strong(title);
        }
        ui.end_row();

        for (&channel, ds) in &state.datasets {
            let (lo, hi) = ds.depth_range().unwrap_or((0.0, 0.0));
            let target = drafts.stretch_targets.entry(channel).or_insert(hi);

            ui.label(RichText::new(channel.to_string()).color(channel_color(channel)));
            ui.label(format!("{lo:.2} – {hi:.2} m"));
            ui.add(egui::DragValue::new(target).range(0.01..=1000.0).speed(0.1).suffix(" m"));
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Stretch").clicked() {
                    action = Some((channel, Some(*target)));
                }
                if ui.add_enabled(ds.stretch.is_some(), egui::Button::new("Reset")).clicked() {
                    action = Some((channel, None));
                }
            });
            match &ds.stretch {
                Some(record) => ui.label(format!("×{:.3} (was {:.2} m)", record.scale_factor, record.original_max)),
                None => ui.label("original"),
            };
            ui.end_row();
        }
    });

    match action {
        Some((channel, Some(target))) => {
            state.stretch_channel(channel, target).ok();
        }
        Some((channel, None)) => {
            state.reset_stretch(channel).ok();
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Noise removal
// ---------------------------------------------------------------------------

pub fn noise(ui: &mut Ui, state: &mut AppState) {
    if state.datasets.is_empty() {
        empty_hint(ui);
        return;
    }

    ui.horizontal_wrapped(|ui: &mut Ui| {
        egui::ComboBox::from_id_salt("smoothing_method")
            .selected_text(state.params.method.label())
            .show_ui(ui, |ui: &mut Ui| {
                for m in SmoothingMethod::ALL {
                    ui.selectable_value(&mut state.params.method, m, m.label());
                }
            });

        ui.label("Window");
        ui.add(egui::DragValue::new(&mut state.params.window).range(3..=2001).speed(2));
        if state.params.method == SmoothingMethod::Lowess {
            ui.label("Degree");
            ui.add(egui::DragValue::new(&mut state.params.degree).range(0..=2));
            ui.label("Robust passes");
            ui.add(egui::DragValue::new(&mut state.params.robust_iterations).range(0..=10));
        }
        ui.label("Spike threshold");
        ui.add(
            egui::DragValue::new(&mut state.params.spike_threshold)
                .range(0.5..=20.0)
                .speed(0.1)
                .suffix(" σ"),
        );
        ui.radio_value(&mut state.params.spike_policy, SpikePolicy::Replace, "Replace spikes");
        ui.radio_value(&mut state.params.spike_policy, SpikePolicy::Remove, "Remove spikes");
    });

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Run noise removal").clicked() {
            state.run_smoothing();
        }
        if ui.button("Clear").clicked() {
            state.clear_smoothing();
        }
        if ui
            .add_enabled(!state.smoothed.is_empty(), egui::Button::new("Save smoothed CSV"))
            .clicked()
        {
            let result = state.export_smoothed();
            state.report("Saving smoothed data", result);
        }
        if ui.checkbox(&mut state.use_smoothed, "Use trend for point cloud").changed() {
            state.rebuild_merged();
        }
    });
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for channel in Channel::ALL {
                let Some(ds) = state.datasets.get(&channel) else {
                    continue;
                };
                let outcome = state.smoothed.get(&channel);
                let summary = match outcome {
                    Some(o) => format!("{}: {} spike(s), {} removed", channel, o.spike_count(), o.removed.len()),
                    None => channel.to_string(),
                };
                ui.strong(summary);
                if let Some(e) = state.smoothing_errors.get(&channel) {
                    ui.label(RichText::new(e).color(Color32::RED));
                }
                plot::smoothing_plot(ui, channel, ds, outcome);
                if let Some(o) = outcome {
                    plot::noise_plot(ui, channel, o);
                }
                ui.add_space(8.0);
            }
        });
}

// ---------------------------------------------------------------------------
// Point cloud
// ---------------------------------------------------------------------------

pub fn point_cloud(ui: &mut Ui, state: &mut AppState, drafts: &mut Drafts) {
    if state.datasets.is_empty() {
        empty_hint(ui);
        return;
    }

    // ---- Survey station / regions ----
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Station");
        let response = ui.add(
            egui::TextEdit::singleline(&mut drafts.station)
                .hint_text("250+11 or distance")
                .desired_width(120.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Apply to all depths").clicked() || submitted {
            if state.apply_station(&drafts.station).is_ok() {
                drafts.regions = state.regions.clone();
            }
        }
        if !state.station_text.is_empty() {
            ui.label(format!("in effect: {}", state.station_text));
        }
    });

    egui::CollapsingHeader::new("Survey regions")
        .default_open(drafts.regions.len() > 1)
        .show(ui, |ui: &mut Ui| {
            let mut remove = None;
            for (i, region) in drafts.regions.iter_mut().enumerate() {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("from");
                    ui.add(egui::DragValue::new(&mut region.depth_from).speed(0.1).suffix(" m"));
                    ui.label("to");
                    ui.add(egui::DragValue::new(&mut region.depth_to).speed(0.1).suffix(" m"));
                    ui.label("station");
                    ui.add(egui::TextEdit::singleline(&mut region.station).desired_width(100.0));
                    if ui.small_button("✕").clicked() {
                        remove = Some(i);
                    }
                });
            }
            if let Some(i) = remove {
                drafts.regions.remove(i);
            }
            ui.horizontal(|ui: &mut Ui| {
                if ui.button("Add region").clicked() {
                    let start = drafts
                        .regions
                        .last()
                        .map(|r| r.depth_to.max(r.depth_from))
                        .filter(|d| d.is_finite())
                        .unwrap_or(0.0);
                    drafts.regions.push(SurveyRegion {
                        depth_from: start,
                        depth_to: start + 10.0,
                        station: drafts.station.clone(),
                    });
                }
                if ui.button("Apply regions").clicked() {
                    state.apply_regions(drafts.regions.clone()).ok();
                }
            });
        });

    // ---- Export settings ----
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.label("Project date");
        ui.add(DatePickerButton::new(&mut state.project_date).id_salt("project_date"));
        ui.label("Keep every");
        ui.add(egui::DragValue::new(&mut state.thinning).range(1..=1000).suffix(" th point"));
        let mut binary = state.vtk_binary;
        if ui.checkbox(&mut binary, "Binary VTK").changed() {
            state.set_vtk_binary(binary);
        }
    });

    ui.horizontal(|ui: &mut Ui| {
        let vtk_label = format!("Export {}", state.exporter.name());
        if ui
            .add_enabled(state.exporter.is_available(), egui::Button::new(vtk_label))
            .clicked()
        {
            let result = state.export_point_cloud();
            state.report("Point-cloud export", result);
        }
        if ui.button("Export CSV").clicked() {
            let result = state.export_points_csv();
            state.report("CSV export", result);
        }
        if ui.button("Export Parquet").clicked() {
            let result = state.export_points_parquet();
            state.report("Parquet export", result);
        }
    });

    if let Some(merged) = &state.merged {
        ui.label(merged.report.to_string().trim_end());
    }
    ui.separator();

    // ---- Plan and elevation ----
    let points = match state.export_points() {
        Ok(p) => p,
        Err(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
    };
    if points.is_empty() {
        ui.label("No rows resolved yet. Enter a station to place the logs in 3D.");
        return;
    }
    let angle = state.config.geometry.direction_angle;
    ui.columns(2, |cols| {
        cols[0].label("Plan");
        plot::cloud_plot(&mut cols[0], Projection::Plan, &points, angle);
        cols[1].label("Elevation");
        plot::cloud_plot(&mut cols[1], Projection::Elevation, &points, angle);
    });
}
