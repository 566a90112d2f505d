use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use crate::color::{channel_color, trend_color, EnergyScale, SPIKE_COLOR};
use crate::data::model::{Channel, ChannelDataset, CloudPoint};
use crate::data::noise::SmoothingOutcome;

/// Energy bins used to colour scatter plots; one plot series per bin.
const ENERGY_BINS: usize = 8;

// ---------------------------------------------------------------------------
// Energy vs depth
// ---------------------------------------------------------------------------

/// Raw energy against depth, one line per channel.
pub fn raw_energy_plot(ui: &mut Ui, id: &str, datasets: &[&ChannelDataset]) {
    Plot::new(id)
        .legend(Legend::default())
        .x_axis_label("Depth (m)")
        .y_axis_label("Energy")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for ds in datasets {
                let points: PlotPoints = ds.samples.iter().map(|s| [s.depth, s.energy]).collect();
                plot_ui.line(
                    Line::new(points)
                        .name(ds.channel.to_string())
                        .color(channel_color(ds.channel))
                        .width(1.0),
                );
            }
        });
}

/// Raw signal, trend and flagged spikes for one channel.
pub fn smoothing_plot(ui: &mut Ui, channel: Channel, dataset: &ChannelDataset, outcome: Option<&SmoothingOutcome>) {
    Plot::new(format!("smoothing_{}", channel.label()))
        .legend(Legend::default())
        .height(220.0)
        .x_axis_label("Depth (m)")
        .y_axis_label("Energy")
        .show(ui, |plot_ui| {
            let raw: PlotPoints = dataset.samples.iter().map(|s| [s.depth, s.energy]).collect();
            plot_ui.line(
                Line::new(raw)
                    .name("raw")
                    .color(channel_color(channel).gamma_multiply(0.6))
                    .width(1.0),
            );

            let Some(outcome) = outcome else {
                return;
            };

            let mut sorted = outcome.samples.clone();
            sorted.sort_by(|a, b| a.depth.total_cmp(&b.depth));
            let trend: PlotPoints = sorted.iter().map(|s| [s.depth, s.trend]).collect();
            plot_ui.line(Line::new(trend).name("trend").color(trend_color(channel)).width(2.0));

            let spikes: Vec<[f64; 2]> = sorted
                .iter()
                .filter(|s| s.is_spike)
                .map(|s| [s.depth, s.raw])
                .chain(
                    outcome
                        .removed
                        .iter()
                        .filter_map(|&i| dataset.samples.get(i))
                        .map(|s| [s.depth, s.energy]),
                )
                .collect();
            if !spikes.is_empty() {
                plot_ui.points(
                    Points::new(PlotPoints::from(spikes))
                        .name("spikes")
                        .color(SPIKE_COLOR)
                        .radius(3.0),
                );
            }
        });
}

/// Noise (raw − trend) against depth.
pub fn noise_plot(ui: &mut Ui, channel: Channel, outcome: &SmoothingOutcome) {
    Plot::new(format!("noise_{}", channel.label()))
        .height(140.0)
        .x_axis_label("Depth (m)")
        .y_axis_label("Noise")
        .show(ui, |plot_ui| {
            let mut pts: Vec<[f64; 2]> = outcome.samples.iter().map(|s| [s.depth, s.noise()]).collect();
            pts.sort_by(|a, b| a[0].total_cmp(&b[0]));
            plot_ui.line(Line::new(PlotPoints::from(pts)).color(channel_color(channel)).width(1.0));
        });
}

// ---------------------------------------------------------------------------
// Point cloud projections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// X/Y, looking down.
    Plan,
    /// Distance along the tunnel axis against Z.
    Elevation,
}

/// Scatter of the cloud coloured by energy, with per-channel hole lines.
pub fn cloud_plot(ui: &mut Ui, projection: Projection, points: &[CloudPoint], direction_angle: f64) {
    let (id, x_label, y_label) = match projection {
        Projection::Plan => ("cloud_plan", "X (m)", "Y (m)"),
        Projection::Elevation => ("cloud_elevation", "Along axis (m)", "Z (m)"),
    };
    let theta = direction_angle.to_radians();
    let project = |p: &CloudPoint| match projection {
        Projection::Plan => [p.position.x, p.position.y],
        Projection::Elevation => [p.position.x * theta.cos() + p.position.y * theta.sin(), p.position.z],
    };

    let scale = EnergyScale::from_points(points);

    let mut plot = Plot::new(id)
        .legend(Legend::default())
        .x_axis_label(x_label)
        .y_axis_label(y_label);
    if projection == Projection::Plan {
        plot = plot.data_aspect(1.0);
    }

    plot.show(ui, |plot_ui| {
        for channel in Channel::ALL {
            let line: PlotPoints = points
                .iter()
                .filter(|p| p.channel == channel)
                .map(project)
                .collect();
            plot_ui.line(
                Line::new(line)
                    .name(channel.to_string())
                    .color(channel_color(channel))
                    .width(0.5),
            );
        }

        let Some(scale) = scale else {
            return;
        };
        let mut bins: Vec<Vec<[f64; 2]>> = vec![Vec::new(); ENERGY_BINS];
        for p in points {
            let bin = ((scale.normalise(p.energy) * ENERGY_BINS as f64) as usize).min(ENERGY_BINS - 1);
            bins[bin].push(project(p));
        }
        for (i, bin) in bins.into_iter().enumerate() {
            if bin.is_empty() {
                continue;
            }
            let mid = scale.min + (scale.max - scale.min) * (i as f64 + 0.5) / ENERGY_BINS as f64;
            plot_ui.points(
                Points::new(PlotPoints::from(bin))
                    .name(format!("energy ≈ {mid:.1}"))
                    .color(scale.color_for(mid))
                    .radius(2.5),
            );
        }
    });
}
