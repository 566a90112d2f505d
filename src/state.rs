use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Local, NaiveDate};

use crate::calc::survey::{distance_to_station, StationInput};
use crate::config::AppConfig;
use crate::data::filter::{
    extract_depth_range, extract_energy_range, extract_percentile, resample, restore, stretch, thin,
};
use crate::data::loader::{self, LoadOptions};
use crate::data::model::{Channel, ChannelDataset, CloudPoint, RawSample};
use crate::data::noise::{smooth_channels, SmoothingOutcome, SmoothingParams};
use crate::data::process::{merge, ChannelInput, MergedDataset, SurveyRegion};
use crate::error::{DrillError, Result};
use crate::export::table::{write_points_csv, write_points_parquet, write_smoothed_csv};
use crate::export::{output_stem, probe_exporter, PointCloudExporter, VtkEncoding, VtkExporter};

// ---------------------------------------------------------------------------
// Tabs and status line
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Noise,
    PointCloud,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Noise, Tab::PointCloud];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Noise => "Noise removal",
            Tab::PointCloud => "Point cloud",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub is_error: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering.
///
/// Every action either succeeds and updates the session, or fails and leaves
/// it as it was with the error in `status`.
pub struct AppState {
    pub config: AppConfig,

    /// Point-cloud backend chosen at startup.
    pub exporter: Box<dyn PointCloudExporter>,

    /// One log per channel; loading a second file for a channel replaces it.
    pub datasets: BTreeMap<Channel, ChannelDataset>,

    pub load_options: LoadOptions,

    /// Parameters edited in the noise tab.
    pub params: SmoothingParams,

    pub smoothed: BTreeMap<Channel, SmoothingOutcome>,
    pub smoothing_errors: BTreeMap<Channel, String>,

    /// Export the smoothed trend rather than raw energy when available.
    pub use_smoothed: bool,

    /// Station typed in the single-station field.
    pub station_text: String,

    /// Survey regions in effect; edited in the point-cloud tab.
    pub regions: Vec<SurveyRegion>,

    /// Cached merge of `datasets` against `regions`.
    pub merged: Option<MergedDataset>,

    pub project_date: NaiveDate,

    /// Starts at the configured folder; can be changed for the session.
    pub output_dir: PathBuf,

    /// Keep every n-th point of each channel in exports.
    pub thinning: usize,

    pub vtk_binary: bool,

    pub tab: Tab,

    pub status: Option<Status>,
}

impl AppState {
    pub fn new(config: AppConfig, exporter: Box<dyn PointCloudExporter>) -> Self {
        Self {
            params: config.smoothing.clone(),
            output_dir: config.output_dir.clone(),
            config,
            exporter,
            datasets: BTreeMap::new(),
            load_options: LoadOptions::default(),
            smoothed: BTreeMap::new(),
            smoothing_errors: BTreeMap::new(),
            use_smoothed: true,
            station_text: String::new(),
            regions: Vec::new(),
            merged: None,
            project_date: Local::now().date_naive(),
            thinning: 1,
            vtk_binary: false,
            tab: Tab::default(),
            status: None,
        }
    }

    // ---- Status helpers ----

    pub fn set_info(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{text}");
        self.status = Some(Status { text, is_error: false });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{text}");
        self.status = Some(Status { text, is_error: true });
    }

    /// Put the outcome of a user action into the status line.
    pub fn report<T>(&mut self, action: &str, result: anyhow::Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.set_error(format!("{action} failed: {e:#}"));
                None
            }
        }
    }

    // ---- Loading ----

    pub fn load_files(&mut self, paths: &[PathBuf]) {
        let results = loader::load_files(paths, self.load_options);
        self.ingest(results);
    }

    /// Store successfully loaded logs and report the rest.
    pub fn ingest(&mut self, results: Vec<(String, Result<ChannelDataset>)>) {
        let mut loaded = Vec::new();
        let mut failed = Vec::new();
        for (name, result) in results {
            match result {
                Ok(ds) => {
                    log::info!(
                        "Loaded {} ({} rows, {}, channel {})",
                        ds.name,
                        ds.len(),
                        ds.encoding,
                        ds.channel.label()
                    );
                    loaded.push(ds.channel.label());
                    self.smoothed.remove(&ds.channel);
                    self.smoothing_errors.remove(&ds.channel);
                    self.datasets.insert(ds.channel, ds);
                }
                Err(e) => failed.push(format!("{name}: {e}")),
            }
        }
        self.rebuild_merged();

        if failed.is_empty() {
            self.set_info(format!("Loaded channel(s) {}", loaded.join(", ")));
        } else {
            self.set_error(format!(
                "Loaded {} file(s); failed: {}",
                loaded.len(),
                failed.join("; ")
            ));
        }
    }

    pub fn remove_channel(&mut self, channel: Channel) {
        self.datasets.remove(&channel);
        self.invalidate_channel(channel);
    }

    // ---- Row editing ----

    /// Replace the samples of every channel with `edit(samples)`.
    ///
    /// Edited channels lose their file trend column and their stretch record,
    /// since neither lines up with the new rows; the edited depths become
    /// the log. Channels where `edit` fails keep their rows. Returns the
    /// failures as `"L: reason"`.
    fn edit_rows(&mut self, edit: impl Fn(&[RawSample]) -> Result<Vec<RawSample>>) -> Vec<String> {
        let mut failed = Vec::new();
        for ds in self.datasets.values_mut() {
            match edit(&ds.samples) {
                Ok(samples) => {
                    ds.samples = samples;
                    ds.precomputed_trend = None;
                    ds.stretch = None;
                }
                Err(e) => failed.push(format!("{}: {e}", ds.channel.label())),
            }
        }
        self.smoothed.clear();
        self.smoothing_errors.clear();
        self.rebuild_merged();
        failed
    }

    fn report_edit(&mut self, action: &str, failed: Vec<String>, done: String) {
        if failed.is_empty() {
            self.set_info(done);
        } else {
            self.set_error(format!("{action} failed for {}", failed.join("; ")));
        }
    }

    /// Keep only `from..=to` in every channel.
    pub fn crop_depth(&mut self, from: f64, to: f64) {
        let failed = self.edit_rows(|s| Ok(extract_depth_range(s, from, to)));
        self.report_edit("Cropping", failed, format!("Cropped logs to {from:.2}..{to:.2} m"));
    }

    /// Keep only rows whose energy lies in `min..=max`.
    pub fn crop_energy(&mut self, min: f64, max: f64) {
        let failed = self.edit_rows(|s| Ok(extract_energy_range(s, min, max)));
        self.report_edit("Energy extraction", failed, format!("Kept energies {min:.1}..{max:.1}"));
    }

    /// Keep rows from `start`% to `end`% of each log.
    pub fn crop_percentile(&mut self, start: f64, end: f64) {
        let failed = self.edit_rows(|s| extract_percentile(s, start, end));
        self.report_edit("Percentile extraction", failed, format!("Kept rows {start:.0} %..{end:.0} %"));
    }

    /// Resample every channel at a fixed depth step. Channels that cannot be
    /// resampled are left as they are and reported.
    pub fn resample_channels(&mut self, step: f64) {
        let failed = self.edit_rows(|s| {
            let mut sorted = s.to_vec();
            sorted.sort_by(|a, b| a.depth.total_cmp(&b.depth));
            resample(&sorted, step)
        });
        self.report_edit("Resampling", failed, format!("Resampled logs at {step} m"));
    }

    // ---- Depth stretching ----

    /// Scale one channel's depths so its deepest sample sits at
    /// `target_length`. Stretching again starts from the unstretched depths.
    pub fn stretch_channel(&mut self, channel: Channel, target_length: f64) -> Result<f64> {
        let result = self
            .unstretched_samples(channel)
            .and_then(|original| stretch(&original, target_length));
        let (samples, record) = match result {
            Ok(v) => v,
            Err(e) => {
                self.set_error(format!("Stretching {}: {e}", channel.label()));
                return Err(e);
            }
        };

        let factor = record.scale_factor;
        if let Some(ds) = self.datasets.get_mut(&channel) {
            ds.samples = samples;
            ds.stretch = Some(record);
        }
        self.invalidate_channel(channel);
        self.set_info(format!(
            "Stretched {} to {target_length:.2} m (×{factor:.3})",
            channel.label()
        ));
        Ok(factor)
    }

    fn unstretched_samples(&self, channel: Channel) -> Result<Vec<RawSample>> {
        let ds = self
            .datasets
            .get(&channel)
            .ok_or_else(|| DrillError::Configuration(format!("channel {} is not loaded", channel.label())))?;
        match &ds.stretch {
            Some(record) => restore(&ds.samples, record),
            None => Ok(ds.samples.clone()),
        }
    }

    /// Put back the depths a channel had before stretching.
    pub fn reset_stretch(&mut self, channel: Channel) -> Result<()> {
        let Some(ds) = self.datasets.get_mut(&channel) else {
            return Ok(());
        };
        let Some(record) = ds.stretch.take() else {
            return Ok(());
        };
        match restore(&ds.samples, &record) {
            Ok(samples) => ds.samples = samples,
            Err(e) => {
                ds.stretch = Some(record);
                self.set_error(format!("Resetting {}: {e}", channel.label()));
                return Err(e);
            }
        }
        self.invalidate_channel(channel);
        self.set_info(format!("Restored the original depths of {}", channel.label()));
        Ok(())
    }

    /// Drop smoothing results that no longer match a channel's rows.
    fn invalidate_channel(&mut self, channel: Channel) {
        self.smoothed.remove(&channel);
        self.smoothing_errors.remove(&channel);
        self.rebuild_merged();
    }

    // ---- Stations and regions ----

    /// Use one station for every depth. A malformed station is rejected and
    /// the current regions stay in effect.
    pub fn apply_station(&mut self, text: &str) -> Result<f64> {
        let distance = match text
            .parse::<StationInput>()
            .and_then(|input| input.resolve(&self.config.geometry))
        {
            Ok(d) => d,
            Err(e) => {
                self.set_error(e.to_string());
                return Err(e);
            }
        };
        self.station_text = text.trim().to_string();
        self.regions = vec![SurveyRegion::everywhere(self.station_text.clone())];
        self.rebuild_merged();
        let station = distance_to_station(distance, &self.config.geometry);
        self.set_info(format!(
            "Station {} → {distance:.3} m from reference ({station})",
            self.station_text
        ));
        Ok(distance)
    }

    /// Validate every region's station, then use them.
    pub fn apply_regions(&mut self, regions: Vec<SurveyRegion>) -> Result<()> {
        for region in &regions {
            if let Err(e) = region
                .station
                .parse::<StationInput>()
                .and_then(|input| input.resolve(&self.config.geometry))
            {
                self.set_error(e.to_string());
                return Err(e);
            }
        }
        self.regions = regions;
        self.rebuild_merged();
        self.set_info(format!("{} survey region(s) applied", self.regions.len()));
        Ok(())
    }

    // ---- Smoothing ----

    pub fn run_smoothing(&mut self) {
        if let Err(e) = self.params.validate() {
            self.set_error(e.to_string());
            return;
        }
        let datasets: Vec<&ChannelDataset> = self.datasets.values().collect();
        let results = smooth_channels(&datasets, &self.params);

        self.smoothed.clear();
        self.smoothing_errors.clear();
        let mut spikes = 0;
        for (channel, result) in results {
            match result {
                Ok(outcome) => {
                    spikes += outcome.spike_count();
                    self.smoothed.insert(channel, outcome);
                }
                Err(e) => {
                    self.smoothing_errors.insert(channel, e.to_string());
                }
            }
        }
        self.rebuild_merged();

        if self.smoothing_errors.is_empty() {
            self.set_info(format!(
                "Smoothed {} channel(s), {spikes} spike(s) flagged",
                self.smoothed.len()
            ));
        } else {
            let failed: Vec<String> = self
                .smoothing_errors
                .iter()
                .map(|(c, e)| format!("{}: {e}", c.label()))
                .collect();
            self.set_error(format!("Smoothing failed for {}", failed.join("; ")));
        }
    }

    pub fn clear_smoothing(&mut self) {
        self.smoothed.clear();
        self.smoothing_errors.clear();
        self.rebuild_merged();
    }

    // ---- Merge ----

    pub fn rebuild_merged(&mut self) {
        if self.datasets.is_empty() {
            self.merged = None;
            return;
        }
        let inputs: Vec<ChannelInput<'_>> = self
            .datasets
            .values()
            .map(|ds| ChannelInput {
                dataset: ds,
                smoothed: self.use_smoothed.then(|| self.smoothed.get(&ds.channel)).flatten(),
            })
            .collect();
        self.merged = Some(merge(&inputs, &self.regions, &self.config.geometry));
    }

    /// Resolved points after per-channel thinning.
    pub fn export_points(&self) -> Result<Vec<CloudPoint>> {
        let merged = self
            .merged
            .as_ref()
            .ok_or_else(|| DrillError::Export("no data loaded".into()))?;
        let all = merged.cloud_points();
        let mut out = Vec::with_capacity(all.len());
        for channel in Channel::ALL {
            let rows: Vec<CloudPoint> = all.iter().filter(|p| p.channel == channel).cloned().collect();
            out.extend(thin(&rows, self.thinning)?);
        }
        Ok(out)
    }

    // ---- Export ----

    /// Switch the output folder and probe the backend again for it.
    pub fn set_output_dir(&mut self, dir: PathBuf) {
        self.exporter = probe_exporter(&dir);
        self.output_dir = dir;
        let binary = self.vtk_binary;
        self.set_vtk_binary(binary);
        self.set_info(format!("Output folder: {}", self.output_dir.display()));
    }

    pub fn set_vtk_binary(&mut self, binary: bool) {
        self.vtk_binary = binary;
        if self.exporter.is_available() {
            self.exporter = Box::new(VtkExporter {
                encoding: if binary { VtkEncoding::Binary } else { VtkEncoding::Ascii },
                ..VtkExporter::default()
            });
        }
    }

    fn output_path(&self, name: &str, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{extension}", output_stem(self.project_date, name)))
    }

    pub fn export_point_cloud(&mut self) -> anyhow::Result<PathBuf> {
        let points = self.export_points()?;
        let path = self.output_path("lmr_point_cloud", self.exporter.extension());
        self.exporter
            .export(&points, &path)
            .with_context(|| format!("{} export to {}", self.exporter.name(), path.display()))?;
        self.set_info(format!("Wrote {} points to {}", points.len(), path.display()));
        Ok(path)
    }

    pub fn export_points_csv(&mut self) -> anyhow::Result<PathBuf> {
        let points = self.export_points()?;
        let path = self.output_path("lmr_point_cloud", "csv");
        write_points_csv(&path, &points)?;
        self.set_info(format!("Wrote {} points to {}", points.len(), path.display()));
        Ok(path)
    }

    pub fn export_points_parquet(&mut self) -> anyhow::Result<PathBuf> {
        let points = self.export_points()?;
        let path = self.output_path("lmr_point_cloud", "parquet");
        write_points_parquet(&path, &points)?;
        self.set_info(format!("Wrote {} points to {}", points.len(), path.display()));
        Ok(path)
    }

    /// One `_ana` CSV per smoothed channel.
    pub fn export_smoothed(&mut self) -> anyhow::Result<Vec<PathBuf>> {
        if self.smoothed.is_empty() {
            anyhow::bail!("run noise removal first");
        }
        let mut written = Vec::new();
        for (channel, outcome) in &self.smoothed {
            let path = self.output_path(&format!("{}_ana", channel.label()), "csv");
            write_smoothed_csv(&path, &outcome.samples)
                .with_context(|| format!("writing smoothed channel {}", channel.label()))?;
            written.push(path);
        }
        self.set_info(format!(
            "Wrote {} smoothed file(s) to {}",
            written.len(),
            self.output_dir.display()
        ));
        Ok(written)
    }
}
