//! Merge per-channel logs into one dataset with resolved 3D positions.
//!
//! Rows whose station cannot be resolved stay in the merged dataset (2D plots
//! do not need coordinates) but are left out of [`MergedDataset::cloud_points`].
//! Every such row is counted in the [`MergeReport`].

use std::collections::BTreeMap;
use std::fmt;

use super::model::{Channel, ChannelDataset, CloudPoint, Point3D};
use super::noise::SmoothingOutcome;
use crate::calc::lmr::sample_position;
use crate::calc::survey::StationInput;
use crate::config::ReferenceGeometry;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A depth interval drilled from one station.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRegion {
    pub depth_from: f64,
    pub depth_to: f64,
    /// Station label or raw distance, as typed.
    pub station: String,
}

impl SurveyRegion {
    /// A region covering every depth.
    pub fn everywhere(station: impl Into<String>) -> Self {
        Self {
            depth_from: f64::NEG_INFINITY,
            depth_to: f64::INFINITY,
            station: station.into(),
        }
    }

    pub fn contains(&self, depth: f64) -> bool {
        let (lo, hi) = if self.depth_from <= self.depth_to {
            (self.depth_from, self.depth_to)
        } else {
            (self.depth_to, self.depth_from)
        };
        (lo..=hi).contains(&depth)
    }
}

/// One channel going into the merge.
#[derive(Debug, Clone, Copy)]
pub struct ChannelInput<'a> {
    pub dataset: &'a ChannelDataset,
    pub smoothed: Option<&'a SmoothingOutcome>,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Resolved,
    /// No survey region covers the row's depth.
    NoRegion,
    /// The covering region's station could not be parsed or is out of range.
    InvalidStation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub channel: Channel,
    pub depth: f64,
    pub raw: f64,
    /// Value exported: smoothed trend, precomputed trend, or raw energy.
    pub energy: f64,
    pub is_spike: bool,
    pub distance: Option<f64>,
    pub position: Option<Point3D>,
    pub status: RowStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelReport {
    pub resolved: usize,
    pub no_region: usize,
    pub invalid_station: usize,
    pub spikes_removed: usize,
    pub skipped_at_load: usize,
}

impl ChannelReport {
    pub fn unresolved(&self) -> usize {
        self.no_region + self.invalid_station
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub channels: BTreeMap<Channel, ChannelReport>,
    /// Regions whose station failed to resolve, with the reason.
    pub region_errors: Vec<String>,
}

impl MergeReport {
    pub fn total_resolved(&self) -> usize {
        self.channels.values().map(|c| c.resolved).sum()
    }

    pub fn total_unresolved(&self) -> usize {
        self.channels.values().map(ChannelReport::unresolved).sum()
    }
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (channel, r) in &self.channels {
            write!(f, "{}: {} rows resolved", channel.label(), r.resolved)?;
            if r.invalid_station > 0 {
                write!(f, ", {} rows skipped: unresolved station", r.invalid_station)?;
            }
            if r.no_region > 0 {
                write!(f, ", {} rows skipped: no survey region", r.no_region)?;
            }
            if r.spikes_removed > 0 {
                write!(f, ", {} spikes removed", r.spikes_removed)?;
            }
            if r.skipped_at_load > 0 {
                write!(f, ", {} unreadable rows", r.skipped_at_load)?;
            }
            writeln!(f)?;
        }
        for e in &self.region_errors {
            writeln!(f, "{e}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedDataset {
    /// Ordered by channel (L, M, R), then by input order.
    pub rows: Vec<MergedRow>,
    pub report: MergeReport,
}

impl MergedDataset {
    /// Resolved rows only.
    pub fn cloud_points(&self) -> Vec<CloudPoint> {
        self.rows
            .iter()
            .filter_map(|r| {
                r.position.map(|position| CloudPoint {
                    position,
                    energy: r.energy,
                    channel: r.channel,
                    depth: r.depth,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Merge channels and resolve each row against the first region containing
/// its depth.
pub fn merge(inputs: &[ChannelInput<'_>], regions: &[SurveyRegion], geometry: &ReferenceGeometry) -> MergedDataset {
    let mut report = MergeReport::default();

    let resolved: Vec<Option<f64>> = regions
        .iter()
        .map(|region| {
            match region
                .station
                .parse::<StationInput>()
                .and_then(|input| input.resolve(geometry))
            {
                Ok(distance) => Some(distance),
                Err(e) => {
                    report.region_errors.push(format!(
                        "region {}..{} m: {e}",
                        region.depth_from, region.depth_to
                    ));
                    None
                }
            }
        })
        .collect();

    let mut ordered: Vec<&ChannelInput<'_>> = inputs.iter().collect();
    ordered.sort_by_key(|i| i.dataset.channel);

    let mut rows = Vec::new();
    for input in ordered {
        let ds = input.dataset;
        let channel = ds.channel;
        let entry = report.channels.entry(channel).or_default();
        entry.skipped_at_load += ds.skipped_rows;

        // (depth, raw, energy, is_spike) per surviving row
        let values: Vec<(f64, f64, f64, bool)> = match (input.smoothed, &ds.precomputed_trend) {
            (Some(outcome), _) => {
                entry.spikes_removed += outcome.removed.len();
                outcome
                    .samples
                    .iter()
                    .map(|s| (s.depth, s.raw, s.trend, s.is_spike))
                    .collect()
            }
            (None, Some(trend)) if trend.len() == ds.samples.len() => ds
                .samples
                .iter()
                .zip(trend)
                .map(|(s, &t)| (s.depth, s.energy, t, false))
                .collect(),
            _ => ds.samples.iter().map(|s| (s.depth, s.energy, s.energy, false)).collect(),
        };

        for (depth, raw, energy, is_spike) in values {
            let region = regions.iter().position(|r| r.contains(depth));
            let (status, distance) = match region {
                None => (RowStatus::NoRegion, None),
                Some(i) => match resolved[i] {
                    Some(d) => (RowStatus::Resolved, Some(d)),
                    None => (RowStatus::InvalidStation, None),
                },
            };
            match status {
                RowStatus::Resolved => entry.resolved += 1,
                RowStatus::NoRegion => entry.no_region += 1,
                RowStatus::InvalidStation => entry.invalid_station += 1,
            }

            rows.push(MergedRow {
                channel,
                depth,
                raw,
                energy,
                is_spike,
                distance,
                position: distance.map(|d| sample_position(channel, d, depth, geometry)),
                status,
            });
        }
    }

    if report.total_unresolved() > 0 {
        log::warn!("{} rows could not be placed in 3D", report.total_unresolved());
    }

    MergedDataset { rows, report }
}
