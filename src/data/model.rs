use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DrillError, Result};

// ---------------------------------------------------------------------------
// Channel – which of the three drill holes a log belongs to
// ---------------------------------------------------------------------------

/// Drilling channel. `Center` is the crown hole, labelled "M" in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "M")]
    Center,
    #[serde(rename = "R")]
    Right,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Left, Channel::Center, Channel::Right];

    /// Short label used in file names, config keys and output tables.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Left => "L",
            Channel::Center => "M",
            Channel::Right => "R",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_label(label: &str) -> Option<Channel> {
        match label.trim().to_ascii_uppercase().as_str() {
            "L" | "LEFT" => Some(Channel::Left),
            "M" | "C" | "CENTER" | "CENTRE" | "CROWN" => Some(Channel::Center),
            "R" | "RIGHT" => Some(Channel::Right),
            _ => None,
        }
    }

    /// Classify a log file by its name.
    ///
    /// The file stem is split on `_`, `-`, spaces and dots; the first token
    /// naming a channel wins (`2024_05_14_L.csv`, `drill-right.csv`,
    /// `crown_log.csv`). A name with no such token is an error rather than a
    /// guess.
    pub fn classify(file_name: &str) -> Result<Channel> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);

        stem.split(|c: char| c == '_' || c == '-' || c == '.' || c.is_whitespace())
            .find_map(Channel::from_label)
            .ok_or_else(|| DrillError::UnrecognizedChannel(file_name.to_string()))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::Left => "Left",
            Channel::Center => "Center",
            Channel::Right => "Right",
        };
        write!(f, "{name} ({})", self.label())
    }
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// One row of a drilling log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Depth along the drill hole (m).
    pub depth: f64,
    /// Drilling energy.
    pub energy: f64,
}

impl RawSample {
    pub fn new(depth: f64, energy: f64) -> Self {
        Self { depth, energy }
    }
}

/// A raw sample together with its denoised value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedSample {
    pub depth: f64,
    pub raw: f64,
    pub trend: f64,
    pub is_spike: bool,
}

impl SmoothedSample {
    pub fn noise(&self) -> f64 {
        self.raw - self.trend
    }
}

// ---------------------------------------------------------------------------
// ChannelDataset – one loaded log file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ChannelDataset {
    /// File name the data came from.
    pub name: String,
    pub channel: Channel,
    pub samples: Vec<RawSample>,
    /// Trend column already present in the file (e.g. a previous LOWESS run).
    pub precomputed_trend: Option<Vec<f64>>,
    /// Rows dropped because depth or energy was not a number.
    pub skipped_rows: usize,
    /// Trend cells that were not numbers. Any gap drops the trend column.
    pub trend_gaps: usize,
    /// Encoding the file was decoded with.
    pub encoding: &'static str,
    /// Set while the depths are stretched to a target hole length.
    pub stretch: Option<Stretch>,
}

impl ChannelDataset {
    /// A dataset with no load diagnostics, as built from already-clean samples.
    pub fn new(name: impl Into<String>, channel: Channel, samples: Vec<RawSample>) -> Self {
        Self {
            name: name.into(),
            channel,
            samples,
            precomputed_trend: None,
            skipped_rows: 0,
            trend_gaps: 0,
            encoding: "UTF-8",
            stretch: None,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Depth span covered by the log, `None` when empty.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.samples.iter().map(|s| s.depth);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}

/// Record of a depth stretch: the depths before scaling and the factor used.
#[derive(Debug, Clone, PartialEq)]
pub struct Stretch {
    pub original_depths: Vec<f64>,
    /// Deepest sample before stretching (m).
    pub original_max: f64,
    pub scale_factor: f64,
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Absolute tunnel coordinate (m).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A resolved point ready for export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPoint {
    pub position: Point3D,
    pub energy: f64,
    pub channel: Channel,
    pub depth: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognises_common_names() {
        assert_eq!(Channel::classify("2024_05_14_10_00_00_L.csv").unwrap(), Channel::Left);
        assert_eq!(Channel::classify("drill-M-01.csv").unwrap(), Channel::Center);
        assert_eq!(Channel::classify("site_r_ana.csv").unwrap(), Channel::Right);
        assert_eq!(Channel::classify("crown log.csv").unwrap(), Channel::Center);
        assert_eq!(Channel::classify("/tmp/data/Right.CSV").unwrap(), Channel::Right);
    }

    #[test]
    fn classify_rejects_unknown_names() {
        let err = Channel::classify("measurement_2024.csv").unwrap_err();
        assert!(matches!(err, DrillError::UnrecognizedChannel(_)));
        // "Line" must not be mistaken for "L".
        assert!(Channel::classify("Line_05.csv").is_err());
    }

    #[test]
    fn channels_order_left_to_right() {
        let mut chans = vec![Channel::Right, Channel::Left, Channel::Center];
        chans.sort();
        assert_eq!(chans, Channel::ALL.to_vec());
    }

    #[test]
    fn depth_range_of_unsorted_log() {
        let ds = ChannelDataset::new(
            "x_L.csv",
            Channel::Left,
            vec![RawSample::new(2.0, 1.0), RawSample::new(0.5, 1.0), RawSample::new(3.5, 1.0)],
        );
        assert_eq!(ds.depth_range(), Some((0.5, 3.5)));
    }
}
