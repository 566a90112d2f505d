use std::path::Path;

use encoding_rs::SHIFT_JIS;

use super::model::{Channel, ChannelDataset, RawSample};
use crate::error::{DrillError, Result};

// ---------------------------------------------------------------------------
// Column names seen in the field logs
// ---------------------------------------------------------------------------

const DEPTH_COLUMNS: &[&str] = &["穿孔長", "TD", "x:TD(m)", "depth", "Depth", "drill_depth", "DEPTH"];

const ENERGY_COLUMNS: &[&str] = &[
    "穿孔エネルギー",
    "エネルギー",
    "削孔エネルギー",
    "エネルギー値",
    "Energy",
    "energy",
    "Ene-L",
    "Ene-M",
    "Ene-R",
];

const TREND_COLUMNS: &[&str] = &["Lowess_Trend", "trend", "Trend"];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Lines to skip before the header row (some loggers write a banner).
    pub header_row: usize,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load one drilling log from disk.
///
/// The channel is taken from the file name; see [`Channel::classify`].
pub fn load_file(path: &Path, options: LoadOptions) -> Result<ChannelDataset> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    let bytes = std::fs::read(path).map_err(|e| DrillError::io(path, e))?;
    load_bytes(&name, &bytes, options)
}

/// Load a log already in memory. `name` is used for channel detection and
/// error messages.
pub fn load_bytes(name: &str, bytes: &[u8], options: LoadOptions) -> Result<ChannelDataset> {
    let channel = Channel::classify(name)?;
    let (text, encoding) = decode(name, bytes)?;
    let body: String = text
        .lines()
        .skip(options.header_row)
        .collect::<Vec<_>>()
        .join("\n");

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DrillError::Csv {
            path: name.to_string(),
            source: e,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let depth_idx = find_column(&headers, DEPTH_COLUMNS, &["穿孔長", "depth"]).ok_or(DrillError::MissingColumn {
        file: name.to_string(),
        column: "depth",
    })?;
    let energy_idx = find_column(&headers, ENERGY_COLUMNS, &["エネルギー", "energy"]).ok_or(DrillError::MissingColumn {
        file: name.to_string(),
        column: "energy",
    })?;
    let trend_idx = find_column(&headers, TREND_COLUMNS, &["lowess", "trend"])
        .filter(|&i| i != depth_idx && i != energy_idx);

    let mut samples = Vec::new();
    let mut trend = Vec::new();
    let mut skipped_rows = 0;

    for result in reader.records() {
        let record = result.map_err(|e| DrillError::Csv {
            path: name.to_string(),
            source: e,
        })?;

        let depth = parse_number(record.get(depth_idx));
        let energy = parse_number(record.get(energy_idx));
        match (depth, energy) {
            (Some(depth), Some(energy)) => {
                samples.push(RawSample::new(depth, energy));
                if let Some(t) = trend_idx {
                    trend.push(parse_number(record.get(t)).unwrap_or(f64::NAN));
                }
            }
            _ => skipped_rows += 1,
        }
    }

    if skipped_rows > 0 {
        log::warn!("{name}: skipped {skipped_rows} rows without numeric depth/energy");
    }

    // A trend column with gaps is not usable as a substitute energy.
    let trend_gaps = trend.iter().filter(|v| !v.is_finite()).count();
    if trend_gaps > 0 {
        log::warn!("{name}: ignoring the trend column, {trend_gaps} cell(s) are not numbers");
    }
    let precomputed_trend = trend_idx
        .filter(|_| !trend.is_empty() && trend_gaps == 0)
        .map(|_| trend);

    Ok(ChannelDataset {
        name: name.to_string(),
        channel,
        samples,
        precomputed_trend,
        skipped_rows,
        trend_gaps,
        encoding,
        stretch: None,
    })
}

/// Load several files, ordered L, M, R. Failures are returned per file so
/// one bad log does not hide the others.
pub fn load_files(paths: &[std::path::PathBuf], options: LoadOptions) -> Vec<(String, Result<ChannelDataset>)> {
    let mut results: Vec<(String, Result<ChannelDataset>)> = paths
        .iter()
        .map(|p| (p.display().to_string(), load_file(p, options)))
        .collect();
    results.sort_by_key(|(name, r)| (r.as_ref().map(|d| d.channel.index()).unwrap_or(usize::MAX), name.clone()));
    results
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// UTF-8 (BOM optional) first, then Shift_JIS as written by the loggers.
fn decode(name: &str, bytes: &[u8]) -> Result<(String, &'static str)> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok((text.to_string(), "UTF-8"));
    }
    let (text, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(DrillError::Encoding {
            file: name.to_string(),
            encoding: SHIFT_JIS.name(),
        });
    }
    Ok((text.into_owned(), SHIFT_JIS.name()))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Exact match against `exact` (in priority order), then a case-insensitive
/// substring match against `partial`.
fn find_column(headers: &[String], exact: &[&str], partial: &[&str]) -> Option<usize> {
    exact
        .iter()
        .find_map(|want| headers.iter().position(|h| h == want))
        .or_else(|| {
            headers.iter().position(|h| {
                let lower = h.to_lowercase();
                partial.iter().any(|p| lower.contains(&p.to_lowercase()))
            })
        })
}

fn parse_number(s: Option<&str>) -> Option<f64> {
    s.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
