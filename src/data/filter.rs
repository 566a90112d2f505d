use super::model::{RawSample, Stretch};
use crate::error::{DrillError, Result};

/// Upper bound on the rows `resample` will produce for one channel.
pub const MAX_RESAMPLED_ROWS: usize = 10_000_000;

// ---------------------------------------------------------------------------
// Depth-range extraction
// ---------------------------------------------------------------------------

/// Samples with `from <= depth <= to`, in input order.
///
/// An inverted range is accepted and treated as `[to, from]`.
pub fn extract_depth_range(samples: &[RawSample], from: f64, to: f64) -> Vec<RawSample> {
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    samples
        .iter()
        .filter(|s| (lo..=hi).contains(&s.depth))
        .copied()
        .collect()
}

/// Samples with `min <= energy <= max`, in input order. An inverted range is
/// accepted.
pub fn extract_energy_range(samples: &[RawSample], min: f64, max: f64) -> Vec<RawSample> {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    samples
        .iter()
        .filter(|s| (lo..=hi).contains(&s.energy))
        .copied()
        .collect()
}

/// Rows by position in the log: `start = 10.0, end = 30.0` keeps the rows
/// from 10 % to 30 % of the way down the file.
pub fn extract_percentile(samples: &[RawSample], start: f64, end: f64) -> Result<Vec<RawSample>> {
    let valid = |p: f64| (0.0..=100.0).contains(&p);
    if !valid(start) || !valid(end) || start > end {
        return Err(DrillError::Configuration(format!(
            "percentile range must satisfy 0 <= start <= end <= 100, got {start}..{end}"
        )));
    }
    let n = samples.len() as f64;
    let from = (n * start / 100.0).floor() as usize;
    let to = (n * end / 100.0).floor() as usize;
    Ok(samples[from..to].to_vec())
}

// ---------------------------------------------------------------------------
// Thinning
// ---------------------------------------------------------------------------

/// Keep every `every`-th row, starting with the first.
pub fn thin<T: Clone>(rows: &[T], every: usize) -> Result<Vec<T>> {
    if every == 0 {
        return Err(DrillError::Configuration("thinning interval must be at least 1".into()));
    }
    Ok(rows.iter().step_by(every).cloned().collect())
}

// ---------------------------------------------------------------------------
// Fixed-step resampling
// ---------------------------------------------------------------------------

/// Linearly interpolate the log at `first, first + step, …` up to the last
/// depth. Input must be sorted by depth.
pub fn resample(samples: &[RawSample], step: f64) -> Result<Vec<RawSample>> {
    if !step.is_finite() || step <= 0.0 {
        return Err(DrillError::Configuration(format!("resampling step must be positive, got {step}")));
    }
    if samples.len() < 2 {
        return Err(DrillError::InsufficientData {
            available: samples.len(),
            window: 2,
        });
    }
    if samples.windows(2).any(|w| w[1].depth < w[0].depth) {
        return Err(DrillError::Configuration("resampling needs depths in increasing order".into()));
    }

    let first = samples[0].depth;
    let last = samples[samples.len() - 1].depth;
    let steps = ((last - first) / step + 1e-9).floor();
    if steps >= MAX_RESAMPLED_ROWS as f64 {
        return Err(DrillError::Configuration(format!(
            "a {step} m step over {:.3} m gives more than {MAX_RESAMPLED_ROWS} rows",
            last - first
        )));
    }
    let count = steps as usize + 1;

    let mut out = Vec::with_capacity(count);
    let mut seg = 0;
    for k in 0..count {
        let depth = first + k as f64 * step;
        while seg + 2 < samples.len() && samples[seg + 1].depth < depth {
            seg += 1;
        }
        let (a, b) = (samples[seg], samples[seg + 1]);
        let span = b.depth - a.depth;
        let energy = if span > 0.0 {
            let t = ((depth - a.depth) / span).clamp(0.0, 1.0);
            a.energy + t * (b.energy - a.energy)
        } else {
            a.energy
        };
        out.push(RawSample::new(depth, energy));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Depth stretching
// ---------------------------------------------------------------------------

/// Scale every depth so the deepest sample lands on `target_length`.
///
/// A log whose deepest sample is not below the collar keeps its depths
/// (scale factor 1). The returned [`Stretch`] holds what `restore` needs.
pub fn stretch(samples: &[RawSample], target_length: f64) -> Result<(Vec<RawSample>, Stretch)> {
    if !target_length.is_finite() || target_length <= 0.0 {
        return Err(DrillError::Configuration(format!(
            "target hole length must be positive, got {target_length}"
        )));
    }
    let original_max = samples
        .iter()
        .map(|s| s.depth)
        .reduce(f64::max)
        .ok_or(DrillError::InsufficientData { available: 0, window: 1 })?;
    let scale_factor = if original_max > 0.0 { target_length / original_max } else { 1.0 };

    let stretched = samples
        .iter()
        .map(|s| RawSample::new(s.depth * scale_factor, s.energy))
        .collect();
    let record = Stretch {
        original_depths: samples.iter().map(|s| s.depth).collect(),
        original_max,
        scale_factor,
    };
    Ok((stretched, record))
}

/// Put the depths recorded by `stretch` back.
pub fn restore(samples: &[RawSample], record: &Stretch) -> Result<Vec<RawSample>> {
    if samples.len() != record.original_depths.len() {
        return Err(DrillError::Configuration(format!(
            "log has {} rows but {} were stretched",
            samples.len(),
            record.original_depths.len()
        )));
    }
    Ok(samples
        .iter()
        .zip(&record.original_depths)
        .map(|(s, &depth)| RawSample::new(depth, s.energy))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(n: usize) -> Vec<RawSample> {
        (0..n).map(|k| RawSample::new(k as f64 * 0.5, k as f64 * 10.0)).collect()
    }

    #[test]
    fn extract_keeps_inclusive_range() {
        let out = extract_depth_range(&log(10), 1.0, 2.5);
        let depths: Vec<f64> = out.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![1.0, 1.5, 2.0, 2.5]);
        assert_eq!(extract_depth_range(&log(10), 2.5, 1.0).len(), 4);
    }

    #[test]
    fn thin_keeps_every_nth() {
        let out = thin(&log(10), 3).unwrap();
        let depths: Vec<f64> = out.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![0.0, 1.5, 3.0, 4.5]);
        assert_eq!(thin(&log(4), 1).unwrap().len(), 4);
        assert!(thin(&log(4), 0).is_err());
    }

    #[test]
    fn resample_interpolates_linearly() {
        let out = resample(&log(5), 0.2).unwrap();
        // 0.0 ..= 2.0 in steps of 0.2
        assert_eq!(out.len(), 11);
        assert!((out[1].depth - 0.2).abs() < 1e-12);
        assert!((out[1].energy - 4.0).abs() < 1e-9);
        assert!((out[10].energy - 40.0).abs() < 1e-9);
    }

    #[test]
    fn resample_rejects_bad_input() {
        assert!(resample(&log(5), 0.0).is_err());
        assert!(matches!(
            resample(&log(1), 0.1),
            Err(DrillError::InsufficientData { .. })
        ));
        let mut unsorted = log(5);
        unsorted.swap(1, 3);
        assert!(resample(&unsorted, 0.1).is_err());
    }

    #[test]
    fn resample_rejects_steps_that_explode_the_row_count() {
        let span = [RawSample::new(0.0, 1.0), RawSample::new(30.0, 2.0)];
        for step in [1e-300, 1e-6] {
            assert!(
                matches!(resample(&span, step), Err(DrillError::Configuration(_))),
                "step {step}"
            );
        }
        assert_eq!(resample(&span, 0.5).unwrap().len(), 61);
    }

    #[test]
    fn extract_by_energy_and_percentile() {
        // energies 0, 10, .., 90
        let out = extract_energy_range(&log(10), 25.0, 60.0);
        let energies: Vec<f64> = out.iter().map(|s| s.energy).collect();
        assert_eq!(energies, vec![30.0, 40.0, 50.0, 60.0]);
        assert_eq!(extract_energy_range(&log(10), 60.0, 25.0).len(), 4);

        let out = extract_percentile(&log(10), 10.0, 30.0).unwrap();
        let depths: Vec<f64> = out.iter().map(|s| s.depth).collect();
        assert_eq!(depths, vec![0.5, 1.0]);
        assert_eq!(extract_percentile(&log(10), 0.0, 100.0).unwrap().len(), 10);
        assert!(extract_percentile(&log(10), 50.0, 20.0).is_err());
        assert!(extract_percentile(&log(10), -1.0, 20.0).is_err());
    }

    #[test]
    fn stretch_scales_to_target_and_restores() {
        // depths 0.0 ..= 4.5
        let samples = log(10);
        let (stretched, record) = stretch(&samples, 9.0).unwrap();
        assert_eq!(record.original_max, 4.5);
        assert!((record.scale_factor - 2.0).abs() < 1e-12);
        assert!((stretched[9].depth - 9.0).abs() < 1e-12);
        assert!((stretched[3].depth - 3.0).abs() < 1e-12);
        assert_eq!(stretched[3].energy, samples[3].energy);

        assert_eq!(restore(&stretched, &record).unwrap(), samples);
        assert!(restore(&stretched[..5], &record).is_err());
    }

    #[test]
    fn stretch_edge_cases() {
        let collar_only = [RawSample::new(0.0, 5.0), RawSample::new(0.0, 6.0)];
        let (out, record) = stretch(&collar_only, 10.0).unwrap();
        assert_eq!(record.scale_factor, 1.0);
        assert_eq!(out, collar_only.to_vec());

        assert!(matches!(stretch(&log(3), 0.0), Err(DrillError::Configuration(_))));
        assert!(matches!(stretch(&log(3), f64::NAN), Err(DrillError::Configuration(_))));
        assert!(matches!(stretch(&[], 5.0), Err(DrillError::InsufficientData { .. })));
    }
}
