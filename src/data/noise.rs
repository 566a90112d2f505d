//! Noise removal for energy-vs-depth logs.
//!
//! LOWESS (locally weighted polynomial regression with tricube kernel and
//! bisquare robustness passes) produces a trend of the same length as the
//! input. A residual pass then flags spikes: samples whose distance from the
//! trend exceeds `spike_threshold` times the local scale. The local scale is
//! 1.4826 × median absolute residual over the same neighbourhood, or the
//! standard deviation of the neighbours' residuals when that is larger.
//! Quantized logs often sit on a plateau where most residuals are exactly
//! zero, which collapses the median to nothing.
//!
//! Spikes are either replaced by a re-fitted trend value or removed before
//! re-smoothing; the two are separate [`SpikePolicy`] options.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::model::{Channel, ChannelDataset, RawSample, SmoothedSample};
use crate::error::{DrillError, Result};

/// Consistency constant turning a MAD into a standard deviation estimate.
const MAD_SCALE: f64 = 1.4826;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpikePolicy {
    /// Keep every sample; spikes take the re-fitted trend value.
    #[default]
    Replace,
    /// Drop spikes and smooth what is left.
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingMethod {
    #[default]
    Lowess,
    MovingAverage,
    Median,
}

impl SmoothingMethod {
    pub const ALL: [SmoothingMethod; 3] = [
        SmoothingMethod::Lowess,
        SmoothingMethod::MovingAverage,
        SmoothingMethod::Median,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SmoothingMethod::Lowess => "LOWESS",
            SmoothingMethod::MovingAverage => "Moving average",
            SmoothingMethod::Median => "Median",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    pub method: SmoothingMethod,
    /// Neighbourhood size in samples. Odd, at least 3.
    pub window: usize,
    /// Local polynomial order (LOWESS only), 0 to 2.
    pub degree: usize,
    /// Bisquare re-weighting passes (LOWESS only).
    pub robust_iterations: usize,
    /// Spike cut-off in multiples of the local scale.
    pub spike_threshold: f64,
    pub spike_policy: SpikePolicy,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self {
            method: SmoothingMethod::Lowess,
            window: 21,
            degree: 1,
            robust_iterations: 3,
            spike_threshold: 3.0,
            spike_policy: SpikePolicy::Replace,
        }
    }
}

impl SmoothingParams {
    pub fn validate(&self) -> Result<()> {
        if self.window < 3 || self.window % 2 == 0 {
            return Err(DrillError::Configuration(format!(
                "smoothing window must be odd and at least 3, got {}",
                self.window
            )));
        }
        if self.degree > 2 {
            return Err(DrillError::Configuration(format!(
                "polynomial degree must be 0, 1 or 2, got {}",
                self.degree
            )));
        }
        if self.degree >= self.window {
            return Err(DrillError::Configuration(format!(
                "polynomial degree {} must be smaller than the window {}",
                self.degree, self.window
            )));
        }
        if !self.spike_threshold.is_finite() || self.spike_threshold <= 0.0 {
            return Err(DrillError::Configuration(format!(
                "spike threshold must be positive, got {}",
                self.spike_threshold
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingOutcome {
    /// Smoothed samples in input order (spikes excluded under `Remove`).
    pub samples: Vec<SmoothedSample>,
    /// Input indices dropped as spikes, ascending. Empty under `Replace`.
    pub removed: Vec<usize>,
}

impl SmoothingOutcome {
    pub fn spike_count(&self) -> usize {
        self.samples.iter().filter(|s| s.is_spike).count() + self.removed.len()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Smooth one channel and reject spikes.
pub fn smooth(samples: &[RawSample], params: &SmoothingParams) -> Result<SmoothingOutcome> {
    params.validate()?;
    let n = samples.len();
    if n < params.window {
        return Err(DrillError::InsufficientData {
            available: n,
            window: params.window,
        });
    }

    // Work in depth order; map back to input order at the end.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| samples[a].depth.total_cmp(&samples[b].depth));
    let x: Vec<f64> = order.iter().map(|&i| samples[i].depth).collect();
    let y: Vec<f64> = order.iter().map(|&i| samples[i].energy).collect();

    let hoods = neighbourhoods(&x, params.window);
    let first = fit(&x, &y, &vec![1.0; n], &hoods, params);
    let spikes = detect_spikes(&y, &first, &hoods, params.spike_threshold);
    let n_spikes = spikes.iter().filter(|&&s| s).count();

    match params.spike_policy {
        SpikePolicy::Replace => {
            let trend = if n_spikes == 0 {
                first
            } else {
                let weights: Vec<f64> = spikes.iter().map(|&s| if s { 0.0 } else { 1.0 }).collect();
                fit(&x, &y, &weights, &hoods, params)
            };

            let mut out = vec![
                SmoothedSample {
                    depth: 0.0,
                    raw: 0.0,
                    trend: 0.0,
                    is_spike: false,
                };
                n
            ];
            for (k, &idx) in order.iter().enumerate() {
                out[idx] = SmoothedSample {
                    depth: x[k],
                    raw: y[k],
                    trend: trend[k],
                    is_spike: spikes[k],
                };
            }
            Ok(SmoothingOutcome {
                samples: out,
                removed: Vec::new(),
            })
        }
        SpikePolicy::Remove => {
            let kept: Vec<usize> = (0..n).filter(|&k| !spikes[k]).collect();
            if kept.len() < params.window {
                return Err(DrillError::InsufficientData {
                    available: kept.len(),
                    window: params.window,
                });
            }
            let kx: Vec<f64> = kept.iter().map(|&k| x[k]).collect();
            let ky: Vec<f64> = kept.iter().map(|&k| y[k]).collect();
            let trend = if n_spikes == 0 {
                first
            } else {
                let kept_hoods = neighbourhoods(&kx, params.window);
                fit(&kx, &ky, &vec![1.0; kx.len()], &kept_hoods, params)
            };

            let mut indexed: Vec<(usize, SmoothedSample)> = kept
                .iter()
                .enumerate()
                .map(|(j, &k)| {
                    (
                        order[k],
                        SmoothedSample {
                            depth: kx[j],
                            raw: ky[j],
                            trend: trend[j],
                            is_spike: false,
                        },
                    )
                })
                .collect();
            indexed.sort_by_key(|(idx, _)| *idx);

            let mut removed: Vec<usize> = (0..n).filter(|&k| spikes[k]).map(|k| order[k]).collect();
            removed.sort_unstable();

            Ok(SmoothingOutcome {
                samples: indexed.into_iter().map(|(_, s)| s).collect(),
                removed,
            })
        }
    }
}

/// Smooth every channel in parallel. Channels are independent.
pub fn smooth_channels(
    datasets: &[&ChannelDataset],
    params: &SmoothingParams,
) -> Vec<(Channel, Result<SmoothingOutcome>)> {
    datasets
        .par_iter()
        .map(|ds| (ds.channel, smooth(&ds.samples, params)))
        .collect()
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// `[lo, hi)` of the `window` nearest neighbours of each point in sorted `x`.
fn neighbourhoods(x: &[f64], window: usize) -> Vec<(usize, usize)> {
    let n = x.len();
    let k = window.min(n);
    let mut lo = 0;
    (0..n)
        .map(|i| {
            while lo + k < n && (lo + k <= i || x[i] - x[lo] > x[lo + k] - x[i]) {
                lo += 1;
            }
            (lo, lo + k)
        })
        .collect()
}

fn fit(x: &[f64], y: &[f64], base: &[f64], hoods: &[(usize, usize)], params: &SmoothingParams) -> Vec<f64> {
    match params.method {
        SmoothingMethod::Lowess => lowess(x, y, base, hoods, params.degree, params.robust_iterations),
        SmoothingMethod::MovingAverage => hoods
            .iter()
            .enumerate()
            .map(|(i, &(lo, hi))| {
                let (sum, wsum) = (lo..hi).fold((0.0, 0.0), |(s, w), j| (s + base[j] * y[j], w + base[j]));
                if wsum > 0.0 {
                    sum / wsum
                } else {
                    y[i]
                }
            })
            .collect(),
        SmoothingMethod::Median => hoods
            .iter()
            .enumerate()
            .map(|(i, &(lo, hi))| {
                let mut vals: Vec<f64> = (lo..hi).filter(|&j| base[j] > 0.0).map(|j| y[j]).collect();
                median(&mut vals).unwrap_or(y[i])
            })
            .collect(),
    }
}

fn lowess(
    x: &[f64],
    y: &[f64],
    base: &[f64],
    hoods: &[(usize, usize)],
    degree: usize,
    robust_iterations: usize,
) -> Vec<f64> {
    let n = x.len();
    let y_scale = y.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    let mut robust = vec![1.0; n];
    let mut fitted = local_pass(x, y, base, &robust, hoods, degree);

    for _ in 0..robust_iterations {
        let mut abs_resid: Vec<f64> = (0..n)
            .filter(|&j| base[j] > 0.0)
            .map(|j| (y[j] - fitted[j]).abs())
            .collect();
        let Some(mad) = median(&mut abs_resid) else {
            break;
        };
        // An exact fit leaves only rounding noise in the residuals.
        let s = mad.max(1e-10 * (1.0 + y_scale));
        for j in 0..n {
            let u = (y[j] - fitted[j]) / (6.0 * s);
            robust[j] = if u.abs() < 1.0 { (1.0 - u * u).powi(2) } else { 0.0 };
        }
        fitted = local_pass(x, y, base, &robust, hoods, degree);
    }
    fitted
}

fn local_pass(
    x: &[f64],
    y: &[f64],
    base: &[f64],
    robust: &[f64],
    hoods: &[(usize, usize)],
    degree: usize,
) -> Vec<f64> {
    (0..x.len())
        .map(|i| {
            let (lo, hi) = hoods[i];
            let combined: Vec<f64> = (lo..hi).map(|j| base[j] * robust[j]).collect();
            if combined.iter().any(|&w| w > 0.0) {
                local_fit(x, y, &combined, i, lo, hi, degree)
            } else {
                // Every neighbour was down-weighted; fall back to the plain fit.
                local_fit(x, y, &base[lo..hi], i, lo, hi, degree)
            }
        })
        .collect()
}

/// Weighted polynomial fit over `[lo, hi)` evaluated at `x[i]`.
fn local_fit(x: &[f64], y: &[f64], weights: &[f64], i: usize, lo: usize, hi: usize, degree: usize) -> f64 {
    let xi = x[i];
    let max_dist = (xi - x[lo]).max(x[hi - 1] - xi);
    let half = ((hi - lo - 1) / 2).max(1) as f64;
    // Bandwidth reaches half a step past the outermost neighbour on even spacing.
    let h = max_dist * (half + 1.0) / half;

    let kernel: Vec<(f64, f64, f64)> = (lo..hi)
        .zip(weights)
        .filter_map(|(j, &w)| {
            if w <= 0.0 {
                return None;
            }
            let u = if h > 0.0 { (x[j] - xi) / h } else { 0.0 };
            let tri = (1.0 - u.abs().powi(3)).max(0.0).powi(3);
            let w = w * tri;
            (w > 0.0).then_some((u, y[j], w))
        })
        .collect();
    if kernel.is_empty() {
        return y[i];
    }

    // Reduce the degree until the normal equations are solvable.
    for p in (0..=degree).rev() {
        if let Some(value) = solve_local(&kernel, p) {
            return value;
        }
    }
    y[i]
}

/// Value at `u = 0` of the weighted least-squares polynomial of order `p`.
fn solve_local(points: &[(f64, f64, f64)], p: usize) -> Option<f64> {
    let m = p + 1;
    let mut a = vec![vec![0.0; m + 1]; m];
    for &(u, v, w) in points {
        let mut powers = vec![1.0; 2 * m - 1];
        for k in 1..powers.len() {
            powers[k] = powers[k - 1] * u;
        }
        for r in 0..m {
            for c in 0..m {
                a[r][c] += w * powers[r + c];
            }
            a[r][m] += w * v * powers[r];
        }
    }

    // Gaussian elimination with partial pivoting.
    let scale = a[0][0].abs().max(f64::MIN_POSITIVE);
    for col in 0..m {
        let pivot = (col..m).max_by(|&r1, &r2| a[r1][col].abs().total_cmp(&a[r2][col].abs()))?;
        if a[pivot][col].abs() <= 1e-12 * scale {
            return None;
        }
        a.swap(col, pivot);
        for r in (col + 1)..m {
            let f = a[r][col] / a[col][col];
            for c in col..=m {
                a[r][c] -= f * a[col][c];
            }
        }
    }
    let mut coeffs = vec![0.0; m];
    for r in (0..m).rev() {
        let tail: f64 = ((r + 1)..m).map(|c| a[r][c] * coeffs[c]).sum();
        coeffs[r] = (a[r][m] - tail) / a[r][r];
    }
    coeffs[0].is_finite().then_some(coeffs[0])
}

fn detect_spikes(y: &[f64], trend: &[f64], hoods: &[(usize, usize)], threshold: f64) -> Vec<bool> {
    let resid: Vec<f64> = y.iter().zip(trend).map(|(a, b)| a - b).collect();
    hoods
        .iter()
        .enumerate()
        .map(|(i, &(lo, hi))| {
            let mut local: Vec<f64> = resid[lo..hi].iter().map(|r| r.abs()).collect();
            let mad_scale = MAD_SCALE * median(&mut local).unwrap_or(0.0);
            let scale = mad_scale.max(neighbour_spread(&resid, lo, hi, i));
            // Floor keeps rounding noise on an exact fit from reading as spikes.
            let floor = 1e-9 * (1.0 + trend[i].abs());
            resid[i].abs() > (threshold * scale).max(floor)
        })
        .collect()
}

/// Root mean square of the residuals in `[lo, hi)` other than `i`.
fn neighbour_spread(resid: &[f64], lo: usize, hi: usize, i: usize) -> f64 {
    let (sum, count) = (lo..hi)
        .filter(|&j| j != i)
        .fold((0.0, 0usize), |(s, c), j| (s + resid[j] * resid[j], c + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(outcome: &SmoothingOutcome) -> Vec<f64> {
        outcome.samples.iter().map(|s| s.trend).collect()
    }

    /// Bounded, deterministic jitter.
    fn jitter(k: usize) -> f64 {
        0.1 * (7.3 * k as f64).sin()
    }

    fn ramp_with_spike(n: usize, spike_at: usize) -> Vec<RawSample> {
        (0..n)
            .map(|k| {
                let depth = k as f64 * 0.02;
                let mut energy = 100.0 + 5.0 * depth + jitter(k);
                if k == spike_at {
                    energy += 50.0;
                }
                RawSample::new(depth, energy)
            })
            .collect()
    }

    fn params(policy: SpikePolicy) -> SmoothingParams {
        SmoothingParams {
            spike_policy: policy,
            ..SmoothingParams::default()
        }
    }

    #[test]
    fn replace_keeps_length_and_flags_spike() {
        let samples = ramp_with_spike(100, 50);
        let out = smooth(&samples, &params(SpikePolicy::Replace)).unwrap();

        assert_eq!(out.samples.len(), samples.len());
        assert!(out.removed.is_empty());
        assert!(out.samples[50].is_spike);
        assert_eq!(out.spike_count(), 1);

        let expected = 100.0 + 5.0 * 1.0;
        assert!((out.samples[50].trend - expected).abs() < 0.5, "{}", out.samples[50].trend);
        assert_eq!(out.samples[50].raw, samples[50].energy);
    }

    #[test]
    fn remove_drops_and_reports_spike() {
        let samples = ramp_with_spike(100, 37);
        let out = smooth(&samples, &params(SpikePolicy::Remove)).unwrap();

        assert_eq!(out.removed, vec![37]);
        assert_eq!(out.samples.len(), samples.len() - 1);
        assert!(out.samples.iter().all(|s| !s.is_spike));
        assert!(out.samples.iter().all(|s| s.depth != samples[37].depth));
        assert_eq!(out.spike_count(), 1);
    }

    #[test]
    fn too_few_samples_is_insufficient_data() {
        let samples = vec![RawSample::new(0.0, 1.0), RawSample::new(0.1, 2.0), RawSample::new(0.2, 3.0)];
        let p = SmoothingParams {
            window: 5,
            ..SmoothingParams::default()
        };
        let err = smooth(&samples, &p).unwrap_err();
        assert!(matches!(err, DrillError::InsufficientData { available: 3, window: 5 }));
    }

    #[test]
    fn removing_spikes_below_window_is_insufficient_data() {
        let mut samples: Vec<RawSample> = (0..5).map(|k| RawSample::new(k as f64, 10.0)).collect();
        samples[2].energy = 99.0;
        let p = SmoothingParams {
            method: SmoothingMethod::Median,
            window: 5,
            spike_policy: SpikePolicy::Remove,
            ..SmoothingParams::default()
        };
        let err = smooth(&samples, &p).unwrap_err();
        assert!(matches!(err, DrillError::InsufficientData { available: 4, window: 5 }), "{err:?}");
    }

    /// Logger output rounded to 0.1: a flat run with a one-digit step every
    /// fifth row.
    fn quantized_plateau(n: usize) -> Vec<RawSample> {
        (0..n)
            .map(|k| {
                let energy = if k % 5 == 0 { 100.1 } else { 100.0 };
                RawSample::new(k as f64 * 0.02, energy)
            })
            .collect()
    }

    #[test]
    fn quantization_steps_are_not_spikes() {
        let samples = quantized_plateau(60);

        let replaced = smooth(&samples, &params(SpikePolicy::Replace)).unwrap();
        assert_eq!(replaced.spike_count(), 0);

        let removed = smooth(&samples, &params(SpikePolicy::Remove)).unwrap();
        assert!(removed.removed.is_empty(), "{:?}", removed.removed);
        assert_eq!(removed.samples.len(), 60);
    }

    #[test]
    fn spike_on_quantized_plateau_is_still_found() {
        let mut samples = quantized_plateau(60);
        samples[32].energy = 105.0;

        let out = smooth(&samples, &params(SpikePolicy::Remove)).unwrap();
        assert_eq!(out.removed, vec![32]);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let bad = [
            SmoothingParams { window: 4, ..Default::default() },
            SmoothingParams { window: 1, ..Default::default() },
            SmoothingParams { degree: 3, ..Default::default() },
            SmoothingParams { window: 3, degree: 3, ..Default::default() },
            SmoothingParams { spike_threshold: 0.0, ..Default::default() },
            SmoothingParams { spike_threshold: f64::NAN, ..Default::default() },
        ];
        for p in bad {
            assert!(matches!(p.validate(), Err(DrillError::Configuration(_))), "{p:?}");
        }
        assert!(SmoothingParams::default().validate().is_ok());
    }

    #[test]
    fn linear_signal_is_reproduced() {
        let samples: Vec<RawSample> = (0..40).map(|k| RawSample::new(k as f64, 3.0 * k as f64 - 7.0)).collect();
        let out = smooth(&samples, &SmoothingParams::default()).unwrap();
        for (s, raw) in out.samples.iter().zip(&samples) {
            assert!((s.trend - raw.energy).abs() < 1e-6);
            assert!(!s.is_spike);
        }
    }

    #[test]
    fn smoothing_reduces_noise() {
        let clean = |d: f64| 50.0 + 10.0 * (d / 4.0).sin();
        let samples: Vec<RawSample> = (0..200)
            .map(|k| {
                let d = k as f64 * 0.05;
                RawSample::new(d, clean(d) + jitter(k))
            })
            .collect();
        let out = smooth(&samples, &SmoothingParams::default()).unwrap();

        let rms = |f: &dyn Fn(usize) -> f64| {
            ((0..samples.len()).map(|k| f(k).powi(2)).sum::<f64>() / samples.len() as f64).sqrt()
        };
        let raw_err = rms(&|k| samples[k].energy - clean(samples[k].depth));
        let trend_err = rms(&|k| out.samples[k].trend - clean(samples[k].depth));
        assert!(trend_err < raw_err, "{trend_err} >= {raw_err}");
    }

    #[test]
    fn resmoothing_a_trend_changes_it_less_than_the_first_pass() {
        let mut samples = ramp_with_spike(120, 30);
        samples[90].energy -= 40.0;
        let p = SmoothingParams::default();

        let first = smooth(&samples, &p).unwrap();
        let as_raw: Vec<RawSample> = first.samples.iter().map(|s| RawSample::new(s.depth, s.trend)).collect();
        let second = smooth(&as_raw, &p).unwrap();

        let max_diff = |a: &[f64], b: &[f64]| a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max);
        let raw: Vec<f64> = samples.iter().map(|s| s.energy).collect();
        let first_change = max_diff(&raw, &trend(&first));
        let second_change = max_diff(&trend(&first), &trend(&second));
        assert!(second_change < first_change, "{second_change} >= {first_change}");
    }

    #[test]
    fn unsorted_input_keeps_its_order() {
        let mut samples = ramp_with_spike(60, 1000);
        samples.swap(3, 40);
        samples.swap(10, 55);
        let out = smooth(&samples, &SmoothingParams::default()).unwrap();
        for (s, raw) in out.samples.iter().zip(&samples) {
            assert_eq!(s.depth, raw.depth);
            assert_eq!(s.raw, raw.energy);
        }
    }

    #[test]
    fn alternative_methods_keep_length() {
        let samples = ramp_with_spike(80, 20);
        for method in [SmoothingMethod::MovingAverage, SmoothingMethod::Median] {
            let p = SmoothingParams {
                method,
                window: 9,
                ..SmoothingParams::default()
            };
            let out = smooth(&samples, &p).unwrap();
            assert_eq!(out.samples.len(), 80);
            assert!(out.samples[20].is_spike, "{method:?}");
        }
    }

    #[test]
    fn median_filter_ignores_single_outlier() {
        let mut samples: Vec<RawSample> = (0..15).map(|k| RawSample::new(k as f64, 10.0)).collect();
        samples[7].energy = 99.0;
        let p = SmoothingParams {
            method: SmoothingMethod::Median,
            window: 5,
            ..SmoothingParams::default()
        };
        let out = smooth(&samples, &p).unwrap();
        assert_eq!(out.samples[7].trend, 10.0);
        assert!(out.samples[7].is_spike);
    }

    #[test]
    fn smooth_channels_returns_one_result_per_channel() {
        let make = |channel: Channel, n| {
            ChannelDataset::new(format!("log_{}.csv", channel.label()), channel, ramp_with_spike(n, 1000))
        };
        let left = make(Channel::Left, 50);
        let right = make(Channel::Right, 4);
        let results = smooth_channels(&[&left, &right], &SmoothingParams::default());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, Channel::Left);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, Channel::Right);
        assert!(matches!(results[1].1, Err(DrillError::InsufficientData { .. })));
    }

    #[test]
    fn neighbourhoods_slide_with_the_point() {
        let x: Vec<f64> = (0..10).map(|k| k as f64).collect();
        let hoods = neighbourhoods(&x, 5);
        assert_eq!(hoods[0], (0, 5));
        assert_eq!(hoods[4], (2, 7));
        assert_eq!(hoods[9], (5, 10));
    }
}
