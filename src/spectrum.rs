//! Spectral decomposition of single-channel signals.
//!
//! - [`solve_spectrum`]: one-sided magnitude spectrum `|rfft(x)|` and its
//!   frequency axis, length `⌊L/2⌋ + 1`.
//! - [`bin`]: reduce a spectrum to a fixed number of contiguous,
//!   equal-width groups by sum or mean.
//! - [`trimmed_len`]: how much of a spectrum survives when the highest
//!   frequencies are dropped to make it divisible by the bin count.
//!
//! Bins are contiguous index groups, so they only correspond to equal-width
//! frequency bands because the spectrum is trimmed from the top first.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use ndarray::{Array1, ArrayView, ArrayView1, Dimension};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Reduction applied to each bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinMethod {
    #[default]
    Sum,
    Mean,
}

impl FromStr for BinMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sum" => Ok(BinMethod::Sum),
            "mean" => Ok(BinMethod::Mean),
            other => Err(Error::InvalidArgument(format!(
                "bin method must be one of 'sum' or 'mean', got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for BinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinMethod::Sum => "sum",
            BinMethod::Mean => "mean",
        })
    }
}

/// Reusable FFT planner for repeated spectra of the same length.
///
/// Feature extraction computes one spectrum per channel per epoch, all of the
/// same length, so the plan is built once and shared.
pub struct SpectrumPlanner {
    planner: FftPlanner<f32>,
    cached: Option<(usize, Arc<dyn Fft<f32>>)>,
    scratch: Vec<Complex<f32>>,
}

impl Default for SpectrumPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumPlanner {
    pub fn new() -> Self {
        Self { planner: FftPlanner::new(), cached: None, scratch: Vec::new() }
    }

    fn plan(&mut self, n: usize) -> Arc<dyn Fft<f32>> {
        match &self.cached {
            Some((len, fft)) if *len == n => Arc::clone(fft),
            _ => {
                let fft = self.planner.plan_fft_forward(n);
                self.cached = Some((n, Arc::clone(&fft)));
                fft
            }
        }
    }

    /// See [`solve_spectrum`].
    pub fn solve<D: Dimension>(
        &mut self,
        signal: ArrayView<'_, f32, D>,
        sample_rate: f32,
    ) -> Result<(Array1<f32>, Array1<f32>)> {
        if signal.ndim() != 1 {
            return Err(Error::InvalidShape(format!(
                "signal must be 1-dimensional, got shape {:?}",
                signal.shape()
            )));
        }
        let n = signal.len();
        if n == 0 {
            return Err(Error::InvalidArgument("signal is empty".into()));
        }
        if !(sample_rate > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "sample rate must be positive, got {sample_rate}"
            )));
        }

        let fft = self.plan(n);
        self.scratch.clear();
        self.scratch.extend(signal.iter().map(|&v| Complex::new(v, 0.0)));
        fft.process(&mut self.scratch);

        let n_out = n / 2 + 1;
        let spectrum: Array1<f32> = self.scratch[..n_out].iter().map(|c| c.norm()).collect();
        let df = sample_rate / n as f32;
        let freqs = Array1::from_shape_fn(n_out, |k| k as f32 * df);
        Ok((spectrum, freqs))
    }
}

/// One-sided magnitude spectrum of `signal` sampled at `sample_rate` Hz.
///
/// Returns `(spectrum, frequencies)`, both of length `⌊L/2⌋ + 1`, where
/// `frequencies[k] = k · sample_rate / L`.
///
/// # Errors
///
/// * [`Error::InvalidShape`] if `signal` is not one-dimensional.
/// * [`Error::InvalidArgument`] if `signal` is empty or `sample_rate <= 0`.
pub fn solve_spectrum<D: Dimension>(
    signal: ArrayView<'_, f32, D>,
    sample_rate: f32,
) -> Result<(Array1<f32>, Array1<f32>)> {
    SpectrumPlanner::new().solve(signal, sample_rate)
}

/// Reduce `signal` into `num_bins` contiguous equal-length groups.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `signal` is empty, or `num_bins` is zero or
/// does not divide the signal length.
pub fn bin(signal: ArrayView1<'_, f32>, num_bins: usize, method: BinMethod) -> Result<Array1<f32>> {
    if num_bins == 0 {
        return Err(Error::InvalidArgument("number of bins must be positive".into()));
    }
    if signal.is_empty() {
        return Err(Error::InvalidArgument("cannot bin an empty signal".into()));
    }
    if signal.len() % num_bins != 0 {
        return Err(Error::InvalidArgument(format!(
            "signal of length {} not evenly divisible into {num_bins} bins",
            signal.len()
        )));
    }
    let width = signal.len() / num_bins;
    let reduced = signal.exact_chunks(width).into_iter().map(|chunk| {
        let sum = chunk.sum();
        match method {
            BinMethod::Sum => sum,
            BinMethod::Mean => sum / width as f32,
        }
    });
    Ok(reduced.collect())
}

/// Length left after dropping the `len mod num_bins` highest-frequency values.
pub fn trimmed_len(len: usize, num_bins: usize) -> usize {
    if num_bins == 0 {
        return len;
    }
    len - len % num_bins
}

/// Root of the summed squares of `signal`.
///
/// Not normalised by length: this is the energy measure used for features.
pub fn rms(signal: ArrayView1<'_, f32>) -> f32 {
    signal
        .iter()
        .map(|&v| {
            let v = v as f64;
            v * v
        })
        .sum::<f64>()
        .sqrt() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn bin_sum_and_mean() {
        let x = array![1.0_f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        assert_eq!(bin(x.view(), 3, BinMethod::Sum).unwrap(), array![3.0, 7.0, 11.0]);
        assert_eq!(bin(x.view(), 3, BinMethod::Mean).unwrap(), array![1.5, 3.5, 5.5]);
    }

    #[test]
    fn bin_rejects_uneven_split() {
        let x = array![1.0_f32, 2.0, 3.0, 4.0, 5.0];
        assert!(matches!(bin(x.view(), 3, BinMethod::Sum), Err(Error::InvalidArgument(_))));
        assert!(matches!(bin(x.view(), 0, BinMethod::Sum), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn bin_rejects_empty_signal() {
        let x = Array1::<f32>::zeros(0);
        assert!(matches!(bin(x.view(), 4, BinMethod::Mean), Err(Error::InvalidArgument(_))));
        assert!(matches!(bin(x.view(), 4, BinMethod::Sum), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn bin_method_parse() {
        assert_eq!("mean".parse::<BinMethod>().unwrap(), BinMethod::Mean);
        assert!(matches!("median".parse::<BinMethod>(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn trim_ten_into_three() {
        assert_eq!(trimmed_len(10, 3), 9);
        assert_eq!(trimmed_len(9, 3), 9);
    }

    #[test]
    fn rms_of_three_four() {
        approx::assert_abs_diff_eq!(rms(array![3.0_f32, 4.0].view()), 5.0, epsilon = 1e-6);
    }

    #[test]
    fn spectrum_lengths() {
        for n in [8usize, 9, 10, 11] {
            let x = Array1::<f32>::zeros(n);
            let (s, f) = solve_spectrum(x.view(), 100.0).unwrap();
            assert_eq!(s.len(), (n + 2) / 2);
            assert_eq!(f.len(), s.len());
        }
    }

    #[test]
    fn spectrum_of_sine_peaks_at_its_frequency() {
        // 8 Hz sine, 128 Hz sampling, 1 s → peak in bin 8.
        let x = Array1::from_shape_fn(128, |t| {
            (2.0 * std::f32::consts::PI * 8.0 * t as f32 / 128.0).sin()
        });
        let (s, f) = solve_spectrum(x.view(), 128.0).unwrap();
        let peak = s
            .iter()
            .enumerate()
            .fold((0, 0.0_f32), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc });
        assert_eq!(peak.0, 8);
        approx::assert_abs_diff_eq!(f[8], 8.0, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(s[8], 64.0, epsilon = 1e-2);
    }

    #[test]
    fn spectrum_rejects_two_dimensional_input() {
        let x = Array2::<f32>::zeros((2, 8));
        assert!(matches!(solve_spectrum(x.view(), 100.0), Err(Error::InvalidShape(_))));
    }
}
