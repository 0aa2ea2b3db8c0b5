//! Per-epoch feature extraction.
//!
//! Both extractors walk the experiment subject → condition → epoch and emit
//! one instance per epoch, labelled with the recording's condition:
//!
//! ```text
//! extract_rms            [N, C]         sqrt(Σ x²) per channel
//! extract_spectral_bins  [N, C, B]      |rfft| per channel → band → trim → Σ into B bins
//! ```
//!
//! Spectral instances are matrices; [`FeatureSet::flatten`] turns them into
//! the `[N, C·B]` layout classifiers expect.
use log::debug;
use ndarray::{s, Array1, Array2, Array3, ArrayD, Axis};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::{Error, Result};
use crate::recording::{ExperimentData, Recording};
use crate::spectrum::{self, BinMethod, SpectrumPlanner};

/// Restrict extraction to one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectFilter {
    /// Match on [`Recording::subject`].
    Id(u32),
    /// Match on the subject's position in [`ExperimentData::subjects`].
    Index(usize),
}

/// Frequency range (Hz, inclusive) kept before binning. Unbounded by default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrequencyBand {
    pub low: Option<f32>,
    pub high: Option<f32>,
}

impl FrequencyBand {
    pub fn new(low: Option<f32>, high: Option<f32>) -> Self {
        Self { low, high }
    }

    pub fn is_unbounded(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }

    pub fn contains(&self, freq: f32) -> bool {
        self.low.map_or(true, |lo| freq >= lo) && self.high.map_or(true, |hi| freq <= hi)
    }

    /// Spectrum values whose frequency lies inside the band, in order.
    fn select(&self, spectrum: Array1<f32>, freqs: &Array1<f32>) -> Array1<f32> {
        if self.is_unbounded() {
            return spectrum;
        }
        spectrum
            .iter()
            .zip(freqs.iter())
            .filter(|(_, f)| self.contains(**f))
            .map(|(&v, _)| v)
            .collect()
    }
}

/// Samples with one condition label per instance.
///
/// `samples` has the instance axis first; `labels[i]` belongs to
/// `samples[i, ..]`.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub samples: ArrayD<f32>,
    pub labels: Vec<Condition>,
}

impl FeatureSet {
    pub fn new(samples: ArrayD<f32>, labels: Vec<Condition>) -> Result<Self> {
        if samples.ndim() == 0 || samples.len_of(Axis(0)) != labels.len() {
            return Err(Error::InvalidArgument(format!(
                "{} samples but {} labels",
                samples.shape().first().copied().unwrap_or(0),
                labels.len()
            )));
        }
        Ok(Self { samples, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Shape of a single instance, e.g. `[C]` or `[C, B]`.
    pub fn instance_shape(&self) -> &[usize] {
        &self.samples.shape()[1..]
    }

    /// `[N, F]` copy with each instance flattened in row-major order.
    pub fn flatten(&self) -> Array2<f32> {
        flatten_instances(&self.samples)
    }
}

/// Collapse every axis after the first: `[N, d1, d2, …]` → `[N, d1·d2·…]`.
pub fn flatten_instances(samples: &ArrayD<f32>) -> Array2<f32> {
    let n = samples.shape().first().copied().unwrap_or(0);
    let width: usize = samples.shape().iter().skip(1).product();
    let flat: Vec<f32> = samples.iter().copied().collect();
    // Standard-order iteration yields exactly n · width values.
    Array2::from_shape_vec((n, width), flat).unwrap_or_else(|_| Array2::zeros((n, width)))
}

fn select_recordings<'a>(
    experiment: &'a ExperimentData,
    subject: Option<SubjectFilter>,
) -> Result<Vec<&'a Recording>> {
    let matches = |pos: usize, id: u32| match subject {
        None => true,
        Some(SubjectFilter::Id(want)) => id == want,
        Some(SubjectFilter::Index(want)) => pos == want,
    };
    let selected: Vec<&Recording> = experiment
        .subjects
        .iter()
        .enumerate()
        .filter(|(pos, s)| matches(*pos, s.id))
        .flat_map(|(_, s)| s.recordings.iter())
        .collect();

    if let Some(filter) = subject {
        if selected.is_empty() {
            return Err(Error::InvalidArgument(format!("no recordings for subject {filter:?}")));
        }
    }
    Ok(selected)
}

fn channel_count(recordings: &[&Recording]) -> Result<usize> {
    let n_ch = recordings.first().map_or(0, |r| r.n_channels());
    if let Some(bad) = recordings.iter().find(|r| r.n_channels() != n_ch) {
        return Err(Error::InvalidShape(format!(
            "subject {} condition {} has {} channels, expected {n_ch}",
            bad.subject,
            bad.condition,
            bad.n_channels()
        )));
    }
    Ok(n_ch)
}

/// RMS of every channel of every epoch → `[N, C]`.
pub fn extract_rms(experiment: &ExperimentData, subject: Option<SubjectFilter>) -> Result<FeatureSet> {
    let recordings = select_recordings(experiment, subject)?;
    let n_ch = channel_count(&recordings)?;

    let mut values = Vec::new();
    let mut labels = Vec::new();
    for rec in recordings {
        for e in 0..rec.n_epochs() {
            values.extend(rec.epoch(e).rows().into_iter().map(spectrum::rms));
            labels.push(rec.condition);
        }
    }

    let samples = Array2::from_shape_vec((labels.len(), n_ch), values)?.into_dyn();
    debug!("rms features: {} instances × {n_ch} channels", labels.len());
    Ok(FeatureSet { samples, labels })
}

/// Binned power spectrum of every channel of every epoch → `[N, C, num_bins]`.
///
/// Per channel: spectrum at the recording's sample rate, restricted to
/// `band`, trimmed from the top to a multiple of `num_bins`, then summed
/// into `num_bins` contiguous bins.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `num_bins` is zero or a channel's spectrum
/// has fewer than `num_bins` values inside `band`.
pub fn extract_spectral_bins(
    experiment: &ExperimentData,
    num_bins: usize,
    subject: Option<SubjectFilter>,
    band: FrequencyBand,
) -> Result<FeatureSet> {
    if num_bins == 0 {
        return Err(Error::InvalidArgument("number of bins must be positive".into()));
    }
    let recordings = select_recordings(experiment, subject)?;
    let n_ch = channel_count(&recordings)?;

    let mut planner = SpectrumPlanner::new();
    let mut values = Vec::new();
    let mut labels = Vec::new();
    for rec in recordings {
        for e in 0..rec.n_epochs() {
            for channel in rec.epoch(e).rows() {
                let (spec, freqs) = planner.solve(channel, rec.sample_rate)?;
                let kept = band.select(spec, &freqs);
                let n_kept = spectrum::trimmed_len(kept.len(), num_bins);
                if n_kept == 0 {
                    return Err(Error::InvalidArgument(format!(
                        "spectrum has {} values in band, fewer than {num_bins} bins",
                        kept.len()
                    )));
                }
                let binned = spectrum::bin(kept.slice(s![..n_kept]), num_bins, BinMethod::Sum)?;
                values.extend(binned.iter().copied());
            }
            labels.push(rec.condition);
        }
    }

    let samples = Array3::from_shape_vec((labels.len(), n_ch, num_bins), values)?.into_dyn();
    debug!(
        "spectral features: {} instances × {n_ch} channels × {num_bins} bins",
        labels.len()
    );
    Ok(FeatureSet { samples, labels })
}
