//! Evaluation configuration.
//!
//! [`EvalConfig`] holds every tunable parameter of a per-subject evaluation
//! run. All fields have defaults matching the settings used for the
//! published results (32 spectral bins, stratified 5-fold).
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crossval::CvPolicy;
use crate::error::Result;
use crate::features::FrequencyBand;

/// Which features are extracted per epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    /// RMS per channel.
    Rms,
    /// Binned power spectrum per channel.
    #[default]
    Spectral,
}

/// Configuration for a per-subject cross-validation run.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use eegcv::{CvPolicy, EvalConfig};
///
/// let cfg = EvalConfig {
///     num_bins: 16,
///     policy:   CvPolicy::LeaveOneOut,
///     ..EvalConfig::default()
/// };
/// ```
///
/// The same fields can be read from JSON with [`EvalConfig::load`]; missing
/// keys fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Feature family extracted per epoch.
    ///
    /// Default: [`FeatureKind::Spectral`].
    pub features: FeatureKind,

    /// Number of spectral bins per channel.
    ///
    /// The spectrum of each channel is trimmed from the high-frequency end
    /// to a multiple of this value and summed into `num_bins` contiguous
    /// bins. Ignored for RMS features.
    ///
    /// Default: `32`.
    pub num_bins: usize,

    /// Frequency range kept before binning.
    ///
    /// Default: unbounded.
    pub band: FrequencyBand,

    /// Fold-partitioning policy.
    ///
    /// Default: stratified 5-fold.
    pub policy: CvPolicy,

    /// Z-score each feature using training-fold statistics.
    ///
    /// Default: `false`.
    pub standardize: bool,

    /// Seed for shuffling indices before k-fold dealing. `None` keeps
    /// index order.
    ///
    /// Default: `None`.
    pub shuffle_seed: Option<u64>,

    /// Log progress every this many folds. `None` logs every fold for small
    /// runs and every `n_folds / 200` folds for large ones.
    ///
    /// Default: `None`.
    pub progress_every: Option<usize>,

    /// Re-segment every recording into epochs of this many seconds before
    /// extraction. `None` keeps the recordings' own epochs.
    ///
    /// Default: `None`.
    pub epoch_dur: Option<f32>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            features: FeatureKind::Spectral,
            num_bins: 32,
            band: FrequencyBand::default(),
            policy: CvPolicy::stratified(),
            standardize: false,
            shuffle_seed: None,
            progress_every: None,
            epoch_dur: None,
        }
    }
}

impl EvalConfig {
    /// Read a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
