//! # eegcv — epoch features and cross-validated classification for EEG
//!
//! `eegcv` turns task recordings of an EEG experiment into per-epoch feature
//! vectors and measures how well a classifier separates the task conditions,
//! subject by subject, under leave-one-out, k-fold or stratified k-fold
//! cross-validation.
//!
//! ## Pipeline overview
//!
//! ```text
//! experiment.safetensors
//!   │
//!   ├─ io::load_experiment()          recordings grouped by subject, common epoch length
//!   ├─ features
//!   │    ├─ extract_rms()             [N, C]      sqrt(Σ x²) per channel
//!   │    └─ extract_spectral_bins()   [N, C, B]   |rfft| → band → trim → Σ into B bins
//!   ├─ crossval::CrossValidator       LOO / k-fold / stratified k-fold
//!   │    └─ Learner::fit / predict    caller-supplied classifier
//!   └─ driver::evaluate_subjects()    per-subject accuracy [S], per-class [S, 4]
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use eegcv::{evaluate, EvalConfig, KNearest};
//! use eegcv::io::load_experiment;
//! use std::path::Path;
//!
//! let experiment = load_experiment(Path::new("data/experiment.safetensors")).unwrap();
//! let summary = evaluate(&experiment, &EvalConfig::default(), &mut KNearest::new(1)).unwrap();
//!
//! for (id, acc) in summary.subjects.iter().zip(summary.overall.iter()) {
//!     println!("subject {id}: {acc:.3}");
//! }
//! ```
//!
//! ## Running individual steps
//!
//! ```no_run
//! use eegcv::{CrossValidator, FrequencyBand, MajorityClass, SubjectFilter};
//! use eegcv::features::extract_spectral_bins;
//! # let experiment = eegcv::ExperimentData::default();
//!
//! // 16 bins per channel for the first subject only.
//! let features = extract_spectral_bins(
//!     &experiment, 16, Some(SubjectFilter::Index(0)), FrequencyBand::default(),
//! ).unwrap();
//!
//! // Leave-one-out with a majority-class baseline.
//! let report = CrossValidator::leave_one_out()
//!     .run_features(&features, &mut MajorityClass::default())
//!     .unwrap();
//! println!("accuracy {:.3}, per class {:?}", report.accuracy, report.class_accuracy);
//! ```

pub mod condition;
pub mod config;
pub mod crossval;
pub mod driver;
pub mod epoch;
pub mod error;
pub mod features;
pub mod io;
pub mod learners;
pub mod normalize;
pub mod recording;
pub mod spectrum;

// ── Crate-root re-exports ─────────────────────────────────────────────────

pub use condition::{Condition, EventKind};
pub use config::{EvalConfig, FeatureKind};
pub use crossval::{CrossValidator, CvPolicy, CvReport, Fold, Learner, Partition};
pub use driver::{evaluate_subject, evaluate_subjects, fraction_above, SubjectSummary};
pub use error::{Error, Result};
pub use features::{extract_rms, extract_spectral_bins, FeatureSet, FrequencyBand, SubjectFilter};
pub use learners::{KNearest, MajorityClass};
pub use normalize::Standardizer;
pub use recording::{Event, ExperimentData, Recording, Subject};
pub use spectrum::{bin, rms, solve_spectrum, BinMethod};

/// Run the **full per-subject evaluation** on an experiment.
///
/// This is the main entry point of the crate. For every subject it extracts
/// the features selected by [`EvalConfig::features`], cross-validates
/// `learner` under [`EvalConfig::policy`], and collects the accuracies.
///
/// # Returns
///
/// A [`SubjectSummary`] with:
/// * `overall`   — shape `[S]`, one accuracy in `[0, 1]` per subject.
/// * `per_class` — shape `[S, 4]`, columns in [`Condition::ALL`] order;
///   `NaN` where a subject has no epochs of that condition.
///
/// # Errors
///
/// Any feature-extraction, partitioning or learner failure aborts the whole
/// run.
///
/// # Examples
///
/// ```
/// use eegcv::{evaluate, Condition, CvPolicy, EvalConfig, ExperimentData, FeatureKind,
///             KNearest, Recording};
/// use ndarray::Array2;
///
/// let recordings = vec![
///     Recording::continuous(1, Condition::Baseline, 128.0, Array2::from_elem((2, 128), 1.0)).unwrap(),
///     Recording::continuous(1, Condition::One,      128.0, Array2::from_elem((2, 128), 9.0)).unwrap(),
///     Recording::continuous(1, Condition::Baseline, 128.0, Array2::from_elem((2, 128), 1.5)).unwrap(),
///     Recording::continuous(1, Condition::One,      128.0, Array2::from_elem((2, 128), 8.0)).unwrap(),
/// ];
/// let experiment = ExperimentData::from_recordings(recordings).unwrap();
/// let cfg = EvalConfig {
///     features: FeatureKind::Rms,
///     policy:   CvPolicy::LeaveOneOut,
///     ..EvalConfig::default()
/// };
/// let summary = evaluate(&experiment, &cfg, &mut KNearest::new(1)).unwrap();
/// assert_eq!(summary.overall[0], 1.0);
/// ```
pub fn evaluate<L: Learner + ?Sized>(
    experiment: &ExperimentData,
    cfg: &EvalConfig,
    learner: &mut L,
) -> Result<SubjectSummary> {
    driver::evaluate_subjects(experiment, cfg, learner)
}
