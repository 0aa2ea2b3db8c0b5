//! Per-subject evaluation across a whole experiment.
//!
//! For each subject: extract features restricted to that subject, run the
//! configured cross-validation, and keep the overall accuracy and the
//! per-class accuracies (canonical [`Condition::ALL`] order; classes never
//! tested for that subject are `NaN`).
use log::info;
use ndarray::{Array1, Array2};

use crate::condition::Condition;
use crate::config::{EvalConfig, FeatureKind};
use crate::crossval::{CrossValidator, CvReport, Learner};
use crate::error::Result;
use crate::features::{extract_rms, extract_spectral_bins, FeatureSet, SubjectFilter};
use crate::recording::ExperimentData;

/// Accuracies of every subject of an experiment.
#[derive(Debug, Clone)]
pub struct SubjectSummary {
    /// Subject ids, in [`ExperimentData::subjects`] order.
    pub subjects: Vec<u32>,
    /// `[S]` overall accuracy per subject.
    pub overall: Array1<f64>,
    /// `[S, 4]` per-class accuracy per subject.
    pub per_class: Array2<f64>,
}

impl SubjectSummary {
    /// Mean overall accuracy across subjects (0 when there are none).
    pub fn mean_accuracy(&self) -> f64 {
        self.overall.mean().unwrap_or(0.0)
    }
}

/// Extract the configured features for one subject.
pub fn extract(
    experiment: &ExperimentData,
    cfg: &EvalConfig,
    subject: Option<SubjectFilter>,
) -> Result<FeatureSet> {
    match cfg.features {
        FeatureKind::Rms => extract_rms(experiment, subject),
        FeatureKind::Spectral => extract_spectral_bins(experiment, cfg.num_bins, subject, cfg.band),
    }
}

/// Cross-validate `learner` for a single subject.
pub fn evaluate_subject<L: Learner + ?Sized>(
    experiment: &ExperimentData,
    cfg: &EvalConfig,
    subject: SubjectFilter,
    learner: &mut L,
) -> Result<CvReport> {
    let features = extract(experiment, cfg, Some(subject))?;
    CrossValidator::from_config(cfg).run_features(&features, learner)
}

/// Cross-validate `learner` separately for every subject.
///
/// When [`EvalConfig::epoch_dur`] is set the experiment is re-segmented
/// first, on a copy.
pub fn evaluate_subjects<L: Learner + ?Sized>(
    experiment: &ExperimentData,
    cfg: &EvalConfig,
    learner: &mut L,
) -> Result<SubjectSummary> {
    let resegmented;
    let experiment = match cfg.epoch_dur {
        Some(dur) => {
            let mut copy = experiment.clone();
            copy.split_epochs(dur)?;
            resegmented = copy;
            &resegmented
        }
        None => experiment,
    };

    let n = experiment.n_subjects();
    let mut overall = Array1::<f64>::zeros(n);
    let mut per_class = Array2::<f64>::zeros((n, Condition::COUNT));
    for (i, subject) in experiment.subjects.iter().enumerate() {
        info!("starting subject {}/{n} (id {})", i + 1, subject.id);
        let report = evaluate_subject(experiment, cfg, SubjectFilter::Index(i), learner)?;
        overall[i] = report.accuracy;
        for (c, acc) in report.class_accuracy_or_nan().into_iter().enumerate() {
            per_class[[i, c]] = acc;
        }
        info!("subject {}: accuracy {:.3}", subject.id, report.accuracy);
    }

    Ok(SubjectSummary {
        subjects: experiment.subjects.iter().map(|s| s.id).collect(),
        overall,
        per_class,
    })
}

/// Share of finite `values` strictly above `threshold`; 0 when none are
/// finite.
pub fn fraction_above<'a>(values: impl IntoIterator<Item = &'a f64>, threshold: f64) -> f64 {
    let (mut above, mut total) = (0usize, 0usize);
    for &v in values {
        if v.is_finite() {
            total += 1;
            if v > threshold {
                above += 1;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        above as f64 / total as f64
    }
}
