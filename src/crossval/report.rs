//! Accuracy bookkeeping.
//!
//! Overall accuracy counts correct predictions over all samples and is 0 for
//! an empty run. Per-class accuracy is computed per fold as
//! `correct_c / true_c` over the fold's test set; a class with no true
//! instances in a fold is skipped for that fold (`None`) rather than
//! producing 0/0. The run's per-class accuracy is the mean of the class's
//! per-fold ratios, `None` if the class never appeared in a test set.
use crate::condition::Condition;

/// One optional accuracy per condition, in [`Condition::ALL`] order.
pub type ClassAccuracy = [Option<f64>; Condition::COUNT];

/// Outcome of a cross-validation run.
#[derive(Debug, Clone)]
pub struct CvReport {
    /// Prediction for every sample, at its original index. `None` only for
    /// samples no fold tested.
    pub predictions: Vec<Option<Condition>>,
    /// Fraction of samples predicted correctly, in `[0, 1]`.
    pub accuracy: f64,
    /// Per-class accuracy of each fold.
    pub fold_class_accuracy: Vec<ClassAccuracy>,
    /// Mean of each class's per-fold accuracies.
    pub class_accuracy: ClassAccuracy,
}

impl CvReport {
    pub(crate) fn new(
        predictions: Vec<Option<Condition>>,
        truth: &[Condition],
        fold_class_accuracy: Vec<ClassAccuracy>,
    ) -> Self {
        let accuracy = overall_accuracy(&predictions, truth);
        let class_accuracy = mean_class_accuracy(&fold_class_accuracy);
        Self { predictions, accuracy, fold_class_accuracy, class_accuracy }
    }

    pub fn n_folds(&self) -> usize {
        self.fold_class_accuracy.len()
    }

    /// Per-class accuracy with absent classes as `NaN`.
    pub fn class_accuracy_or_nan(&self) -> [f64; Condition::COUNT] {
        self.class_accuracy.map(|a| a.unwrap_or(f64::NAN))
    }
}

/// Fraction of indices where the prediction equals the true label.
/// Returns 0 when there are no samples or no predictions.
pub fn overall_accuracy(predictions: &[Option<Condition>], truth: &[Condition]) -> f64 {
    if truth.is_empty() || predictions.iter().all(Option::is_none) {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(truth)
        .filter(|(p, t)| **p == Some(**t))
        .count();
    correct as f64 / truth.len() as f64
}

/// `correct_c / true_c` for every class present in `truth`.
pub fn fold_class_accuracy(predicted: &[Condition], truth: &[Condition]) -> ClassAccuracy {
    let mut correct = [0usize; Condition::COUNT];
    let mut total = [0usize; Condition::COUNT];
    for (p, t) in predicted.iter().zip(truth) {
        total[t.index()] += 1;
        if p == t {
            correct[t.index()] += 1;
        }
    }
    let mut out = [None; Condition::COUNT];
    for c in 0..Condition::COUNT {
        if total[c] > 0 {
            out[c] = Some(correct[c] as f64 / total[c] as f64);
        }
    }
    out
}

/// Mean of each class's defined per-fold accuracies.
pub fn mean_class_accuracy(folds: &[ClassAccuracy]) -> ClassAccuracy {
    let mut out = [None; Condition::COUNT];
    for (c, slot) in out.iter_mut().enumerate() {
        let defined: Vec<f64> = folds.iter().filter_map(|f| f[c]).collect();
        if !defined.is_empty() {
            *slot = Some(defined.iter().sum::<f64>() / defined.len() as f64);
        }
    }
    out
}
