//! Fold execution.
//!
//! For every fold, in partition order:
//!
//! 1. copy the train/test rows (instances flattened to `[N, F]`),
//! 2. optionally standardise both with train-fold statistics,
//! 3. `fit` the learner on the train rows,
//! 4. `predict` the test rows and store the predictions at their original
//!    indices,
//! 5. record the fold's per-class accuracy.
//!
//! Folds never overlap in time: the learner is refit from scratch before
//! each prediction, so its model state is only ever seen by one fold.
use log::{debug, info, warn};
use ndarray::{ArrayD, ArrayView2, Axis};

use crate::condition::Condition;
use crate::config::EvalConfig;
use crate::error::{Error, Result};
use crate::features::{flatten_instances, FeatureSet};
use crate::normalize::Standardizer;

use super::partition::{partition, CvPolicy};
use super::report::{fold_class_accuracy, CvReport};

/// A trainable classifier.
///
/// `fit` replaces whatever model state the learner holds with one trained on
/// the given rows; `predict` labels new rows with that state. The two are
/// one unit: `predict` is only meaningful after `fit` on the same value.
pub trait Learner {
    /// Train on `samples` ([N, F]) with one label per row.
    fn fit(&mut self, samples: ArrayView2<'_, f32>, labels: &[Condition]) -> anyhow::Result<()>;

    /// Predict one label per row of `samples` ([N, F]).
    fn predict(&self, samples: ArrayView2<'_, f32>) -> anyhow::Result<Vec<Condition>>;
}

impl<L: Learner + ?Sized> Learner for Box<L> {
    fn fit(&mut self, samples: ArrayView2<'_, f32>, labels: &[Condition]) -> anyhow::Result<()> {
        (**self).fit(samples, labels)
    }

    fn predict(&self, samples: ArrayView2<'_, f32>) -> anyhow::Result<Vec<Condition>> {
        (**self).predict(samples)
    }
}

/// Default progress granularity: every fold up to 200 folds, otherwise
/// every `n_folds / 200` folds.
pub fn default_progress_interval(n_folds: usize) -> usize {
    if n_folds > 200 {
        n_folds / 200
    } else {
        1
    }
}

/// Whether fold `fold` (zero-based) of `n_folds` gets a progress line.
/// The last fold always does; `every == 0` is treated as 1.
pub fn should_report(fold: usize, n_folds: usize, every: usize) -> bool {
    (fold + 1) % every.max(1) == 0 || fold + 1 == n_folds
}

/// Cross-validation settings.
#[derive(Debug, Clone, Default)]
pub struct CrossValidator {
    pub policy: CvPolicy,
    /// Z-score features with train-fold statistics.
    pub standardize: bool,
    /// Shuffle indices before dealing k-fold / stratified folds.
    pub shuffle_seed: Option<u64>,
    /// Log progress every this many folds; `None` picks
    /// [`default_progress_interval`].
    pub progress_every: Option<usize>,
}

impl CrossValidator {
    pub fn new(policy: CvPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn leave_one_out() -> Self {
        Self::new(CvPolicy::LeaveOneOut)
    }

    pub fn k_fold(k: usize) -> Self {
        Self::new(CvPolicy::KFold { k })
    }

    pub fn stratified_k_fold(k: usize) -> Self {
        Self::new(CvPolicy::StratifiedKFold { k })
    }

    pub fn from_config(cfg: &EvalConfig) -> Self {
        Self {
            policy: cfg.policy,
            standardize: cfg.standardize,
            shuffle_seed: cfg.shuffle_seed,
            progress_every: cfg.progress_every,
        }
    }

    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    pub fn with_shuffle_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = Some(every);
        self
    }

    /// Cross-validate `learner` on a feature set.
    pub fn run_features<L: Learner + ?Sized>(
        &self,
        features: &FeatureSet,
        learner: &mut L,
    ) -> Result<CvReport> {
        self.run(&features.samples, &features.labels, learner)
    }

    /// Cross-validate `learner` on `samples` (instance axis first) and
    /// `labels`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if the sample and label counts differ,
    ///   `k` is out of range, or the learner returns the wrong number of
    ///   predictions.
    /// * [`Error::Learner`] if the learner fails.
    pub fn run<L: Learner + ?Sized>(
        &self,
        samples: &ArrayD<f32>,
        labels: &[Condition],
        learner: &mut L,
    ) -> Result<CvReport> {
        let n = labels.len();
        if samples.ndim() == 0 || samples.len_of(Axis(0)) != n {
            return Err(Error::InvalidArgument(format!(
                "{} samples but {n} labels",
                samples.shape().first().copied().unwrap_or(0)
            )));
        }
        if n == 0 {
            warn!("cross-validation on an empty sample set; accuracy reported as 0");
        }

        let flat = flatten_instances(samples);
        let folds = partition(self.policy, labels, self.shuffle_seed)?;
        let n_folds = folds.len();
        let every = self
            .progress_every
            .unwrap_or_else(|| default_progress_interval(n_folds));

        let mut predictions: Vec<Option<Condition>> = vec![None; n];
        let mut fold_class = Vec::with_capacity(n_folds);
        for i in 0..n_folds {
            let train = folds.train(i);
            let test = folds.test(i);

            let mut train_x = flat.select(Axis(0), &train);
            let mut test_x = flat.select(Axis(0), test);
            let train_y: Vec<Condition> = train.iter().map(|&j| labels[j]).collect();
            let test_y: Vec<Condition> = test.iter().map(|&j| labels[j]).collect();

            if self.standardize {
                let st = Standardizer::fit(train_x.view());
                st.apply(&mut train_x);
                st.apply(&mut test_x);
            }

            learner.fit(train_x.view(), &train_y).map_err(Error::Learner)?;
            let predicted = learner.predict(test_x.view()).map_err(Error::Learner)?;
            if predicted.len() != test.len() {
                return Err(Error::InvalidArgument(format!(
                    "learner returned {} predictions for {} test samples",
                    predicted.len(),
                    test.len()
                )));
            }

            for (&j, &p) in test.iter().zip(&predicted) {
                predictions[j] = Some(p);
            }
            fold_class.push(fold_class_accuracy(&predicted, &test_y));
            debug!("fold {}: {} train, {} test", i + 1, train.len(), test.len());

            if should_report(i, n_folds, every) {
                info!("{} of {} folds complete", i + 1, n_folds);
            }
        }

        Ok(CvReport::new(predictions, labels, fold_class))
    }
}
