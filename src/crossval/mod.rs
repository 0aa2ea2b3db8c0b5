//! Cross-validation of a [`Learner`] over a labelled sample set.
//!
//! - [`partition`]: leave-one-out, k-fold and stratified k-fold splits.
//! - [`engine`]: fold execution and the [`Learner`] capability.
//! - [`report`]: overall and per-class accuracy.

pub mod engine;
pub mod partition;
pub mod report;

pub use engine::{default_progress_interval, CrossValidator, Learner};
pub use partition::{k_fold, leave_one_out, partition, stratified_k_fold, CvPolicy, Fold, Partition};
pub use report::{fold_class_accuracy, mean_class_accuracy, overall_accuracy, ClassAccuracy, CvReport};
