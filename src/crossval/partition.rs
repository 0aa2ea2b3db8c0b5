//! Fold partitioning policies.
//!
//! A [`Partition`] stores only the test index set of each fold; the training
//! set is the complement and is materialised on demand, so leave-one-out over
//! N samples needs O(N) memory rather than O(N²).
//!
//! ```text
//! leave_one_out      N folds, test = {i}
//! k_fold             k contiguous folds, sizes ⌈N/k⌉ (first N mod k) then ⌊N/k⌋
//! stratified_k_fold  per-class pools dealt round-robin over k folds
//! ```
//!
//! With a shuffle seed, indices (or each class pool) are permuted with a
//! seeded `StdRng` before being dealt; test sets are always sorted.
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::error::{Error, Result};

/// Fold-partitioning policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CvPolicy {
    LeaveOneOut,
    KFold { k: usize },
    StratifiedKFold { k: usize },
}

impl CvPolicy {
    pub const DEFAULT_K: usize = 10;
    pub const DEFAULT_STRATIFIED_K: usize = 5;

    /// 10-fold.
    pub fn k_fold() -> Self {
        CvPolicy::KFold { k: Self::DEFAULT_K }
    }

    /// Stratified 5-fold.
    pub fn stratified() -> Self {
        CvPolicy::StratifiedKFold { k: Self::DEFAULT_STRATIFIED_K }
    }
}

impl Default for CvPolicy {
    fn default() -> Self {
        Self::stratified()
    }
}

/// One train/test split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Test sets of every fold over the index range `[0, n)`.
#[derive(Debug, Clone)]
pub struct Partition {
    n: usize,
    tests: Vec<Vec<usize>>,
}

impl Partition {
    fn from_tests(n: usize, mut tests: Vec<Vec<usize>>) -> Self {
        for t in &mut tests {
            t.sort_unstable();
        }
        Self { n, tests }
    }

    /// Number of folds.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn n_samples(&self) -> usize {
        self.n
    }

    pub fn test(&self, fold: usize) -> &[usize] {
        &self.tests[fold]
    }

    /// Complement of the test set of `fold`, ascending.
    pub fn train(&self, fold: usize) -> Vec<usize> {
        let test = &self.tests[fold];
        let mut train = Vec::with_capacity(self.n - test.len());
        let mut t = test.iter().peekable();
        for i in 0..self.n {
            if t.peek() == Some(&&i) {
                t.next();
            } else {
                train.push(i);
            }
        }
        train
    }

    pub fn fold(&self, fold: usize) -> Fold {
        Fold { train: self.train(fold), test: self.tests[fold].clone() }
    }

    pub fn iter(&self) -> impl Iterator<Item = Fold> + '_ {
        (0..self.len()).map(|i| self.fold(i))
    }
}

fn check_k(n: usize, k: usize) -> Result<()> {
    if k < 2 {
        return Err(Error::InvalidArgument(format!("k must be at least 2, got {k}")));
    }
    if k > n {
        return Err(Error::InvalidArgument(format!(
            "cannot split {n} samples into {k} folds"
        )));
    }
    Ok(())
}

/// N folds, each testing a single index.
pub fn leave_one_out(n: usize) -> Partition {
    Partition::from_tests(n, (0..n).map(|i| vec![i]).collect())
}

/// `k` folds of size `⌈n/k⌉` or `⌊n/k⌋`, contiguous unless `seed` is given.
pub fn k_fold(n: usize, k: usize, seed: Option<u64>) -> Result<Partition> {
    check_k(n, k)?;
    let mut order: Vec<usize> = (0..n).collect();
    if let Some(seed) = seed {
        order.shuffle(&mut StdRng::seed_from_u64(seed));
    }

    let (base, extra) = (n / k, n % k);
    let mut tests = Vec::with_capacity(k);
    let mut start = 0;
    for i in 0..k {
        let size = base + usize::from(i < extra);
        tests.push(order[start..start + size].to_vec());
        start += size;
    }
    Ok(Partition::from_tests(n, tests))
}

/// `k` folds whose class proportions follow those of `labels`.
///
/// Indices are grouped into one pool per class (in [`Condition::ALL`]
/// order), the pools are laid end to end and position `p` goes to fold
/// `p mod k`. Each class therefore lands in every fold either
/// `⌊count/k⌋` or `⌈count/k⌉` times.
pub fn stratified_k_fold(labels: &[Condition], k: usize, seed: Option<u64>) -> Result<Partition> {
    let n = labels.len();
    check_k(n, k)?;

    let mut rng = seed.map(StdRng::seed_from_u64);
    let mut dealt: Vec<usize> = Vec::with_capacity(n);
    for class in Condition::ALL {
        let mut pool: Vec<usize> = (0..n).filter(|&i| labels[i] == class).collect();
        if let Some(rng) = rng.as_mut() {
            pool.shuffle(rng);
        }
        dealt.extend(pool);
    }

    let mut tests = vec![Vec::with_capacity(n / k + 1); k];
    for (pos, idx) in dealt.into_iter().enumerate() {
        tests[pos % k].push(idx);
    }
    Ok(Partition::from_tests(n, tests))
}

/// Build the partition for `policy` over `labels`.
pub fn partition(policy: CvPolicy, labels: &[Condition], seed: Option<u64>) -> Result<Partition> {
    match policy {
        CvPolicy::LeaveOneOut => Ok(leave_one_out(labels.len())),
        CvPolicy::KFold { k } => k_fold(labels.len(), k, seed),
        CvPolicy::StratifiedKFold { k } => stratified_k_fold(labels, k, seed),
    }
}
