//! Small reference learners.
//!
//! These are baselines for exercising the cross-validation engine, not
//! serious classifiers; anything implementing [`Learner`] can replace them.
use anyhow::{bail, ensure};
use ndarray::{Array2, ArrayView1, ArrayView2};

use crate::condition::Condition;
use crate::crossval::Learner;

fn majority(counts: &[usize; Condition::COUNT]) -> Condition {
    // Ties go to the earliest condition.
    let mut best = 0;
    for c in 1..Condition::COUNT {
        if counts[c] > counts[best] {
            best = c;
        }
    }
    Condition::ALL[best]
}

/// Predicts the most frequent training label for every sample.
#[derive(Debug, Clone, Default)]
pub struct MajorityClass {
    label: Option<Condition>,
}

impl Learner for MajorityClass {
    fn fit(&mut self, _samples: ArrayView2<'_, f32>, labels: &[Condition]) -> anyhow::Result<()> {
        ensure!(!labels.is_empty(), "cannot fit on an empty training set");
        let mut counts = [0usize; Condition::COUNT];
        for l in labels {
            counts[l.index()] += 1;
        }
        self.label = Some(majority(&counts));
        Ok(())
    }

    fn predict(&self, samples: ArrayView2<'_, f32>) -> anyhow::Result<Vec<Condition>> {
        let Some(label) = self.label else {
            bail!("predict called before fit");
        };
        Ok(vec![label; samples.nrows()])
    }
}

/// k-nearest-neighbour vote under Euclidean distance.
///
/// Each test row takes the majority label of its `k` nearest training rows;
/// ties between labels go to the label of the nearest tied neighbour.
#[derive(Debug, Clone)]
pub struct KNearest {
    pub k: usize,
    train: Option<(Array2<f32>, Vec<Condition>)>,
}

impl KNearest {
    pub fn new(k: usize) -> Self {
        Self { k, train: None }
    }
}

impl Default for KNearest {
    fn default() -> Self {
        Self::new(1)
    }
}

fn sq_dist(a: ArrayView1<'_, f32>, b: ArrayView1<'_, f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl Learner for KNearest {
    fn fit(&mut self, samples: ArrayView2<'_, f32>, labels: &[Condition]) -> anyhow::Result<()> {
        ensure!(self.k > 0, "k must be positive");
        ensure!(!labels.is_empty(), "cannot fit on an empty training set");
        ensure!(
            samples.nrows() == labels.len(),
            "{} training rows but {} labels",
            samples.nrows(),
            labels.len()
        );
        self.train = Some((samples.to_owned(), labels.to_vec()));
        Ok(())
    }

    fn predict(&self, samples: ArrayView2<'_, f32>) -> anyhow::Result<Vec<Condition>> {
        let Some((train_x, train_y)) = &self.train else {
            bail!("predict called before fit");
        };
        ensure!(
            samples.ncols() == train_x.ncols(),
            "{} features but model was fit on {}",
            samples.ncols(),
            train_x.ncols()
        );

        let k = self.k.min(train_y.len());
        let mut out = Vec::with_capacity(samples.nrows());
        for row in samples.rows() {
            let mut dist: Vec<(f32, usize)> = train_x
                .rows()
                .into_iter()
                .enumerate()
                .map(|(i, t)| (sq_dist(row, t), i))
                .collect();
            dist.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let mut counts = [0usize; Condition::COUNT];
            for &(_, i) in &dist[..k] {
                counts[train_y[i].index()] += 1;
            }
            let top = counts.iter().copied().max().unwrap_or(0);
            // Nearest neighbour among the labels sharing the top count.
            let label = dist[..k]
                .iter()
                .map(|&(_, i)| train_y[i])
                .find(|l| counts[l.index()] == top)
                .unwrap_or_else(|| majority(&counts));
            out.push(label);
        }
        Ok(out)
    }
}
