//! Per-feature z-score standardisation.
//!
//! `Standardizer::fit`   — column statistics of a `[N, F]` matrix:
//!   μ_f = mean(x[:, f]),  σ_f = std(x[:, f]) (ddof=0)
//! `Standardizer::apply` — x[:, f] = (x[:, f] - μ_f) / σ_f
//!
//! Columns with σ_f = 0 are left unchanged. During cross-validation the
//! statistics come from the training fold only and are then applied to both
//! folds.
use ndarray::{Array1, Array2, ArrayView2, Axis};

#[derive(Debug, Clone)]
pub struct Standardizer {
    pub mean: Array1<f32>,
    pub std: Array1<f32>,
}

impl Standardizer {
    /// Column means and standard deviations of `samples` ([N, F]).
    pub fn fit(samples: ArrayView2<'_, f32>) -> Self {
        let (n, n_f) = samples.dim();
        let mut mean = Array1::<f32>::zeros(n_f);
        let mut std = Array1::<f32>::zeros(n_f);
        if n == 0 {
            return Self { mean, std };
        }
        for (f, col) in samples.axis_iter(Axis(1)).enumerate() {
            let m = col.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
            let var = col.iter().map(|&v| {
                let d = v as f64 - m; d * d
            }).sum::<f64>() / n as f64;
            mean[f] = m as f32;
            std[f] = var.sqrt() as f32;
        }
        Self { mean, std }
    }

    /// Standardise `samples` ([N, F]) in place with the fitted statistics.
    pub fn apply(&self, samples: &mut Array2<f32>) {
        for (f, mut col) in samples.axis_iter_mut(Axis(1)).enumerate() {
            let (m, s) = (self.mean[f], self.std[f]);
            if s > 0.0 {
                col.mapv_inplace(|v| (v - m) / s);
            }
        }
    }
}

/// Standardise every column of `samples` in place using its own statistics.
/// Returns the statistics used.
pub fn zscore_columns_inplace(samples: &mut Array2<f32>) -> Standardizer {
    let st = Standardizer::fit(samples.view());
    st.apply(samples);
    st
}
