//! Fixed-length epoching.
//!
//! Recordings are stored as `[C, T, E]`: channels, samples per epoch, epochs.
//! Re-segmenting lays the existing epochs end to end along time and cuts
//! non-overlapping windows of `epoch_samples` samples, dropping any trailing
//! incomplete window.
use ndarray::{concatenate, s, Array2, Array3, Axis};

/// Lay the epochs of `data` ([C, T, E]) end to end → [C, T·E].
pub fn concat_epochs(data: &Array3<f32>) -> Array2<f32> {
    let views: Vec<_> = data.axis_iter(Axis(2)).collect();
    if views.is_empty() {
        return Array2::zeros((data.shape()[0], 0));
    }
    // Every view shares the channel count, so this cannot fail.
    concatenate(Axis(1), &views).unwrap_or_else(|_| Array2::zeros((data.shape()[0], 0)))
}

/// Epoch `data` ([C, T]) into a 3-D array [C, epoch_samples, E].
/// Trailing samples that don't fill a complete epoch are discarded.
pub fn epoch(data: &Array2<f32>, epoch_samples: usize) -> Array3<f32> {
    let (n_ch, n_t) = data.dim();
    let n_epochs = if epoch_samples == 0 { 0 } else { n_t / epoch_samples };

    let mut out = Array3::<f32>::zeros((n_ch, epoch_samples, n_epochs));
    for e in 0..n_epochs {
        let start = e * epoch_samples;
        out.slice_mut(s![.., .., e])
            .assign(&data.slice(s![.., start..start + epoch_samples]));
    }
    out
}

/// Re-cut already epoched `data` ([C, T, E]) into windows of `epoch_samples`.
pub fn resegment(data: &Array3<f32>, epoch_samples: usize) -> Array3<f32> {
    epoch(&concat_epochs(data), epoch_samples)
}
