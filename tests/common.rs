/// Shared helpers for building synthetic experiments.
use eegcv::{Condition, ExperimentData, Recording};
use ndarray::{Array1, Array3};
use std::f32::consts::PI;

#[allow(unused)]
/// Recording whose every sample equals `value`. Shape [n_ch, n_t, n_e].
pub fn constant_recording(
    subject: u32,
    condition: Condition,
    value: f32,
    n_ch: usize,
    n_t: usize,
    n_e: usize,
) -> Recording {
    Recording::new(subject, condition, 128.0, Array3::from_elem((n_ch, n_t, n_e), value)).unwrap()
}

#[allow(unused)]
/// Recording of a pure sine at `freq` Hz (phase shifted per channel/epoch)
/// sampled at `sfreq`. Shape [n_ch, n_t, n_e].
pub fn sine_recording(
    subject: u32,
    condition: Condition,
    freq: f32,
    sfreq: f32,
    n_ch: usize,
    n_t: usize,
    n_e: usize,
) -> Recording {
    let data = Array3::from_shape_fn((n_ch, n_t, n_e), |(c, t, e)| {
        let phase = 0.3 * c as f32 + 0.7 * e as f32;
        (2.0 * PI * freq * t as f32 / sfreq + phase).sin()
    });
    Recording::new(subject, condition, sfreq, data).unwrap()
}

#[allow(unused)]
/// Two recordings of Baseline (value 1) and two of One (value 3),
/// one channel, one 16-sample epoch each, single subject.
pub fn two_class_experiment() -> ExperimentData {
    ExperimentData::from_recordings(vec![
        constant_recording(1, Condition::Baseline, 1.0, 1, 16, 1),
        constant_recording(1, Condition::One, 3.0, 1, 16, 1),
        constant_recording(1, Condition::Baseline, 1.0, 1, 16, 1),
        constant_recording(1, Condition::One, 3.0, 1, 16, 1),
    ])
    .unwrap()
}

#[allow(unused)]
/// `n_subjects` subjects, four conditions each; condition `c` is a sine at
/// `8 + 8c` Hz, 2 channels, 128 Hz, `n_e` one-second epochs.
pub fn sine_experiment(n_subjects: u32, n_e: usize) -> ExperimentData {
    let mut recs = Vec::new();
    for s in 0..n_subjects {
        for c in Condition::ALL {
            let freq = 8.0 + 8.0 * c.index() as f32;
            recs.push(sine_recording(s + 1, c, freq, 128.0, 2, 128, n_e));
        }
    }
    ExperimentData::from_recordings(recs).unwrap()
}

#[allow(unused)]
/// Maximum absolute difference between two 1-D arrays.
pub fn max_abs_diff(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).fold(0.0_f32, f32::max)
}
