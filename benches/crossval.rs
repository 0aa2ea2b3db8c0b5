use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use eegcv::{
    extract_spectral_bins, Condition, CrossValidator, ExperimentData, FrequencyBand, KNearest,
    Recording,
};
use ndarray::Array3;

/// One subject, four conditions, 14 channels, 30 one-second epochs at 128 Hz.
fn experiment() -> ExperimentData {
    let recs = Condition::ALL
        .iter()
        .map(|&c| {
            let f = 6.0 + 5.0 * c.index() as f32;
            let data = Array3::from_shape_fn((14, 128, 30), |(ch, t, e)| {
                (std::f32::consts::TAU * f * t as f32 / 128.0 + ch as f32 + e as f32).sin()
            });
            Recording::new(1, c, 128.0, data).unwrap()
        })
        .collect();
    ExperimentData::from_recordings(recs).unwrap()
}

fn bench_spectral_bins(c: &mut Criterion) {
    let exp = experiment();
    c.bench_function("extract_spectral_bins [120 epochs × 14 ch, 32 bins]", |b| {
        b.iter(|| {
            let set = extract_spectral_bins(black_box(&exp), 32, None, FrequencyBand::default()).unwrap();
            black_box(set.len())
        })
    });
}

fn bench_leave_one_out(c: &mut Criterion) {
    let set = extract_spectral_bins(&experiment(), 32, None, FrequencyBand::default()).unwrap();
    c.bench_function("leave_one_out 1-NN [120 × 448]", |b| {
        b.iter(|| {
            let report = CrossValidator::leave_one_out()
                .with_progress_every(usize::MAX)
                .run_features(black_box(&set), &mut KNearest::new(1))
                .unwrap();
            black_box(report.accuracy)
        })
    });
}

fn bench_stratified(c: &mut Criterion) {
    let set = extract_spectral_bins(&experiment(), 32, None, FrequencyBand::default()).unwrap();
    c.bench_function("stratified 5-fold 1-NN [120 × 448]", |b| {
        b.iter(|| {
            let report = CrossValidator::stratified_k_fold(5)
                .run_features(black_box(&set), &mut KNearest::new(1))
                .unwrap();
            black_box(report.accuracy)
        })
    });
}

criterion_group!(benches, bench_spectral_bins, bench_leave_one_out, bench_stratified);
criterion_main!(benches);
