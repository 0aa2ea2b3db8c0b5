mod common;
use common::{constant_recording, sine_recording, two_class_experiment};
use eegcv::features::{extract_rms, extract_spectral_bins, FrequencyBand, SubjectFilter};
use eegcv::spectrum::{bin, solve_spectrum, BinMethod};
use eegcv::{Condition, Error, ExperimentData, Recording};
use ndarray::{array, s, Array2, Array3};

#[test]
fn rms_end_to_end_labels_and_shape() {
    let exp = two_class_experiment();
    let set = extract_rms(&exp, None).unwrap();
    assert_eq!(set.samples.shape(), &[4, 1]);
    assert_eq!(
        set.labels,
        vec![Condition::Baseline, Condition::Baseline, Condition::One, Condition::One]
    );
    // 16 samples of 1.0 → sqrt(16) = 4; of 3.0 → 12.
    approx::assert_abs_diff_eq!(set.samples[[0, 0]], 4.0, epsilon = 1e-5_f32);
    approx::assert_abs_diff_eq!(set.samples[[3, 0]], 12.0, epsilon = 1e-5_f32);
}

#[test]
fn rms_three_four_five() {
    let rec = Recording::continuous(1, Condition::Two, 2.0, array![[3.0_f32, 4.0]]).unwrap();
    let exp = ExperimentData::from_recordings(vec![rec]).unwrap();
    let set = extract_rms(&exp, None).unwrap();
    approx::assert_abs_diff_eq!(set.samples[[0, 0]], 5.0, epsilon = 1e-6_f32);
}

#[test]
fn order_is_subject_condition_epoch() {
    // Value of every sample encodes (subject, condition, epoch).
    let make = |subject: u32, cond: Condition| {
        let data = Array3::from_shape_fn((1, 4, 2), |(_, _, e)| {
            (subject * 100 + cond.index() as u32 * 10 + e as u32) as f32
        });
        Recording::new(subject, cond, 4.0, data).unwrap()
    };
    let exp = ExperimentData::from_recordings(vec![
        make(2, Condition::Three),
        make(2, Condition::Baseline),
        make(5, Condition::One),
    ])
    .unwrap();
    let set = extract_rms(&exp, None).unwrap();
    // rms of four equal samples v is 2v.
    let codes: Vec<u32> = set.samples.iter().map(|&v| (v / 2.0).round() as u32).collect();
    assert_eq!(codes, vec![200, 201, 230, 231, 510, 511]);
    assert_eq!(
        set.labels,
        vec![
            Condition::Baseline,
            Condition::Baseline,
            Condition::Three,
            Condition::Three,
            Condition::One,
            Condition::One
        ]
    );
}

#[test]
fn subject_filter_by_id_and_index() {
    let exp = ExperimentData::from_recordings(vec![
        constant_recording(10, Condition::Baseline, 1.0, 2, 8, 3),
        constant_recording(20, Condition::One, 1.0, 2, 8, 2),
    ])
    .unwrap();
    assert_eq!(extract_rms(&exp, Some(SubjectFilter::Id(20))).unwrap().len(), 2);
    assert_eq!(extract_rms(&exp, Some(SubjectFilter::Index(0))).unwrap().len(), 3);
    assert_eq!(extract_rms(&exp, None).unwrap().len(), 5);
}

#[test]
fn spectral_trims_ten_values_to_nine_before_three_bins() {
    // 18 samples → spectrum of 10 values.
    let signal = Array2::from_shape_fn((1, 18), |(_, t)| ((t * 7) % 5) as f32);
    let rec = Recording::continuous(1, Condition::One, 18.0, signal.clone()).unwrap();
    let exp = ExperimentData::from_recordings(vec![rec]).unwrap();

    let set = extract_spectral_bins(&exp, 3, None, FrequencyBand::default()).unwrap();
    assert_eq!(set.samples.shape(), &[1, 1, 3]);

    let (spec, _) = solve_spectrum(signal.row(0), 18.0).unwrap();
    assert_eq!(spec.len(), 10);
    let expected = bin(spec.slice(s![..9]), 3, BinMethod::Sum).unwrap();
    for b in 0..3 {
        approx::assert_abs_diff_eq!(set.samples[[0, 0, b]], expected[b], epsilon = 1e-4_f32);
    }
}

#[test]
fn spectral_peak_lands_in_expected_bin() {
    // 16 Hz sine, 128 Hz, 128 samples → 65 spectrum values, trimmed to 64,
    // 8 bins of width 8 → index 16 is in bin 2.
    let rec = sine_recording(1, Condition::Two, 16.0, 128.0, 1, 128, 1);
    let exp = ExperimentData::from_recordings(vec![rec]).unwrap();
    let set = extract_spectral_bins(&exp, 8, None, FrequencyBand::default()).unwrap();
    let peak = (0..8)
        .max_by(|&a, &b| set.samples[[0, 0, a]].total_cmp(&set.samples[[0, 0, b]]))
        .unwrap();
    assert_eq!(peak, 2);
}

#[test]
fn band_excludes_out_of_range_power() {
    let rec = sine_recording(1, Condition::Two, 8.0, 128.0, 1, 128, 1);
    let exp = ExperimentData::from_recordings(vec![rec]).unwrap();

    let full = extract_spectral_bins(&exp, 4, None, FrequencyBand::default()).unwrap();
    let high = extract_spectral_bins(&exp, 4, None, FrequencyBand::new(Some(16.0), None)).unwrap();
    let full_total: f32 = full.samples.iter().sum();
    let high_total: f32 = high.samples.iter().sum();
    assert!(full_total > 60.0, "full spectrum total {full_total}");
    assert!(high_total < 1.0, "8 Hz peak leaked into 16+ Hz band: {high_total}");
}

#[test]
fn band_narrower_than_bin_count_is_rejected() {
    let rec = sine_recording(1, Condition::Two, 8.0, 128.0, 1, 128, 1);
    let exp = ExperimentData::from_recordings(vec![rec]).unwrap();
    let narrow = FrequencyBand::new(Some(10.0), Some(11.0));
    let err = extract_spectral_bins(&exp, 4, None, narrow).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn zero_bins_is_invalid_argument() {
    let exp = two_class_experiment();
    let err = extract_spectral_bins(&exp, 0, None, FrequencyBand::default()).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}

#[test]
fn extraction_is_deterministic() {
    let exp = common::sine_experiment(2, 3);
    let a = extract_spectral_bins(&exp, 16, None, FrequencyBand::default()).unwrap();
    let b = extract_spectral_bins(&exp, 16, None, FrequencyBand::default()).unwrap();
    assert_eq!(a.samples, b.samples);
    assert_eq!(a.labels, b.labels);
}

#[test]
fn flatten_keeps_row_alignment() {
    let exp = common::sine_experiment(1, 2);
    let set = extract_spectral_bins(&exp, 4, None, FrequencyBand::default()).unwrap();
    let flat = set.flatten();
    assert_eq!(flat.shape(), &[8, 8]);
    for i in 0..set.len() {
        for c in 0..2 {
            for b in 0..4 {
                assert_eq!(flat[[i, c * 4 + b]], set.samples[[i, c, b]]);
            }
        }
    }
}
