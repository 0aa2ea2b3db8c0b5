use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use eegcv::{
    evaluate, fraction_above, io::{load_experiment, write_summary},
    Condition, CvPolicy, EvalConfig, FeatureKind, KNearest, Learner, MajorityClass,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Loo,
    Kfold,
    Stratified,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LearnerArg {
    Knn,
    Majority,
}

#[derive(Parser)]
#[command(name = "cross_validate", about = "Per-subject cross-validated EEG task classification")]
struct Args {
    /// Experiment safetensors file (rec_N tensors + recordings metadata)
    #[arg(long)]
    input: PathBuf,

    /// Summary safetensors output path
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON configuration; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Spectral bins per channel
    #[arg(long)]
    bins: Option<usize>,

    /// Fold-partitioning policy
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Number of folds for kfold / stratified
    #[arg(long)]
    k: Option<usize>,

    /// Classifier used in every fold
    #[arg(long, value_enum, default_value = "knn")]
    learner: LearnerArg,

    /// Neighbours for the knn learner
    #[arg(long, default_value_t = 1)]
    neighbours: usize,

    /// Use RMS features instead of binned spectra
    #[arg(long)]
    rms: bool,

    /// Z-score features with training-fold statistics
    #[arg(long)]
    standardize: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => EvalConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EvalConfig::default(),
    };
    if let Some(bins) = args.bins {
        cfg.num_bins = bins;
    }
    if args.rms {
        cfg.features = FeatureKind::Rms;
    }
    if args.standardize {
        cfg.standardize = true;
    }
    if let Some(policy) = args.policy {
        cfg.policy = match policy {
            PolicyArg::Loo => CvPolicy::LeaveOneOut,
            PolicyArg::Kfold => CvPolicy::KFold { k: args.k.unwrap_or(CvPolicy::DEFAULT_K) },
            PolicyArg::Stratified => CvPolicy::StratifiedKFold {
                k: args.k.unwrap_or(CvPolicy::DEFAULT_STRATIFIED_K),
            },
        };
    }

    let experiment = load_experiment(&args.input)
        .with_context(|| format!("loading {}", args.input.display()))?;
    println!("Loaded {} subjects, {} recordings",
        experiment.n_subjects(), experiment.recordings().count());

    let mut learner: Box<dyn Learner> = match args.learner {
        LearnerArg::Knn => Box::new(KNearest::new(args.neighbours)),
        LearnerArg::Majority => Box::new(MajorityClass::default()),
    };
    let summary = evaluate(&experiment, &cfg, &mut learner)?;

    for (i, id) in summary.subjects.iter().enumerate() {
        let classes: Vec<String> = Condition::ALL.iter()
            .map(|c| format!("{c}={:.3}", summary.per_class[[i, c.index()]]))
            .collect();
        println!("subject {id:>3}  accuracy {:.3}  {}", summary.overall[i], classes.join(" "));
    }
    println!("mean accuracy {:.3}", summary.mean_accuracy());
    println!("per-class accuracies above 0.5: {:.3}",
        fraction_above(summary.per_class.iter(), 0.5));

    if let Some(out) = &args.output {
        write_summary(&summary, out)?;
        println!("Written → {}", out.display());
    }
    Ok(())
}
