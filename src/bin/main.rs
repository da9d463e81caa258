//! RPCF Command Line Interface
//!
//! A command-line interface for training, evaluating, and using cone models
//! with LibSVM and CSV data formats.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info, warn};
use rpcf::api::RPCF;
use rpcf::data::LoadOptions;
use rpcf::core::{
    Dataset, EmptyBPolicy, InMemoryDataset, RPCFError, Result, Sample, SolverConfig,
    TrainingConfig, VnsConfig,
};
use rpcf::grid_search::GridSearch;
use rpcf::persistence::SerializableModel;
use rpcf::selector::SelectionStrategy;
use rpcf::solver::DualCoordinateDescent;
use rpcf::utils::labels::LabelMap;
use rpcf::utils::split::{train_validation_split, DEFAULT_VALIDATION_FRACTION};
use rpcf::{CSVDataset, LibSVMDataset};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "rpcf")]
#[command(about = "Revised Polyhedral Conic Function classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new cone model
    Train(TrainArgs),
    /// Make predictions using a trained model
    Predict(PredictArgs),
    /// Evaluate a model on test data
    Evaluate(EvaluateArgs),
    /// Display model information
    Info(InfoArgs),
    /// Search C and lambda on a validation split
    GridSearch(GridSearchArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliStrategy {
    /// Uniform random center selection
    #[value(name = "random")]
    Random,
    /// Variable neighborhood search
    #[value(name = "vns")]
    Vns,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliEmptyB {
    /// Drop the positive-class term once no positives remain
    #[value(name = "omit")]
    Omit,
    /// Stop the fit once no positives remain
    #[value(name = "fail")]
    Fail,
}

impl From<CliEmptyB> for EmptyBPolicy {
    fn from(cli: CliEmptyB) -> Self {
        match cli {
            CliEmptyB::Omit => EmptyBPolicy::Omit,
            CliEmptyB::Fail => EmptyBPolicy::Fail,
        }
    }
}

/// Selection and solver options shared by `train` and `grid-search`
#[derive(Args, Clone)]
struct FitOptions {
    /// Center selection strategy
    #[arg(long, default_value = "random")]
    strategy: CliStrategy,

    /// VNS: neighbors kept per point in the k-NN index
    #[arg(long, default_value = "10")]
    k_neighbors: usize,

    /// VNS: maximum search rounds
    #[arg(long, default_value = "5")]
    max_vns_iter: usize,

    /// VNS: neighbors examined per round
    #[arg(long, default_value = "5")]
    max_neighbors_check: usize,

    /// Behaviour when no positive samples remain active
    #[arg(long, default_value = "omit")]
    empty_b: CliEmptyB,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Solver convergence tolerance
    #[arg(short, long, default_value = "1e-6")]
    epsilon: f64,

    /// Solver iteration cap
    #[arg(short, long, default_value = "100000")]
    max_iterations: usize,

    /// Per-solve time limit in seconds
    #[arg(long)]
    time_limit: Option<f64>,
}

impl FitOptions {
    fn strategy(&self) -> SelectionStrategy {
        match self.strategy {
            CliStrategy::Random => SelectionStrategy::Random,
            CliStrategy::Vns => SelectionStrategy::Vns(VnsConfig {
                k_neighbors: self.k_neighbors,
                max_vns_iter: self.max_vns_iter,
                max_neighbors_check: self.max_neighbors_check,
                ..VnsConfig::default()
            }),
        }
    }

    fn solver_config(&self) -> Result<SolverConfig> {
        let time_limit = match self.time_limit {
            Some(secs) if secs.is_finite() && secs >= 0.0 => Some(Duration::from_secs_f64(secs)),
            Some(secs) => {
                return Err(RPCFError::InvalidParameter(format!(
                    "Time limit must be a non-negative number of seconds, got {secs}"
                )))
            }
            None => None,
        };
        Ok(SolverConfig {
            epsilon: self.epsilon,
            max_iterations: self.max_iterations,
            time_limit,
        })
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Training data file (LibSVM or CSV format)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Positive-class penalty C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Regularization weight lambda
    #[arg(short, long, default_value = "0.01")]
    lambda: f64,

    #[command(flatten)]
    fit: FitOptions,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Input data file
    #[arg(long)]
    data: PathBuf,

    /// Output predictions file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Show decision values
    #[arg(long)]
    confidence: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Test data file
    #[arg(long)]
    data: PathBuf,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Show detailed metrics
    #[arg(long)]
    detailed: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,

    /// List every cone
    #[arg(long)]
    cones: bool,
}

#[derive(Args)]
struct GridSearchArgs {
    /// Training data file
    #[arg(long)]
    data: PathBuf,

    /// Separate validation file; a split of the training data is used otherwise
    #[arg(long)]
    validation: Option<PathBuf>,

    /// Data format: auto, libsvm, or csv
    #[arg(short, long, default_value = "auto")]
    format: String,

    /// Share of the training data held out when no validation file is given
    #[arg(long, default_value_t = DEFAULT_VALIDATION_FRACTION)]
    validation_fraction: f64,

    /// Candidate C values
    #[arg(long, value_delimiter = ',', default_value = "0.1,1,10,100")]
    c_values: Vec<f64>,

    /// Candidate lambda values
    #[arg(long, value_delimiter = ',', default_value = "0.01,0.1,1")]
    lambda_values: Vec<f64>,

    /// Train on the full data with the best parameters and save the model here
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    fit: FitOptions,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
        Commands::GridSearch(args) => grid_search_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn builder(c: f64, lambda: f64, fit: &FitOptions) -> Result<RPCF> {
    let mut rpcf = RPCF::new()
        .with_c(c)
        .with_lambda(lambda)
        .with_empty_b_policy(fit.empty_b.into())
        .with_strategy(fit.strategy())
        .with_solver_config(fit.solver_config()?);
    if let Some(seed) = fit.seed {
        rpcf = rpcf.with_seed(seed);
    }
    Ok(rpcf)
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Training cone model...");
    info!("Data file: {:?}", args.data);
    info!(
        "Parameters: C={}, lambda={}, strategy={:?}",
        args.c, args.lambda, args.fit.strategy
    );

    let (dataset, label_map) = load_dataset(&args.data, &args.format, LoadOptions::default())?;
    info!(
        "Loaded {} samples with {} dimensions",
        dataset.len(),
        dataset.dim()
    );

    let model = builder(args.c, args.lambda, &args.fit)?
        .train(&dataset)?
        .with_label_map(label_map);

    if let Some(report) = model.report() {
        info!(
            "Training finished after {} iterations ({:?})",
            report.iterations(),
            report.termination
        );
        if !report.is_complete() {
            warn!(
                "{} negative samples remain uncovered",
                report.remaining_a.len()
            );
        }
    }
    info!("Cones: {}", model.n_cones());

    let serializable = SerializableModel::from_trained_model(&model);
    serializable.save_to_file(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    // Quick evaluation on training data
    let accuracy = model.evaluate(&dataset)?;
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading prediction data from: {:?}", args.data);
    let (dataset, _) = load_dataset(&args.data, &args.format, model.load_options())?;

    info!(
        "Making predictions using model with {} cones",
        serializable_model.metadata.n_cones
    );
    let predictions = model.predict_dataset(&dataset)?;

    if let Some(output_path) = args.output {
        use std::fs::File;
        use std::io::{BufWriter, Write};

        let file = File::create(&output_path).map_err(RPCFError::IoError)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "# Predictions for {} samples", predictions.len())?;
        writeln!(
            writer,
            "# Format: sample_index predicted_label{}",
            if args.confidence { " decision_value" } else { "" }
        )?;

        for (i, pred) in predictions.iter().enumerate() {
            if args.confidence {
                writeln!(writer, "{} {:.0} {:.6}", i, pred.label, pred.decision_value)?;
            } else {
                writeln!(writer, "{} {:.0}", i, pred.label)?;
            }
        }

        info!("Predictions saved to: {output_path:?}");
    } else {
        println!("# Predictions for {} samples", predictions.len());
        println!(
            "# Format: sample_index predicted_label{}",
            if args.confidence { " decision_value" } else { "" }
        );

        for (i, pred) in predictions.iter().enumerate() {
            if args.confidence {
                println!("{} {:.0} {:.6}", i, pred.label, pred.decision_value);
            } else {
                println!("{} {:.0}", i, pred.label);
            }
        }
    }

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;
    let model = serializable_model.to_trained_model()?;

    info!("Loading test data from: {:?}", args.data);
    let (dataset, _) = load_dataset(&args.data, &args.format, model.load_options())?;

    info!(
        "Evaluating model with {} cones",
        serializable_model.metadata.n_cones
    );
    let metrics = model.evaluate_detailed(&dataset)?;

    println!("=== Model Evaluation ===");
    serializable_model.print_summary();

    println!("\nTest Results:");
    println!("  Accuracy: {:.2}%", metrics.accuracy() * 100.0);

    if args.detailed {
        println!("\nDetailed Metrics:");
        println!("  True Positives:  {}", metrics.true_positives);
        println!("  True Negatives:  {}", metrics.true_negatives);
        println!("  False Positives: {}", metrics.false_positives);
        println!("  False Negatives: {}", metrics.false_negatives);
        println!("  Undecided:       {}", metrics.undecided);
        println!("  Precision:       {:.4}", metrics.precision());
        println!("  Recall:          {:.4}", metrics.recall());
        println!("  F1 Score:        {:.4}", metrics.f1_score());
        println!("  Specificity:     {:.4}", metrics.specificity());
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let serializable_model = SerializableModel::load_from_file(&args.model)?;

    serializable_model.print_summary();

    if args.cones {
        println!("\nCone Details:");
        serializable_model.print_cones();
    } else if let Some(first) = serializable_model.cones.first() {
        println!("\nFirst cone:");
        println!("  xi: {:.6}", first.xi);
        println!("  gamma: {:.6}", first.gamma);
        if serializable_model.cones.len() > 1 {
            println!(
                "  ... ({} more, use --cones to list all)",
                serializable_model.cones.len() - 1
            );
        }
    }

    Ok(())
}

fn grid_search_command(args: GridSearchArgs) -> Result<()> {
    let (dataset, label_map) = load_dataset(&args.data, &args.format, LoadOptions::default())?;
    let (train, validation): (Vec<Sample>, Vec<Sample>) = match &args.validation {
        Some(path) => {
            let options = LoadOptions::default()
                .with_min_dim(dataset.dim())
                .with_label_map(label_map);
            let (validation, _) = load_dataset(path, &args.format, options)?;
            (dataset.as_slice().to_vec(), validation.as_slice().to_vec())
        }
        None => train_validation_split(
            dataset.as_slice(),
            args.validation_fraction,
            args.fit.seed.unwrap_or(0),
        )?,
    };
    info!(
        "Grid search with {} training and {} validation samples",
        train.len(),
        validation.len()
    );

    let base = TrainingConfig {
        seed: args.fit.seed,
        empty_b: args.fit.empty_b.into(),
        ..TrainingConfig::default()
    };
    let solver = DualCoordinateDescent::new(args.fit.solver_config()?);
    let result = GridSearch::new()
        .with_c_values(args.c_values.clone())
        .with_lambda_values(args.lambda_values.clone())
        .with_strategy(args.fit.strategy())
        .with_base_config(base)
        .run(&solver, &train, &validation);

    println!("=== Grid Search Results ===");
    for point in &result.evaluated {
        match point.accuracy {
            Some(acc) => println!(
                "  C={:<8} lambda={:<8} accuracy={:.4} cones={}",
                point.c, point.lambda, acc, point.n_cones
            ),
            None => println!(
                "  C={:<8} lambda={:<8} failed: {}",
                point.c,
                point.lambda,
                point.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
    println!(
        "Best: C={} lambda={} (accuracy {:.4})",
        result.c, result.lambda, result.accuracy
    );
    if !result.found() {
        warn!("Every combination failed, reporting default parameters");
    }

    if let Some(output) = &args.output {
        let model = builder(result.c, result.lambda, &args.fit)?
            .train(&dataset)?
            .with_label_map(label_map);
        SerializableModel::from_trained_model(&model).save_to_file(output)?;
        info!("Model saved to: {output:?}");
    }

    Ok(())
}

/// Load a data file, returning its samples and the label mapping applied
fn load_dataset(
    path: &Path,
    format: &str,
    options: LoadOptions,
) -> Result<(InMemoryDataset, LabelMap)> {
    let format = if format == "auto" {
        detect_format(path)
    } else {
        format.to_string()
    };

    info!("Loading dataset as {format} format");

    let (samples, label_map) = match format.as_str() {
        "libsvm" => {
            let dataset = LibSVMDataset::from_file_with_options(path, options)?;
            (dataset.samples(), dataset.label_map())
        }
        "csv" => {
            let dataset = CSVDataset::from_file_with_options(path, options)?;
            (dataset.samples(), dataset.label_map())
        }
        _ => {
            return Err(RPCFError::InvalidParameter(format!(
                "Unsupported format: {format}. Use 'libsvm' or 'csv'"
            )))
        }
    };
    Ok((InMemoryDataset::new(samples), label_map))
}

fn detect_format(path: &Path) -> String {
    if let Some(ext) = path.extension() {
        match ext.to_str() {
            Some("csv") => "csv".to_string(),
            Some("libsvm") | Some("svm") => "libsvm".to_string(),
            _ => {
                warn!("Unknown file extension, assuming LibSVM format");
                "libsvm".to_string()
            }
        }
    } else {
        warn!("No file extension, assuming LibSVM format");
        "libsvm".to_string()
    }
}
