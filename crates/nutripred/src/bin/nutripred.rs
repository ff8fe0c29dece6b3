//! nutripred command line: generate a corpus, train a generation, predict.
//!
//! Usage:
//! ```bash
//! # Generate the synthetic corpus and its metadata sidecar
//! nutripred generate --output nutrition_dataset.csv
//!
//! # Train a generation and persist it under models/
//! nutripred train --dataset nutrition_dataset.csv --model-dir models
//!
//! # Predict nutrients for one portion
//! nutripred predict --food apple --portion 150 --category fruit
//!
//! # Smoke-check a persisted generation
//! nutripred test --model-dir models
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use nutripred::data::{Corpus, Nutrient};
use nutripred::synth::{metadata_path, Synthesizer, SynthesizerConfig};
use nutripred::{
    GenerationStore, PredictionEngine, PredictionRequest, TrainerConfig, TrainingReport,
};

/// Fixed battery of smoke predictions; the last entry is a food name no
/// generation has seen, exercising the degraded fallback path.
const SMOKE_BATTERY: [(&str, f32, &str); 5] = [
    ("apple", 150.0, "fruit"),
    ("chicken_breast", 200.0, "protein"),
    ("rice", 100.0, "grain"),
    ("broccoli", 120.0, "vegetable"),
    ("bariis", 250.0, "grain"),
];

#[derive(Parser)]
#[command(
    name = "nutripred",
    about = "Train and serve per-nutrient regression models",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a synthetic training corpus plus metadata sidecar
    Generate {
        /// Corpus CSV path to write
        #[arg(long, default_value = "nutrition_dataset.csv")]
        output: PathBuf,

        /// Number of records to generate
        #[arg(long, default_value_t = 5000)]
        records: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Train a model generation from a corpus CSV
    Train {
        /// Corpus CSV to train on
        #[arg(long, default_value = "nutrition_dataset.csv")]
        dataset: PathBuf,

        /// Directory the generation is persisted under
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,

        /// Trees per nutrient ensemble
        #[arg(long, default_value_t = 100)]
        trees: u32,

        /// Maximum tree depth
        #[arg(long, default_value_t = 10)]
        max_depth: u32,

        /// Random seed for the split and the bootstrap resamples
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Predict nutrient amounts for one food portion
    Predict {
        /// Food name
        #[arg(long)]
        food: String,

        /// Portion size in grams
        #[arg(long)]
        portion: f32,

        /// Food category (defaults to "unknown")
        #[arg(long)]
        category: Option<String>,

        /// Portion unit (defaults to "g")
        #[arg(long)]
        unit: Option<String>,

        /// Directory holding the persisted generation
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,
    },

    /// Run a fixed battery of smoke predictions against a generation
    Test {
        /// Directory holding the persisted generation
        #[arg(long, default_value = "models")]
        model_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Generate {
            output,
            records,
            seed,
        } => run_generate(&output, records, seed),
        Command::Train {
            dataset,
            model_dir,
            trees,
            max_depth,
            seed,
        } => run_train(&dataset, &model_dir, trees, max_depth, seed),
        Command::Predict {
            food,
            portion,
            category,
            unit,
            model_dir,
        } => run_predict(food, portion, category, unit, &model_dir),
        Command::Test { model_dir } => run_test(&model_dir),
    }
}

fn run_generate(output: &Path, records: usize, seed: u64) -> ExitCode {
    let config = match SynthesizerConfig::builder()
        .n_records(records)
        .seed(seed)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            error!("invalid synthesizer configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    match Synthesizer::new(&config).write(output) {
        Ok(metadata) => {
            println!(
                "wrote {} records covering {} foods in {} categories",
                metadata.total_records,
                metadata.total_foods,
                metadata.food_categories.len()
            );
            println!("corpus:   {}", output.display());
            println!("metadata: {}", metadata_path(output).display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("dataset generation failed: {e}");
            ExitCode::FAILURE
        }
    }
}

// Data failures are reported and recovered to an empty metric table; the
// command still exits 0 so callers can distinguish "nothing to train on"
// from real configuration or persistence errors.
fn run_train(dataset: &Path, model_dir: &Path, trees: u32, max_depth: u32, seed: u64) -> ExitCode {
    let config = match TrainerConfig::builder()
        .n_trees(trees)
        .max_depth(max_depth)
        .seed(seed)
        .build()
    {
        Ok(config) => config,
        Err(e) => {
            error!("invalid training configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let corpus = match Corpus::from_csv_path(dataset) {
        Ok(corpus) => corpus,
        Err(e) => {
            error!("could not read corpus {}: {e}", dataset.display());
            print_metrics(&TrainingReport::default());
            return ExitCode::SUCCESS;
        }
    };

    let mut engine = PredictionEngine::new();
    let report = match engine.train(&corpus, &config) {
        Ok(report) => report,
        Err(e) => {
            error!("training aborted: {e}");
            print_metrics(&TrainingReport::default());
            return ExitCode::SUCCESS;
        }
    };
    print_metrics(&report);

    if let Some(generation) = engine.generation() {
        let store = GenerationStore::new(model_dir);
        if let Err(e) = store.save(generation) {
            error!("could not persist generation to {}: {e}", model_dir.display());
            return ExitCode::FAILURE;
        }
        info!("generation saved to {}", model_dir.display());
    }
    ExitCode::SUCCESS
}

fn run_predict(
    food: String,
    portion: f32,
    category: Option<String>,
    unit: Option<String>,
    model_dir: &Path,
) -> ExitCode {
    let engine = load_engine(model_dir);

    let mut request = PredictionRequest::new(food, portion);
    if let Some(category) = category {
        request = request.with_food_category(category);
    }
    if let Some(unit) = unit {
        request = request.with_portion_unit(unit);
    }

    let label = format!(
        "{} ({} {}, {})",
        request.food_name, request.portion_size, request.portion_unit, request.food_category
    );
    print_prediction(&label, &engine.predict(&request));
    ExitCode::SUCCESS
}

fn run_test(model_dir: &Path) -> ExitCode {
    let engine = load_engine(model_dir);
    for (food, portion, category) in SMOKE_BATTERY {
        let request = PredictionRequest::new(food, portion).with_food_category(category);
        let label = format!("{food} ({portion} g, {category})");
        print_prediction(&label, &engine.predict(&request));
    }
    ExitCode::SUCCESS
}

/// Load a generation if one exists; a missing or malformed generation is
/// reported and leaves the engine uninitialized, so predictions come back
/// empty instead of failing.
fn load_engine(model_dir: &Path) -> PredictionEngine {
    let store = GenerationStore::new(model_dir);
    let mut engine = PredictionEngine::new();
    match engine.load(&store) {
        Ok(()) => {}
        Err(e) if e.is_not_found() => {
            warn!("no generation found under {}: {e}", model_dir.display());
        }
        Err(e) => {
            error!("could not load generation from {}: {e}", model_dir.display());
        }
    }
    engine
}

fn print_metrics(report: &TrainingReport) {
    if report.per_nutrient.is_empty() {
        println!("no models trained");
        return;
    }

    println!(
        "trained on {} rows, evaluated on {} held-out rows",
        report.n_train, report.n_eval
    );
    println!("{:<16} {:>12} {:>14} {:>8}", "nutrient", "mae", "mse", "r2");
    for (nutrient, metrics) in &report.per_nutrient {
        println!(
            "{:<16} {:>12.3} {:>14.3} {:>8.3}",
            nutrient.column_name(),
            metrics.mae,
            metrics.mse,
            metrics.r2
        );
    }
}

fn print_prediction(label: &str, result: &BTreeMap<Nutrient, f32>) {
    if result.is_empty() {
        println!("{label}: no prediction available");
        return;
    }

    println!("{label}:");
    for (nutrient, value) in result {
        println!("  {:<16} {:>10.1}", nutrient.column_name(), value);
    }
}
