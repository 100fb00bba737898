use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tally_finance::{
    Classifier, ClassifierStrategy, Ledger, Pipeline, SheetPlan, TrainedModel, load_labeled_dir,
    write_csv,
};
use tally_ingest::{Extractor, split_pages};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod prompt;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "tally",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")"),
    about = "Turn bank statement text into a categorized ledger"
)]
struct Cli {
    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and categorize transactions from statement text files
    Process {
        /// Text dumps of statements, pages separated by form feeds
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Override the configured classifier
        #[arg(long, value_enum)]
        classifier: Option<StrategyArg>,

        /// Retrain the model from the labeled data before processing
        #[arg(long)]
        retrain: bool,

        /// Write <stem>_processed.csv next to each input
        #[arg(long)]
        csv: bool,

        /// Write <stem>_sheet.json (sheet title + row batches) next to each input
        #[arg(long)]
        sheet_plan: bool,

        /// Statement year, to print full dates instead of MM/DD
        #[arg(long)]
        year: Option<i32>,
    },

    /// Train the description classifier from labeled CSVs
    Train {
        /// Directory of labeled CSVs (default: from config)
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Where to write the model (default: from config)
        #[arg(long)]
        model: Option<PathBuf>,
    },

    /// Categorize a single description
    Classify {
        description: String,

        #[arg(long, value_enum)]
        classifier: Option<StrategyArg>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config to ~/.tally/config.toml
    Init,
    /// Print the effective configuration
    Show,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum StrategyArg {
    Rules,
    Trained,
}

impl From<StrategyArg> for ClassifierStrategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Rules => ClassifierStrategy::Rules,
            StrategyArg::Trained => ClassifierStrategy::Trained,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Process {
            inputs,
            classifier,
            retrain,
            csv,
            sheet_plan,
            year,
        } => {
            let strategy = classifier.map(Into::into).unwrap_or(cfg.classifier.strategy);
            let classifier = acquire_classifier(&cfg, strategy, retrain, prompt::confirm)?;
            let extractor = Extractor::new(&cfg.extraction).context("building extractor")?;
            let pipeline = Pipeline::new(extractor, classifier);

            let mut failed = 0;
            for input in &inputs {
                // One bad document must not stop the others
                match process_document(&pipeline, &cfg, input, csv, sheet_plan, year) {
                    Ok(()) => {}
                    Err(e) => {
                        error!("{}: {e:#}", input.display());
                        failed += 1;
                    }
                }
            }
            if failed > 0 {
                bail!("{} of {} documents failed", failed, inputs.len());
            }
        }

        Command::Train { data_dir, model } => {
            train_model(&cfg, data_dir, model)?;
        }

        Command::Classify {
            description,
            classifier,
        } => {
            let strategy = classifier.map(Into::into).unwrap_or(cfg.classifier.strategy);
            let classifier = acquire_classifier(&cfg, strategy, false, prompt::confirm)?;
            println!("{}", classifier.classify(&description));
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("{}", s.trim_end());
            }
        },
    }

    Ok(())
}

/// Rules need nothing on disk; the trained model must exist or be trained now.
/// `confirm` asks the operator whether to train a missing model.
fn acquire_classifier(
    cfg: &Config,
    strategy: ClassifierStrategy,
    retrain: bool,
    confirm: impl FnOnce(&str) -> Result<bool>,
) -> Result<Box<dyn Classifier>> {
    let classifier: Box<dyn Classifier> = match strategy {
        ClassifierStrategy::Rules => Box::new(cfg.rule_engine()),
        ClassifierStrategy::Trained => {
            let model_path = cfg.model_path()?;
            let train_now = if retrain {
                true
            } else if !model_path.exists() {
                confirm(&format!(
                    "No trained model at {}. Train one now from {}?",
                    model_path.display(),
                    cfg.training_dir()?.display()
                ))?
            } else {
                false
            };
            if train_now {
                train_model(cfg, None, Some(model_path.clone()))?;
            }
            strategy
                .load(cfg.rule_engine(), &model_path)
                .with_context(|| format!("loading {:?} classifier", strategy))?
        }
    };
    info!(classifier = classifier.name(), "classifier ready");
    Ok(classifier)
}

fn train_model(cfg: &Config, data_dir: Option<PathBuf>, model: Option<PathBuf>) -> Result<()> {
    let data_dir = match data_dir {
        Some(d) => d,
        None => cfg.training_dir()?,
    };
    let model_path = match model {
        Some(m) => m,
        None => cfg.model_path()?,
    };

    let pairs = load_labeled_dir(&data_dir)
        .with_context(|| format!("loading labeled data from {}", data_dir.display()))?;
    let report = TrainedModel::train(&pairs, &cfg.train_options())
        .with_context(|| format!("training on {}", data_dir.display()))?;
    report
        .model
        .save(&model_path)
        .with_context(|| format!("saving {}", model_path.display()))?;

    match report.accuracy {
        Some(acc) => println!(
            "Model trained on {} examples and saved to {} (hold-out accuracy: {:.2}% on {})",
            report.train_size,
            model_path.display(),
            acc * 100.0,
            report.test_size
        ),
        None => println!(
            "Model trained on {} examples and saved to {} (no hold-out)",
            report.train_size,
            model_path.display()
        ),
    }
    Ok(())
}

fn process_document<C: Classifier>(
    pipeline: &Pipeline<C>,
    cfg: &Config,
    input: &Path,
    csv: bool,
    sheet_plan: bool,
    year: Option<i32>,
) -> Result<()> {
    let text = fs::read_to_string(input).with_context(|| format!("read {}", input.display()))?;
    let pages = split_pages(&text);
    let ledger = pipeline
        .run(&pages)
        .with_context(|| format!("processing {}", input.display()))?;

    println!(
        "\n{} ({} pages, {} transactions, {} reclassified)\n",
        input.display(),
        pages.len(),
        ledger.len(),
        ledger.reclassified
    );
    print_ledger(&ledger, year);

    if csv {
        let out = sibling(input, "_processed.csv");
        let file = fs::File::create(&out).with_context(|| format!("create {}", out.display()))?;
        write_csv(&ledger, file).with_context(|| format!("write {}", out.display()))?;
        println!("\nWrote {}", out.display());
    }

    if sheet_plan {
        let out = sibling(input, "_sheet.json");
        let plan = SheetPlan::new(
            &ledger,
            chrono::Local::now().naive_local(),
            cfg.output.batch_size,
        );
        let json = serde_json::to_string_pretty(&plan)?;
        fs::write(&out, json).with_context(|| format!("write {}", out.display()))?;
        println!("Wrote {} (sheet {})", out.display(), plan.title);
    }

    Ok(())
}

fn print_ledger(ledger: &Ledger, year: Option<i32>) {
    for row in &ledger.rows {
        let date = year
            .and_then(|y| row.record.date_in_year(y))
            .map(|d| d.to_string())
            .unwrap_or_else(|| row.record.date.clone());
        println!(
            "{:<10} {:>10}  {:<14} {}",
            date,
            row.record.amount,
            row.category.as_str(),
            row.record.description
        );
    }
}

/// `statement.txt` + `_processed.csv` -> `statement_processed.csv` in the same directory
fn sibling(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement".to_string());
    input.with_file_name(format!("{stem}{suffix}"))
}
