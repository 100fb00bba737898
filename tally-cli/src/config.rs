use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tally_finance::{CategoryRule, ClassifierStrategy, RuleEngine, TrainOptions};
use tally_ingest::SectionMarkers;

use crate::state::ensure_tally_home;

/// Every section and field is optional; missing ones take the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: SectionMarkers,
    pub classifier: ClassifierSection,
    pub output: OutputSection,

    /// Replaces the built-in keyword table when present (order is priority)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<CategoryRule>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    pub strategy: ClassifierStrategy,
    /// Relative paths are resolved against ~/.tally
    pub model_path: PathBuf,
    /// Directory of labeled CSVs (`description`, `category` columns)
    pub training_dir: PathBuf,
    pub test_fraction: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Rows per spreadsheet append
    pub batch_size: usize,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        let train = TrainOptions::default();
        Self {
            strategy: ClassifierStrategy::Rules,
            model_path: PathBuf::from("transaction_categorizer_model.json"),
            training_dir: PathBuf::from("training"),
            test_fraction: train.test_fraction,
            seed: train.seed,
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            batch_size: tally_finance::export::DEFAULT_BATCH_SIZE,
        }
    }
}

impl Config {
    pub fn rule_engine(&self) -> RuleEngine {
        match &self.rules {
            Some(rules) => RuleEngine::new(rules.clone()),
            None => RuleEngine::default(),
        }
    }

    pub fn train_options(&self) -> TrainOptions {
        TrainOptions {
            test_fraction: self.classifier.test_fraction,
            seed: self.classifier.seed,
            ..TrainOptions::default()
        }
    }

    pub fn model_path(&self) -> Result<PathBuf> {
        resolve(&self.classifier.model_path)
    }

    pub fn training_dir(&self) -> Result<PathBuf> {
        resolve(&self.classifier.training_dir)
    }
}

fn resolve(p: &Path) -> Result<PathBuf> {
    if p.is_absolute() {
        Ok(p.to_path_buf())
    } else {
        Ok(ensure_tally_home()?.join(p))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

/// Load `path` (or ~/.tally/config.toml). A missing file gives defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    Ok(toml::from_str(s)?)
}

pub fn save_config(cfg: &Config) -> Result<PathBuf> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(p)
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let p = save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
