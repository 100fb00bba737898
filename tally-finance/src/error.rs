use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid rules table: {0}")]
    Rules(#[from] toml::de::Error),
    #[error("Transaction {date} ({amount}) has no description")]
    MissingDescription { date: String, amount: String },
    #[error("Missing required column '{column}' in {source_name}")]
    MissingColumn { column: String, source_name: String },
    #[error("No trained model at {}; train one first or use the rule classifier", path.display())]
    ModelUnavailable { path: PathBuf },
    #[error("No labeled examples to train on")]
    EmptyTrainingSet,
    #[error("Model artifact is inconsistent: {0}")]
    CorruptModel(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
