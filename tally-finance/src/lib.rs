//! tally-finance: categorization (keyword rules and a trained model),
//! fallback reclassification, the statement pipeline, and ledger sinks

pub mod category_rules;
pub mod classifier;
pub mod error;
pub mod export;
pub mod logistic;
pub mod model;
pub mod pipeline;
pub mod reclassify;
pub mod tfidf;
pub mod training_data;

pub use category_rules::{CategoryRule, RuleEngine, default_rules};
pub use classifier::Classifier;
pub use error::{LedgerError, Result};
pub use export::{SheetPlan, write_csv};
pub use model::{LabeledPair, TrainOptions, TrainedModel, TrainingReport};
pub use pipeline::{ClassifierStrategy, Ledger, Pipeline};
pub use reclassify::reclassify_fallbacks;
pub use training_data::load_labeled_dir;
