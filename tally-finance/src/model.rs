//! Trainable description classifier: TF-IDF features + logistic regression,
//! persisted as a single JSON artifact.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tally_core::Label;
use tracing::info;

use crate::error::{LedgerError, Result};
use crate::logistic::{LogisticParams, LogisticRegression};
use crate::tfidf::TfIdfVectorizer;

/// A `(description, category)` training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledPair {
    pub description: String,
    pub category: String,
}

impl LabeledPair {
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Share of examples held out for accuracy reporting
    pub test_fraction: f64,
    /// Shuffle seed; the same seed and data give the same model
    pub seed: u64,
    pub params: LogisticParams,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            params: LogisticParams::default(),
        }
    }
}

/// Outcome of [`TrainedModel::train`]
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub model: TrainedModel,
    pub train_size: usize,
    pub test_size: usize,
    /// Hold-out accuracy in `0.0..=1.0`; `None` when nothing was held out
    pub accuracy: Option<f64>,
}

/// Fitted vectorizer + classifier pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    labels: Vec<String>,
    vectorizer: TfIdfVectorizer,
    classifier: LogisticRegression,
    trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Shuffle, hold out `test_fraction`, fit on the rest, score the hold-out.
    pub fn train(pairs: &[LabeledPair], options: &TrainOptions) -> Result<TrainingReport> {
        if pairs.is_empty() {
            return Err(LedgerError::EmptyTrainingSet);
        }

        let mut shuffled: Vec<&LabeledPair> = pairs.iter().collect();
        let mut rng = StdRng::seed_from_u64(options.seed);
        shuffled.shuffle(&mut rng);

        let fraction = options.test_fraction.clamp(0.0, 1.0);
        // Always keep at least one training example
        let test_size = ((pairs.len() as f64 * fraction).ceil() as usize).min(pairs.len() - 1);
        let (test, train) = shuffled.split_at(test_size);

        let model = Self::fit(train, &options.params);
        let accuracy = (!test.is_empty()).then(|| {
            let hits = test
                .iter()
                .filter(|p| model.predict(&p.description) == Some(p.category.as_str()))
                .count();
            hits as f64 / test.len() as f64
        });

        let accuracy_text = accuracy
            .map(|a| format!("{:.2}%", a * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        info!(
            train = train.len(),
            test = test.len(),
            labels = model.labels.len(),
            vocabulary = model.vectorizer.vocabulary_size(),
            accuracy = %accuracy_text,
            "model trained"
        );

        Ok(TrainingReport {
            train_size: train.len(),
            test_size: test.len(),
            accuracy,
            model,
        })
    }

    /// Fit on every example, no hold-out.
    pub fn fit(pairs: &[&LabeledPair], params: &LogisticParams) -> Self {
        let labels: Vec<String> = pairs
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let documents: Vec<&str> = pairs.iter().map(|p| p.description.as_str()).collect();
        let vectorizer = TfIdfVectorizer::fit(&documents);

        let samples: Vec<_> = documents.iter().map(|d| vectorizer.transform(d)).collect();
        let targets: Vec<usize> = pairs
            .iter()
            .map(|p| labels.binary_search(&p.category).unwrap_or_default())
            .collect();

        let classifier = LogisticRegression::fit(
            &samples,
            &targets,
            labels.len(),
            vectorizer.vocabulary_size(),
            params,
        );

        Self {
            labels,
            vectorizer,
            classifier,
            trained_at: Utc::now(),
        }
    }

    /// Most probable label for a description.
    pub fn predict(&self, description: &str) -> Option<&str> {
        let features = self.vectorizer.transform(description);
        self.classifier
            .predict(&features)
            .and_then(|k| self.labels.get(k))
            .map(String::as_str)
    }

    /// Predict and wrap as a ledger label. A model with no labels yields the fallback.
    pub fn label(&self, description: &str) -> Label {
        match self.predict(description) {
            Some(l) => Label::open(l),
            None => Label::Rule(tally_core::Category::FALLBACK),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        info!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Load a saved artifact. A missing file is `ModelUnavailable`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LedgerError::ModelUnavailable {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&content)?;
        if !model.vectorizer.is_consistent()
            || !model
                .classifier
                .is_consistent(model.vectorizer.vocabulary_size())
            || model.classifier.n_classes() != model.labels.len()
        {
            return Err(LedgerError::CorruptModel(path.display().to_string()));
        }
        Ok(model)
    }
}
