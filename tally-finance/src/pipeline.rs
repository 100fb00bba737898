//! Statement text → records → categories → reclassification → ledger.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tally_core::{LedgerRow, TransactionRecord};
use tally_ingest::Extractor;
use tracing::info;

use crate::category_rules::RuleEngine;
use crate::classifier::Classifier;
use crate::error::{LedgerError, Result};
use crate::model::TrainedModel;
use crate::reclassify::reclassify_fallbacks;

/// Which classifier categorizes the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierStrategy {
    #[default]
    Rules,
    Trained,
}

impl ClassifierStrategy {
    /// Build the classifier for this strategy. `Trained` needs a model at `model_path`.
    pub fn load(self, rules: RuleEngine, model_path: &Path) -> Result<Box<dyn Classifier>> {
        match self {
            ClassifierStrategy::Rules => Ok(Box::new(rules)),
            ClassifierStrategy::Trained => Ok(Box::new(TrainedModel::load(model_path)?)),
        }
    }
}

/// Categorized transactions of one document, in statement order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub rows: Vec<LedgerRow>,
    /// Rows that went through the fallback second pass
    #[serde(skip)]
    pub reclassified: usize,
}

impl Ledger {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub struct Pipeline<C = Box<dyn Classifier>> {
    extractor: Extractor,
    classifier: C,
}

impl<C: Classifier> Pipeline<C> {
    pub fn new(extractor: Extractor, classifier: C) -> Self {
        Self {
            extractor,
            classifier,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Run one document given as pages of lines.
    pub fn run<P, L, S>(&self, pages: P) -> Result<Ledger>
    where
        P: IntoIterator<Item = L>,
        L: AsRef<[S]>,
        S: AsRef<str>,
    {
        let records = self.extractor.extract(pages);
        self.categorize(records)
    }

    /// Classify each record once, then give fallback rows a second look.
    pub fn categorize(&self, records: Vec<TransactionRecord>) -> Result<Ledger> {
        if let Some(r) = records.iter().find(|r| r.description.trim().is_empty()) {
            return Err(LedgerError::MissingDescription {
                date: r.date.clone(),
                amount: r.amount.clone(),
            });
        }

        let mut rows: Vec<LedgerRow> = records
            .into_iter()
            .map(|record| {
                let label = self.classifier.classify(&record.description);
                LedgerRow::new(record, label)
            })
            .collect();

        let reclassified = reclassify_fallbacks(&mut rows, &self.classifier);

        info!(
            classifier = self.classifier.name(),
            transactions = rows.len(),
            reclassified,
            "ledger built"
        );
        Ok(Ledger { rows, reclassified })
    }
}
