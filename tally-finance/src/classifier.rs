//! Common interface over the rule engine and the trained model.

use tally_core::Label;

use crate::category_rules::RuleEngine;
use crate::model::TrainedModel;

/// Anything that maps a description to exactly one label.
pub trait Classifier {
    fn classify(&self, description: &str) -> Label;

    /// Short name for logging
    fn name(&self) -> &str;
}

impl Classifier for RuleEngine {
    fn classify(&self, description: &str) -> Label {
        Label::Rule(self.categorize(description))
    }

    fn name(&self) -> &str {
        "rules"
    }
}

impl Classifier for TrainedModel {
    fn classify(&self, description: &str) -> Label {
        self.label(description)
    }

    fn name(&self) -> &str {
        "trained"
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, description: &str) -> Label {
        (**self).classify(description)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
