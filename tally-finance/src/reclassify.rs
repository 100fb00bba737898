//! Second pass over fallback-labeled rows using the following row as context.

use tally_core::LedgerRow;
use tracing::debug;

use crate::classifier::Classifier;

/// Re-decide every `Miscellaneous` row that has a successor by classifying
/// `"<own description> <next description>"`.
///
/// Eligibility is fixed before the pass starts, so a row relabeled here never
/// changes whether another row is reconsidered. Descriptions are not modified.
/// Returns how many rows were reconsidered.
pub fn reclassify_fallbacks<C: Classifier + ?Sized>(rows: &mut [LedgerRow], classifier: &C) -> usize {
    let eligible: Vec<usize> = rows
        .iter()
        .enumerate()
        .take(rows.len().saturating_sub(1))
        .filter(|(_, row)| row.category.is_fallback())
        .map(|(i, _)| i)
        .collect();

    for &i in &eligible {
        let combined = format!(
            "{} {}",
            rows[i].record.description,
            rows[i + 1].record.description
        );
        let label = classifier.classify(&combined);
        debug!(index = i, text = %combined, label = %label, "reclassified");
        rows[i].category = label;
    }

    eligible.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category_rules::RuleEngine;
    use std::cell::RefCell;
    use tally_core::{Category, Label, TransactionRecord};

    fn row(desc: &str, category: Category) -> LedgerRow {
        LedgerRow::new(TransactionRecord::new("03/01", desc, "1.00"), category)
    }

    /// Records every call and answers with a fixed label
    struct Recorder {
        calls: RefCell<Vec<String>>,
        answer: Label,
    }

    impl Classifier for Recorder {
        fn classify(&self, description: &str) -> Label {
            self.calls.borrow_mut().push(description.to_string());
            self.answer.clone()
        }

        fn name(&self) -> &str {
            "recorder"
        }
    }

    #[test]
    fn test_uses_next_description() {
        let mut rows = vec![
            row("XYZ CORP", Category::Miscellaneous),
            row("STARBUCKS", Category::Food),
        ];
        let n = reclassify_fallbacks(&mut rows, &RuleEngine::default());
        assert_eq!(n, 1);
        assert_eq!(rows[0].category, Label::Rule(Category::Food));
        assert_eq!(rows[1].category, Label::Rule(Category::Food));
        assert_eq!(rows[0].record.description, "XYZ CORP");
    }

    #[test]
    fn test_last_row_not_eligible() {
        let mut rows = vec![row("STARBUCKS", Category::Food), row("XYZ CORP", Category::Miscellaneous)];
        let rec = Recorder {
            calls: RefCell::new(Vec::new()),
            answer: Label::Rule(Category::Food),
        };
        assert_eq!(reclassify_fallbacks(&mut rows, &rec), 0);
        assert!(rec.calls.borrow().is_empty());
        assert_eq!(rows[1].category, Label::Rule(Category::Miscellaneous));
    }

    #[test]
    fn test_non_fallback_rows_untouched() {
        let mut rows = vec![
            row("COFFEE", Category::Food),
            row("XYZ", Category::Miscellaneous),
            row("NETFLIX", Category::Entertainment),
            row("ABC", Category::Shopping),
        ];
        let before: Vec<_> = rows.iter().map(|r| r.category.clone()).collect();
        let rec = Recorder {
            calls: RefCell::new(Vec::new()),
            answer: Label::Open("Other".into()),
        };
        reclassify_fallbacks(&mut rows, &rec);
        for i in [0, 2, 3] {
            assert_eq!(rows[i].category, before[i]);
        }
        assert_eq!(rows[1].category, Label::Open("Other".into()));
        assert_eq!(*rec.calls.borrow(), vec!["XYZ NETFLIX".to_string()]);
    }

    #[test]
    fn test_one_call_per_fallback_in_order() {
        let mut rows = vec![
            row("A", Category::Miscellaneous),
            row("B", Category::Miscellaneous),
            row("C", Category::Miscellaneous),
        ];
        let rec = Recorder {
            calls: RefCell::new(Vec::new()),
            answer: Label::Rule(Category::Miscellaneous),
        };
        assert_eq!(reclassify_fallbacks(&mut rows, &rec), 2);
        assert_eq!(*rec.calls.borrow(), vec!["A B".to_string(), "B C".to_string()]);
    }

    #[test]
    fn test_eligibility_fixed_before_pass() {
        // Relabeling row 0 leaves row 1 (not fallback beforehand) alone
        let mut rows = vec![
            row("A", Category::Miscellaneous),
            row("B", Category::Food),
            row("C", Category::Food),
        ];
        let rec = Recorder {
            calls: RefCell::new(Vec::new()),
            answer: Label::Rule(Category::Miscellaneous),
        };
        assert_eq!(reclassify_fallbacks(&mut rows, &rec), 1);
        assert_eq!(rows[1].category, Label::Rule(Category::Food));
    }

    #[test]
    fn test_empty_and_single() {
        let mut rows: Vec<LedgerRow> = Vec::new();
        assert_eq!(reclassify_fallbacks(&mut rows, &RuleEngine::default()), 0);
        let mut rows = vec![row("XYZ", Category::Miscellaneous)];
        assert_eq!(reclassify_fallbacks(&mut rows, &RuleEngine::default()), 0);
    }
}
