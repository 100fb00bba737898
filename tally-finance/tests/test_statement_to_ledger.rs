use std::path::PathBuf;

use tally_core::{Category, Label};
use tally_finance::{
    ClassifierStrategy, Pipeline, RuleEngine, SheetPlan, TrainOptions, TrainedModel,
    load_labeled_dir, write_csv,
};
use tally_ingest::{Extractor, SectionMarkers, split_pages};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn statement_text() -> String {
    std::fs::read_to_string(fixture("statement.txt")).unwrap()
}

fn extractor() -> Extractor {
    Extractor::new(&SectionMarkers::electronic_payments()).unwrap()
}

#[test]
fn test_rules_ledger_from_two_page_statement() {
    let text = statement_text();
    let pages = split_pages(&text);
    assert_eq!(pages.len(), 2);

    let pipeline = Pipeline::new(extractor(), RuleEngine::default());
    let ledger = pipeline.run(&pages).unwrap();

    let got: Vec<(&str, &str, &str, &str)> = ledger
        .rows
        .iter()
        .map(|r| {
            let [d, desc, amt, cat] = r.columns();
            (d, desc, amt, cat)
        })
        .collect();

    assert_eq!(
        got,
        vec![
            ("03/01", "STARBUCKS STORE 1456", "4.75", "Food"),
            // Fallback row picks up the next row's context
            ("03/03", "XYZ CORP INV 2231", "-120.00", "Groceries"),
            ("03/03", "SHOPRITE OF HOLMDEL", "62.18", "Groceries"),
            ("03/05", "WALMART PURCHASE 4521 HOLMDEL NJ", "12.50", "Shopping"),
            ("03/07", "AMAZON PRIME*2K4 AMZN.COM/BILL", "14.99", "Subscriptions"),
            ("03/09", "Zelle payment to J Doe", "45.00", "Transfers"),
            ("03/12", "NETFLIX.COM", "15.49", "Entertainment"),
            ("03/14", "ACME HOLDINGS", "310.00", "Utilities"),
            ("03/15", "AT&T *PAYMENT", "80.00", "Utilities"),
        ]
    );
    assert_eq!(ledger.reclassified, 2);

    let cents: i64 = ledger
        .rows
        .iter()
        .filter_map(|r| r.record.amount_cents())
        .sum();
    assert_eq!(cents, 475 - 12000 + 6218 + 1250 + 1499 + 4500 + 1549 + 31000 + 8000);
}

#[test]
fn test_trained_ledger_from_labeled_dir() {
    let pairs = load_labeled_dir(&fixture("labeled")).unwrap();
    assert_eq!(pairs.len(), 16);

    let options = TrainOptions {
        test_fraction: 0.0,
        ..TrainOptions::default()
    };
    let report = TrainedModel::train(&pairs, &options).unwrap();
    assert_eq!(report.train_size, 16);
    assert_eq!(report.accuracy, None);

    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("categorizer.json");
    report.model.save(&model_path).unwrap();

    let classifier = ClassifierStrategy::Trained
        .load(RuleEngine::default(), &model_path)
        .unwrap();
    let pipeline = Pipeline::new(extractor(), classifier);
    let text = statement_text();
    let ledger = pipeline.run(split_pages(&text)).unwrap();

    assert_eq!(ledger.len(), 9);
    assert_eq!(ledger.rows[0].category, Label::Rule(Category::Food));
    assert_eq!(ledger.rows[7].record.description, "ACME HOLDINGS");
    assert_eq!(ledger.rows[7].category, Label::Open("Rent".to_string()));
    assert_eq!(ledger.rows[8].category, Label::Rule(Category::Utilities));
    // The model never saw "Miscellaneous", so nothing needs a second pass
    assert_eq!(ledger.reclassified, 0);
}

#[test]
fn test_sinks() {
    let text = statement_text();
    let pipeline = Pipeline::new(extractor(), RuleEngine::default());
    let ledger = pipeline.run(split_pages(&text)).unwrap();

    let mut out = Vec::new();
    write_csv(&ledger, &mut out).unwrap();
    let csv_text = String::from_utf8(out).unwrap();
    assert_eq!(csv_text.lines().count(), 10);
    assert!(csv_text.starts_with("date,description,amount,category\n"));

    let at = chrono::NaiveDate::from_ymd_opt(2024, 4, 1)
        .unwrap()
        .and_hms_opt(18, 30, 0)
        .unwrap();
    let plan = SheetPlan::new(&ledger, at, 4);
    assert_eq!(plan.title, "Transactions_20240401_183000");
    assert_eq!(plan.batches.len(), 3);
    assert_eq!(plan.row_count(), 9);
}

#[test]
fn test_deposits_layout_finds_nothing_here() {
    let text = statement_text();
    let ex = Extractor::new(&SectionMarkers::electronic_deposits()).unwrap();
    let ledger = Pipeline::new(ex, RuleEngine::default())
        .run(split_pages(&text))
        .unwrap();
    assert!(ledger.is_empty());
}
