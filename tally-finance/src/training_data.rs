//! Load labeled `(description, category)` examples from CSV files.
//!
//! Each file needs a header row with `description` and `category` columns;
//! any other columns are ignored.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{LedgerError, Result};
use crate::model::LabeledPair;

/// Read one labeled CSV stream. `source_name` is used in error messages.
pub fn read_labeled_csv<R: Read>(reader: R, source_name: &str) -> Result<Vec<LabeledPair>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
            .ok_or_else(|| LedgerError::MissingColumn {
                column: name.to_string(),
                source_name: source_name.to_string(),
            })
    };
    let desc_idx = column("description")?;
    let cat_idx = column("category")?;

    let mut pairs = Vec::new();
    for (row_no, result) in rdr.records().enumerate() {
        let record = result?;
        let description = record.get(desc_idx).unwrap_or("");
        let category = record.get(cat_idx).unwrap_or("");
        if description.is_empty() || category.is_empty() {
            warn!(source = source_name, row = row_no + 2, "skipping incomplete labeled row");
            continue;
        }
        pairs.push(LabeledPair::new(description, category));
    }
    Ok(pairs)
}

/// Read every `*.csv` in `dir` (sorted by file name) and concatenate the examples.
pub fn load_labeled_dir(dir: &Path) -> Result<Vec<LabeledPair>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    files.sort();

    let mut pairs = Vec::new();
    for path in &files {
        let file = fs::File::open(path)?;
        let mut batch = read_labeled_csv(file, &path.display().to_string())?;
        info!(file = %path.display(), examples = batch.len(), "loaded labeled data");
        pairs.append(&mut batch);
    }

    if files.is_empty() {
        warn!(dir = %dir.display(), "no labeled CSV files found");
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_labeled_csv_extra_columns() {
        let data = "date,Description,amount,Category\n03/01,STARBUCKS STORE,4.75,Food\n03/02, SHOPRITE ,40.00,Groceries\n";
        let pairs = read_labeled_csv(data.as_bytes(), "inline").unwrap();
        assert_eq!(
            pairs,
            vec![
                LabeledPair::new("STARBUCKS STORE", "Food"),
                LabeledPair::new("SHOPRITE", "Groceries"),
            ]
        );
    }

    #[test]
    fn test_missing_category_column() {
        let data = "description,amount\nSTARBUCKS,4.75\n";
        let err = read_labeled_csv(data.as_bytes(), "labels.csv").unwrap_err();
        match err {
            LedgerError::MissingColumn { column, source_name } => {
                assert_eq!(column, "category");
                assert_eq!(source_name, "labels.csv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_incomplete_rows_skipped() {
        let data = "description,category\nSTARBUCKS,\n,Food\nCOFFEE,Food\n";
        let pairs = read_labeled_csv(data.as_bytes(), "inline").unwrap();
        assert_eq!(pairs, vec![LabeledPair::new("COFFEE", "Food")]);
    }

    #[test]
    fn test_load_dir_reads_only_csv_in_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.csv"), "description,category\nNETFLIX,Entertainment\n").unwrap();
        fs::write(dir.path().join("a.CSV"), "description,category\nSTARBUCKS,Food\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "description,category\nIGNORED,Nope\n").unwrap();

        let pairs = load_labeled_dir(dir.path()).unwrap();
        let descs: Vec<_> = pairs.iter().map(|p| p.description.as_str()).collect();
        assert_eq!(descs, ["STARBUCKS", "NETFLIX"]);
    }

    #[test]
    fn test_load_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_labeled_dir(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, LedgerError::Io(_)));
    }
}
