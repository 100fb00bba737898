//! Ledger record types: extracted transactions and their category labels

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A transaction line lifted out of statement text.
///
/// `date` and `amount` are kept verbatim as they appeared in the statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionRecord {
    /// Month/day token (`MM/DD`), no year
    pub date: String,
    /// Middle tokens of the line plus any merged continuation line
    pub description: String,
    /// Signed amount with exactly two decimals, e.g. `-15.00`
    pub amount: String,
}

impl TransactionRecord {
    pub fn new(
        date: impl Into<String>,
        description: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            amount: amount.into(),
        }
    }

    /// Amount as signed cents. `None` if the stored token is not `-?digits.dd`.
    pub fn amount_cents(&self) -> Option<i64> {
        let s = self.amount.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = digits.split_once('.')?;
        if whole.is_empty()
            || frac.len() != 2
            || !whole.bytes().all(|b| b.is_ascii_digit())
            || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let cents = whole
            .parse::<i64>()
            .ok()?
            .checked_mul(100)?
            .checked_add(frac.parse::<i64>().ok()?)?;
        Some(if negative { -cents } else { cents })
    }

    /// Resolve the `MM/DD` token against a statement year.
    pub fn date_in_year(&self, year: i32) -> Option<NaiveDate> {
        let mut it = self.date.trim().split('/');
        let m: u32 = it.next()?.parse().ok()?;
        let d: u32 = it.next()?.parse().ok()?;
        NaiveDate::from_ymd_opt(year, m, d)
    }
}

/// Spending categories produced by the keyword rule engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Groceries,
    Transfers,
    Subscriptions,
    Shopping,
    Entertainment,
    Utilities,
    Miscellaneous,
}

impl Category {
    /// Label assigned when nothing matches
    pub const FALLBACK: Category = Category::Miscellaneous;

    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Groceries,
        Category::Transfers,
        Category::Subscriptions,
        Category::Shopping,
        Category::Entertainment,
        Category::Utilities,
        Category::Miscellaneous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Groceries => "Groceries",
            Category::Transfers => "Transfers",
            Category::Subscriptions => "Subscriptions",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Miscellaneous => "Miscellaneous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}

/// Category label attached to a ledger row.
///
/// Rule-based classification yields a closed `Category`; a trained model may
/// emit any label it saw in its training data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Rule(Category),
    Open(String),
}

impl Label {
    /// Wrap a model output, folding known category names back into `Rule`.
    pub fn open(label: impl Into<String>) -> Self {
        let label = label.into();
        match label.parse::<Category>() {
            Ok(c) if c.as_str() == label => Label::Rule(c),
            _ => Label::Open(label),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Label::Rule(c) => c.as_str(),
            Label::Open(s) => s,
        }
    }

    /// True for the `Miscellaneous` fallback, whichever classifier produced it.
    pub fn is_fallback(&self) -> bool {
        self.as_str() == Category::FALLBACK.as_str()
    }
}

impl From<Category> for Label {
    fn from(c: Category) -> Self {
        Label::Rule(c)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the output ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub category: Label,
}

impl LedgerRow {
    pub fn new(record: TransactionRecord, category: impl Into<Label>) -> Self {
        Self {
            record,
            category: category.into(),
        }
    }

    /// `(date, description, amount, category)` in ledger column order
    pub fn columns(&self) -> [&str; 4] {
        [
            self.record.date.as_str(),
            self.record.description.as_str(),
            self.record.amount.as_str(),
            self.category.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_cents() {
        let r = TransactionRecord::new("03/01", "STARBUCKS", "4.75");
        assert_eq!(r.amount_cents(), Some(475));
        let r = TransactionRecord::new("03/01", "REFUND", "-120.05");
        assert_eq!(r.amount_cents(), Some(-12005));
        let r = TransactionRecord::new("03/01", "ZERO", "0.00");
        assert_eq!(r.amount_cents(), Some(0));
    }

    #[test]
    fn test_amount_cents_rejects_malformed() {
        for bad in ["4.7", "4.750", ".75", "1,234.56", "abc", "", "-"] {
            let r = TransactionRecord::new("03/01", "X", bad);
            assert_eq!(r.amount_cents(), None, "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_date_in_year() {
        let r = TransactionRecord::new("04/22", "X", "1.00");
        assert_eq!(r.date_in_year(2026), NaiveDate::from_ymd_opt(2026, 4, 22));
        let r = TransactionRecord::new("02/30", "X", "1.00");
        assert_eq!(r.date_in_year(2026), None);
    }

    #[test]
    fn test_category_round_trip_names() {
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
        assert_eq!("groceries".parse::<Category>().unwrap(), Category::Groceries);
        assert!("Rent".parse::<Category>().is_err());
    }

    #[test]
    fn test_label_open_folds_known_names() {
        assert_eq!(Label::open("Food"), Label::Rule(Category::Food));
        assert_eq!(Label::open("Rent"), Label::Open("Rent".to_string()));
        // Case must match exactly to fold; model labels are kept verbatim otherwise
        assert_eq!(Label::open("food"), Label::Open("food".to_string()));
    }

    #[test]
    fn test_label_fallback() {
        assert!(Label::Rule(Category::Miscellaneous).is_fallback());
        assert!(Label::open("Miscellaneous").is_fallback());
        assert!(!Label::Rule(Category::Food).is_fallback());
        assert!(!Label::Open("Other".into()).is_fallback());
    }

    #[test]
    fn test_ledger_row_serializes_flat() {
        let row = LedgerRow::new(
            TransactionRecord::new("03/01", "STARBUCKS STORE", "4.75"),
            Category::Food,
        );
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["date"], "03/01");
        assert_eq!(json["description"], "STARBUCKS STORE");
        assert_eq!(json["amount"], "4.75");
        assert_eq!(json["category"], "Food");
        assert_eq!(row.columns(), ["03/01", "STARBUCKS STORE", "4.75", "Food"]);
    }
}
