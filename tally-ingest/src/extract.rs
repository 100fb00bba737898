//! Line-oriented transaction extraction for sectioned bank statements.
//!
//! Expected extracted-text layout:
//!   Electronic Payments
//!   03/01 STARBUCKS STORE 4.75
//!   03/02 Zelle payment to J Doe -120.00
//!         Conf# 88231
//!   Daily Balance Summary
//!
//! A transaction line starts with `MM/DD` and ends with a signed two-decimal
//! amount. A following line that does not start with a date is treated as the
//! tail of the description and consumed with it.

use anyhow::Result;
use regex::Regex;
use tally_core::TransactionRecord;
use tracing::{debug, trace, warn};

use crate::types::{CaptureState, SectionMarkers, fold_marker};

/// Records produced from one page plus the state to carry into the next page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Extraction {
    pub records: Vec<TransactionRecord>,
    pub state: CaptureState,
    /// Number of section-start marker lines seen
    pub sections: usize,
}

/// Scanning/capturing state machine over statement lines.
#[derive(Debug, Clone)]
pub struct Extractor {
    start: String,
    end: Option<String>,
    date_prefix: Regex,
    amount: Regex,
}

impl Extractor {
    pub fn new(markers: &SectionMarkers) -> Result<Self> {
        Ok(Self {
            start: fold_marker(&markers.start),
            end: markers
                .end
                .as_deref()
                .map(fold_marker)
                .filter(|m| !m.is_empty()),
            date_prefix: Regex::new(r"^[0-9]{2}/[0-9]{2}")?,
            amount: Regex::new(r"^-?[0-9]+\.[0-9]{2}$")?,
        })
    }

    /// Run over every page in order, carrying the capture state across page breaks.
    pub fn extract<P, L, S>(&self, pages: P) -> Vec<TransactionRecord>
    where
        P: IntoIterator<Item = L>,
        L: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut state = CaptureState::Scanning;
        let mut sections = 0;
        let mut records = Vec::new();

        for (page_no, page) in pages.into_iter().enumerate() {
            let out = self.extract_page(page.as_ref(), state);
            trace!(page = page_no + 1, records = out.records.len(), state = ?out.state, "page done");
            state = out.state;
            sections += out.sections;
            records.extend(out.records);
        }

        if sections == 0 {
            warn!("section start marker never found; no transactions extracted");
        }
        records
    }

    /// Process a single page starting from `state`.
    pub fn extract_page<S: AsRef<str>>(&self, lines: &[S], state: CaptureState) -> Extraction {
        let mut out = Extraction {
            records: Vec::new(),
            state,
            sections: 0,
        };

        // Explicit cursor: a transaction may consume a continuation line too.
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].as_ref();
            let folded = fold_marker(line);

            if self.is_start(&folded) {
                debug!(line = i, "entering transaction section");
                out.state = CaptureState::Capturing;
                out.sections += 1;
                i += 1;
                continue;
            }

            if out.state == CaptureState::Capturing && self.is_end(&folded) {
                debug!(line = i, "leaving transaction section");
                out.state = CaptureState::Scanning;
                i += 1;
                continue;
            }

            if out.state == CaptureState::Capturing {
                if let Some(mut record) = self.parse_transaction_line(line) {
                    if let Some(next) = lines.get(i + 1).map(|l| l.as_ref()) {
                        if self.is_continuation(next) {
                            let tail = next.trim();
                            // A blank continuation is still consumed but adds no trailing space
                            if !tail.is_empty() {
                                if !record.description.is_empty() {
                                    record.description.push(' ');
                                }
                                record.description.push_str(tail);
                            }
                            i += 1;
                        }
                    }
                    debug!(
                        date = %record.date,
                        amount = %record.amount,
                        description = %record.description,
                        "extracted transaction"
                    );
                    out.records.push(record);
                }
            }

            i += 1;
        }

        out
    }

    /// Split a `MM/DD <description...> <amount>` line. `None` for anything else.
    pub fn parse_transaction_line(&self, line: &str) -> Option<TransactionRecord> {
        if !self.has_date_prefix(line) {
            return None;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (date, rest) = tokens.split_first()?;
        let (amount, middle) = rest.split_last()?;
        if !self.amount.is_match(amount) {
            return None;
        }
        Some(TransactionRecord::new(*date, middle.join(" "), *amount))
    }

    fn has_date_prefix(&self, line: &str) -> bool {
        let head: String = line.chars().take(5).collect();
        self.date_prefix.is_match(&head)
    }

    fn is_continuation(&self, line: &str) -> bool {
        if self.has_date_prefix(line) {
            return false;
        }
        let folded = fold_marker(line);
        !self.is_start(&folded) && !self.is_end(&folded)
    }

    fn is_start(&self, folded: &str) -> bool {
        !self.start.is_empty() && folded.contains(&self.start)
    }

    fn is_end(&self, folded: &str) -> bool {
        self.end.as_deref().is_some_and(|end| folded.contains(end))
    }
}
