use serde::{Deserialize, Serialize};

/// Where the extractor is relative to the transaction section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureState {
    /// Looking for the section-start marker
    #[default]
    Scanning,
    /// Inside the transaction section; lines are tested as transactions
    Capturing,
}

/// Literal phrases bounding the transaction section of a statement.
///
/// Matching ignores whitespace and case on both sides, so `"Electronic Payments"`
/// also matches the `ELECTRONICPAYMENTS` that some text extractors produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMarkers {
    #[serde(default = "default_start")]
    pub start: String,
    /// When `None`, capture runs to the end of the document
    #[serde(default)]
    pub end: Option<String>,
}

impl SectionMarkers {
    pub fn new(start: impl Into<String>, end: Option<String>) -> Self {
        Self {
            start: start.into(),
            end,
        }
    }

    /// Checking-account payments section
    pub fn electronic_payments() -> Self {
        Self::new("Electronic Payments", Some("Daily Balance Summary".to_string()))
    }

    /// Checking-account deposits section
    pub fn electronic_deposits() -> Self {
        Self::new("Electronic Deposits", Some("Checks Paid".to_string()))
    }
}

fn default_start() -> String {
    SectionMarkers::electronic_payments().start
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self::electronic_payments()
    }
}

/// Drop all whitespace and lower-case, the form markers are compared in.
pub(crate) fn fold_marker(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_marker() {
        assert_eq!(fold_marker("  Electronic   Payments "), "electronicpayments");
        assert_eq!(fold_marker("ELECTRONIC\tPAYMENTS"), "electronicpayments");
        assert_eq!(fold_marker(""), "");
    }

    #[test]
    fn test_default_markers() {
        let m = SectionMarkers::default();
        assert_eq!(m.start, "Electronic Payments");
        assert_eq!(m.end.as_deref(), Some("Daily Balance Summary"));
        assert_eq!(CaptureState::default(), CaptureState::Scanning);
    }
}
