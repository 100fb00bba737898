//! tally-ingest: turns extracted statement text into transaction records.

pub mod extract;
pub mod pages;
pub mod types;

pub use extract::{Extraction, Extractor};
pub use pages::split_pages;
pub use types::{CaptureState, SectionMarkers};
