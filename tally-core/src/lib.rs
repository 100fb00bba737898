//! tally-core: ledger types and text normalization shared by the tally crates

pub mod ledger;
pub mod normalize;

pub use ledger::{Category, Label, LedgerRow, TransactionRecord};
pub use normalize::normalize;
