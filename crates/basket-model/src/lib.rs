//! `basket-model` defines the raw transaction-line records consumed by the analytics engine.
//!
//! The crate is intentionally small:
//! - typed records (`TransactionLine`, `Demographics`, `Category`)
//! - streaming CSV loading of the detailed transaction export (`import`)

#![forbid(unsafe_code)]

pub mod import;
mod record;

pub use crate::import::{read_transactions, read_transactions_from_path, CsvOptions, ImportError};
pub use crate::record::{
    BasketId, BasketKey, Category, Demographics, HouseholdId, TransactionLine,
    NOT_AVAILABLE_LABEL, NULL_TOKEN,
};
