//! Streaming loader for the detailed transaction CSV export.
//!
//! The export carries one row per purchased line item with the household demographics repeated
//! on every row. Columns are matched by header name, so column order does not matter and extra
//! columns are ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::record::{Category, Demographics, TransactionLine};

/// Header names that must be present in the export.
pub const REQUIRED_COLUMNS: [&str; 16] = [
    "HSHD_NUM",
    "BASKET_NUM",
    "DATE",
    "PRODUCT_NUM",
    "DEPARTMENT",
    "COMMODITY",
    "SPEND",
    "UNITS",
    "STORE_R",
    "WEEK_NUM",
    "YEAR",
    "AGE_RANGE",
    "MARITAL",
    "INCOME_RANGE",
    "HOMEOWNER",
    "CHILDREN",
];

#[derive(Clone, Debug)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv input was empty")]
    EmptyInput,
    #[error("missing required column {0}")]
    MissingColumn(String),
    #[error("csv parse error at row {row}: {reason}")]
    Parse { row: u64, reason: String },
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(rename = "HSHD_NUM")]
    household: i64,
    #[serde(rename = "BASKET_NUM")]
    basket: i64,
    #[serde(rename = "DATE")]
    date: String,
    #[serde(rename = "PRODUCT_NUM")]
    product: i64,
    #[serde(rename = "DEPARTMENT")]
    department: String,
    #[serde(rename = "COMMODITY")]
    commodity: String,
    #[serde(rename = "SPEND")]
    spend: f64,
    #[serde(rename = "UNITS")]
    units: i64,
    #[serde(rename = "STORE_R")]
    store_region: String,
    #[serde(rename = "WEEK_NUM")]
    week: i64,
    #[serde(rename = "YEAR")]
    year: i64,
    #[serde(rename = "AGE_RANGE")]
    age_range: String,
    #[serde(rename = "MARITAL")]
    marital_status: String,
    #[serde(rename = "INCOME_RANGE")]
    income_range: String,
    #[serde(rename = "HOMEOWNER")]
    homeowner: String,
    #[serde(rename = "CHILDREN")]
    children: String,
}

/// Read every transaction line from a CSV stream.
///
/// An input with a header row and no data rows is valid and yields an empty vector.
pub fn read_transactions<R: Read>(
    reader: R,
    options: &CsvOptions,
) -> Result<Vec<TransactionLine>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(|e| map_csv_error(e, 0))?;
    if headers.is_empty() {
        return Err(ImportError::EmptyInput);
    }
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ImportError::MissingColumn(column.to_string()));
        }
    }

    let mut pool = CategoryPool::new();
    let mut lines = Vec::new();
    for (idx, result) in csv_reader.deserialize::<RawTransaction>().enumerate() {
        let raw = result.map_err(|e| map_csv_error(e, idx as u64 + 1))?;
        lines.push(raw.into_line(&mut pool));
    }
    Ok(lines)
}

pub fn read_transactions_from_path(
    path: &Path,
    options: &CsvOptions,
) -> Result<Vec<TransactionLine>, ImportError> {
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_transactions(BufReader::new(file), options)
}

impl RawTransaction {
    fn into_line(self, pool: &mut CategoryPool) -> TransactionLine {
        TransactionLine {
            household: self.household,
            basket: self.basket,
            date: self.date,
            product: self.product,
            department: self.department,
            commodity: self.commodity,
            spend: self.spend,
            units: self.units,
            store_region: self.store_region,
            week: self.week,
            year: self.year,
            demographics: Demographics {
                age_range: pool.category(&self.age_range),
                marital_status: pool.category(&self.marital_status),
                income_range: pool.category(&self.income_range),
                homeowner: pool.category(&self.homeowner),
                children: pool.category(&self.children),
            },
        }
    }
}

fn map_csv_error(err: csv::Error, fallback_row: u64) -> ImportError {
    let reason = err.to_string();
    let pos = err.position().cloned();

    match err.into_kind() {
        csv::ErrorKind::Io(e) => ImportError::Io(e),
        _ => {
            let row = pos
                .map(|p| p.record())
                .filter(|r| *r > 0)
                .unwrap_or(fallback_row);
            ImportError::Parse { row, reason }
        }
    }
}

/// Demographic values repeat on every line of a household; share one allocation per token.
struct CategoryPool {
    set: HashMap<Arc<str>, ()>,
    null: Category,
}

impl CategoryPool {
    fn new() -> Self {
        Self {
            set: HashMap::new(),
            null: Category::null(),
        }
    }

    fn category(&mut self, raw: &str) -> Category {
        if Category::is_null_token(raw) {
            return self.null.clone();
        }
        if let Some((k, _)) = self.set.get_key_value(raw) {
            return Category::from_interned(k.clone());
        }

        let arc: Arc<str> = Arc::<str>::from(raw);
        self.set.insert(arc.clone(), ());
        Category::from_interned(arc)
    }
}
