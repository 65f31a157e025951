//! Server-side filtering, sorting and paging of the raw transaction table.
//!
//! Request parameters arrive as loosely typed values ([`TableQueryParams`]) and are validated into
//! a [`TableQuery`] before any rows are touched. Execution always runs
//! filter -> count -> sort -> slice, so `total` reflects the filter and never the page.

use crate::error::{EngineError, EngineResult};
use crate::store::RecordStore;
use basket_model::{BasketId, HouseholdId, TransactionLine};
use ordered_float::OrderedFloat;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Pagination bound that means "not supplied".
const ABSENT_BOUND: i64 = -1;

/// Columns of the table projection, in output order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableColumn {
    Household,
    Basket,
    Date,
    Product,
    Department,
    Commodity,
    Spend,
    Units,
    StoreRegion,
    Week,
    Year,
}

impl TableColumn {
    pub const ALL: [TableColumn; 11] = [
        TableColumn::Household,
        TableColumn::Basket,
        TableColumn::Date,
        TableColumn::Product,
        TableColumn::Department,
        TableColumn::Commodity,
        TableColumn::Spend,
        TableColumn::Units,
        TableColumn::StoreRegion,
        TableColumn::Week,
        TableColumn::Year,
    ];

    /// Column identifier as used by the source export and the `sort` parameter.
    pub fn name(self) -> &'static str {
        match self {
            TableColumn::Household => "HSHD_NUM",
            TableColumn::Basket => "BASKET_NUM",
            TableColumn::Date => "DATE",
            TableColumn::Product => "PRODUCT_NUM",
            TableColumn::Department => "DEPARTMENT",
            TableColumn::Commodity => "COMMODITY",
            TableColumn::Spend => "SPEND",
            TableColumn::Units => "UNITS",
            TableColumn::StoreRegion => "STORE_R",
            TableColumn::Week => "WEEK_NUM",
            TableColumn::Year => "YEAR",
        }
    }

    pub fn compare(self, a: &TransactionLine, b: &TransactionLine) -> Ordering {
        match self {
            TableColumn::Household => a.household.cmp(&b.household),
            TableColumn::Basket => a.basket.cmp(&b.basket),
            TableColumn::Date => a.date.cmp(&b.date),
            TableColumn::Product => a.product.cmp(&b.product),
            TableColumn::Department => a.department.cmp(&b.department),
            TableColumn::Commodity => a.commodity.cmp(&b.commodity),
            TableColumn::Spend => OrderedFloat(a.spend).cmp(&OrderedFloat(b.spend)),
            TableColumn::Units => a.units.cmp(&b.units),
            TableColumn::StoreRegion => a.store_region.cmp(&b.store_region),
            TableColumn::Week => a.week.cmp(&b.week),
            TableColumn::Year => a.year.cmp(&b.year),
        }
    }
}

impl fmt::Display for TableColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableColumn {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        let s = s.trim();
        TableColumn::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::invalid("sort", format!("unknown column {s:?}")))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortSpec {
    pub column: TableColumn,
    pub descending: bool,
}

impl SortSpec {
    pub fn ascending(column: TableColumn) -> Self {
        Self {
            column,
            descending: false,
        }
    }

    pub fn descending(column: TableColumn) -> Self {
        Self {
            column,
            descending: true,
        }
    }

    pub fn compare(&self, a: &TransactionLine, b: &TransactionLine) -> Ordering {
        let ord = self.column.compare(a, b);
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl FromStr for SortSpec {
    type Err = EngineError;

    /// Parses `[+|-][,]COLUMN`. The comma form (`-,SPEND`) is what the dashboard table sends.
    fn from_str(s: &str) -> EngineResult<Self> {
        let raw = s.trim();
        let (descending, rest) = if let Some(rest) = raw.strip_prefix('-') {
            (true, rest)
        } else if let Some(rest) = raw.strip_prefix('+') {
            (false, rest)
        } else {
            (false, raw)
        };
        let rest = rest.trim_start();
        let rest = rest.strip_prefix(',').unwrap_or(rest);
        Ok(Self {
            column: rest.parse()?,
            descending,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub start: usize,
    pub length: usize,
}

/// Raw request parameters, as an HTTP layer would receive them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TableQueryParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub length: Option<i64>,
}

/// A validated table query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableQuery {
    pub household: Option<HouseholdId>,
    pub sort: Option<SortSpec>,
    pub page: Option<Page>,
}

impl TableQuery {
    pub fn from_params(params: &TableQueryParams) -> EngineResult<Self> {
        let household = match params.search.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(text.parse::<HouseholdId>().map_err(|_| {
                EngineError::invalid("search", format!("{text:?} is not a household number"))
            })?),
        };

        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(text) => Some(text.parse::<SortSpec>()?),
        };

        let start = page_bound("start", params.start)?;
        let length = page_bound("length", params.length)?;
        let page = match (start, length) {
            (Some(start), Some(length)) => Some(Page { start, length }),
            _ => None,
        };

        Ok(Self {
            household,
            sort,
            page,
        })
    }
}

fn page_bound(parameter: &'static str, value: Option<i64>) -> EngineResult<Option<usize>> {
    match value {
        None | Some(ABSENT_BOUND) => Ok(None),
        Some(v) => usize::try_from(v)
            .map(Some)
            .map_err(|_| EngineError::invalid(parameter, format!("{v} is negative"))),
    }
}

/// One projected table row. Serializes as a positional tuple in [`TableColumn::ALL`] order.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub household: HouseholdId,
    pub basket: BasketId,
    pub date: String,
    pub product: i64,
    pub department: String,
    pub commodity: String,
    pub spend: f64,
    pub units: i64,
    pub store_region: String,
    pub week: i64,
    pub year: i64,
}

impl From<&TransactionLine> for TableRow {
    fn from(line: &TransactionLine) -> Self {
        Self {
            household: line.household,
            basket: line.basket,
            date: line.date.clone(),
            product: line.product,
            department: line.department.clone(),
            commodity: line.commodity.clone(),
            spend: line.spend,
            units: line.units,
            store_region: line.store_region.clone(),
            week: line.week,
            year: line.year,
        }
    }
}

impl Serialize for TableRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(TableColumn::ALL.len())?;
        tuple.serialize_element(&self.household)?;
        tuple.serialize_element(&self.basket)?;
        tuple.serialize_element(&self.date)?;
        tuple.serialize_element(&self.product)?;
        tuple.serialize_element(&self.department)?;
        tuple.serialize_element(&self.commodity)?;
        tuple.serialize_element(&self.spend)?;
        tuple.serialize_element(&self.units)?;
        tuple.serialize_element(&self.store_region)?;
        tuple.serialize_element(&self.week)?;
        tuple.serialize_element(&self.year)?;
        tuple.end()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TableQueryResult {
    #[serde(rename = "data")]
    pub rows: Vec<TableRow>,
    /// Rows matching the filter, before paging.
    pub total: usize,
}

pub fn query_table(store: &RecordStore, query: &TableQuery) -> TableQueryResult {
    let lines = store.lines();
    let mut rows: Vec<usize> = match query.household {
        Some(household) => store.filter_household(household),
        None => (0..lines.len()).collect(),
    };
    let total = rows.len();

    if let Some(sort) = query.sort {
        // Stable: ties keep store order, which keeps consecutive pages disjoint.
        rows.sort_by(|&a, &b| sort.compare(&lines[a], &lines[b]));
    }

    let window = match query.page {
        Some(page) => {
            let begin = page.start.min(total);
            let end = begin.saturating_add(page.length).min(total);
            &rows[begin..end]
        }
        None => &rows[..],
    };

    log::debug!(
        "table query household={:?} sort={:?} page={:?}: {} of {} rows",
        query.household,
        query.sort,
        query.page,
        window.len(),
        total
    );

    TableQueryResult {
        rows: window.iter().map(|&row| TableRow::from(&lines[row])).collect(),
        total,
    }
}
