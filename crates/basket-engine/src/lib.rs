//! Aggregation and query engine for household purchase analytics.
//!
//! The pipeline runs once over an immutable [`RecordStore`]:
//! - transaction lines -> [`BasketAggregate`] (per household/basket)
//! - baskets -> [`HouseholdAggregate`] (per household)
//! - distinct demographic tuples joined with household aggregates -> [`JoinedHousehold`]
//!
//! The precomputed results live in a [`Catalog`]. Per-request work (segment charts, paged table
//! queries) reads the catalog without mutating it.

#![forbid(unsafe_code)]

mod basket;
mod catalog;
mod demographics;
mod error;
mod household;
mod segment;
mod store;
mod table;

pub use crate::basket::{aggregate_baskets, BasketAggregate};
pub use crate::catalog::{Catalog, CatalogHandle, Dashboard};
pub use crate::demographics::{
    demographic_profiles, integrity_warnings, join_households, DataIntegrityWarning,
    DemographicProfile, JoinedHousehold,
};
pub use crate::error::{EngineError, EngineResult};
pub use crate::household::{aggregate_households, HouseholdAggregate};
pub use crate::segment::{
    build_segment_charts, summarize_segments, ChartKind, ChartPoint, ChartSeries, SegmentAttribute,
    SegmentCharts, SegmentSummary,
};
pub use crate::store::RecordStore;
pub use crate::table::{
    query_table, Page, SortSpec, TableColumn, TableQuery, TableQueryParams, TableQueryResult,
    TableRow,
};

pub use basket_model::{Category, Demographics, HouseholdId, TransactionLine};
