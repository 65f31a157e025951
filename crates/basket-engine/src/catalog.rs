use crate::basket::{aggregate_baskets, BasketAggregate};
use crate::demographics::{
    demographic_profiles, integrity_warnings, join_households, DataIntegrityWarning,
    DemographicProfile, JoinedHousehold,
};
use crate::error::{EngineError, EngineResult};
use crate::household::{aggregate_households, HouseholdAggregate};
use crate::segment::{
    build_segment_charts, summarize_segments, SegmentAttribute, SegmentCharts, SegmentSummary,
};
use crate::store::RecordStore;
use crate::table::{query_table, TableQuery, TableQueryParams, TableQueryResult, TableRow};
use basket_model::{HouseholdId, TransactionLine};
use serde::Serialize;
use std::sync::{Arc, RwLock};

/// The record store plus every aggregate derived from it.
///
/// Built once and never mutated; share it by reference (or through [`CatalogHandle`]) across any
/// number of request threads.
#[derive(Debug)]
pub struct Catalog {
    store: RecordStore,
    baskets: Vec<BasketAggregate>,
    households: Vec<HouseholdAggregate>,
    profiles: Vec<DemographicProfile>,
    joined: Vec<JoinedHousehold>,
    warnings: Vec<DataIntegrityWarning>,
}

/// All segment charts shown on the dashboard page, in display order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Dashboard {
    pub panels: Vec<SegmentCharts>,
}

impl Dashboard {
    pub fn panel(&self, attribute: SegmentAttribute) -> Option<&SegmentCharts> {
        self.panels.iter().find(|p| p.attribute == attribute)
    }
}

impl Catalog {
    /// Run the aggregation pipeline over `lines`.
    ///
    /// Fails without producing a catalog if any line carries a non-finite spend.
    pub fn build(lines: Vec<TransactionLine>) -> EngineResult<Self> {
        if let Some((row, line)) = lines
            .iter()
            .enumerate()
            .find(|(_, line)| !line.spend.is_finite())
        {
            return Err(EngineError::NonFiniteSpend {
                row,
                household: line.household,
                basket: line.basket,
                spend: line.spend,
            });
        }

        let store = RecordStore::new(lines);
        let baskets = aggregate_baskets(store.lines());
        let households = aggregate_households(&baskets);
        let profiles = demographic_profiles(store.lines());
        let warnings = integrity_warnings(&profiles);
        let joined = join_households(&profiles, &households);

        for warning in &warnings {
            log::warn!(
                "household {} has {} distinct demographic profiles; its spend is counted once per profile in segment totals",
                warning.household,
                warning.profiles
            );
        }
        log::info!(
            "catalog built: {} lines, {} baskets, {} households, {} joined rows, {} integrity warnings",
            store.row_count(),
            baskets.len(),
            households.len(),
            joined.len(),
            warnings.len()
        );

        Ok(Self {
            store,
            baskets,
            households,
            profiles,
            joined,
            warnings,
        })
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn baskets(&self) -> &[BasketAggregate] {
        &self.baskets
    }

    pub fn households(&self) -> &[HouseholdAggregate] {
        &self.households
    }

    pub fn household(&self, household: HouseholdId) -> Option<&HouseholdAggregate> {
        self.households
            .binary_search_by_key(&household, |h| h.household)
            .ok()
            .map(|idx| &self.households[idx])
    }

    pub fn profiles(&self) -> &[DemographicProfile] {
        &self.profiles
    }

    pub fn joined(&self) -> &[JoinedHousehold] {
        &self.joined
    }

    pub fn integrity_warnings(&self) -> &[DataIntegrityWarning] {
        &self.warnings
    }

    pub fn segment_summaries(&self, attribute: SegmentAttribute) -> Vec<SegmentSummary> {
        summarize_segments(&self.joined, attribute)
    }

    pub fn segment_charts(&self, attribute: SegmentAttribute, title: &str) -> SegmentCharts {
        build_segment_charts(attribute, title, self.segment_summaries(attribute))
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            panels: SegmentAttribute::ALL
                .into_iter()
                .map(|attribute| self.segment_charts(attribute, attribute.default_title()))
                .collect(),
        }
    }

    /// Validate `params` and run the table query. Invalid parameters are rejected before any
    /// rows are scanned.
    pub fn query_table(&self, params: &TableQueryParams) -> EngineResult<TableQueryResult> {
        let query = TableQuery::from_params(params)?;
        Ok(query_table(&self.store, &query))
    }

    /// The full, unpaged table projection in store order.
    pub fn table_rows(&self) -> Vec<TableRow> {
        self.store.lines().iter().map(TableRow::from).collect()
    }
}

/// Shared access to the current catalog snapshot.
///
/// Readers take an `Arc` to the snapshot that is current at that moment; [`CatalogHandle::replace`]
/// swaps in a fully built catalog, so no reader ever observes a partial rebuild.
#[derive(Debug)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&guard)
    }

    /// Install `catalog` as the current snapshot and return the previous one.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}
