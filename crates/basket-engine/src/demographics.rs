use crate::household::HouseholdAggregate;
use basket_model::{Demographics, HouseholdId, TransactionLine};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One distinct (household, demographic tuple) observed in the records.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DemographicProfile {
    pub household: HouseholdId,
    pub demographics: Demographics,
}

/// A household that carries more than one distinct demographic tuple.
///
/// Each tuple joins to the same household aggregate, so that household's spend is counted once
/// per tuple in segment totals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DataIntegrityWarning {
    pub household: HouseholdId,
    pub profiles: usize,
}

/// A demographic profile enriched with its household's spend summary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JoinedHousehold {
    pub household: HouseholdId,
    pub demographics: Demographics,
    pub avg_spend_per_basket: f64,
    pub avg_items_per_basket: f64,
    pub total_spent: f64,
    pub total_transactions: u64,
}

/// Distinct demographic tuples per household, ordered by (household, tuple).
pub fn demographic_profiles(lines: &[TransactionLine]) -> Vec<DemographicProfile> {
    let mut seen: HashSet<(HouseholdId, &Demographics)> = HashSet::new();
    let mut out = Vec::new();
    for line in lines {
        if seen.insert((line.household, &line.demographics)) {
            out.push(DemographicProfile {
                household: line.household,
                demographics: line.demographics.clone(),
            });
        }
    }
    out.sort();
    out
}

/// Households with conflicting demographic tuples. Expects `profiles` ordered by household.
pub fn integrity_warnings(profiles: &[DemographicProfile]) -> Vec<DataIntegrityWarning> {
    let mut out = Vec::new();
    for run in profiles.chunk_by(|a, b| a.household == b.household) {
        if run.len() > 1 {
            out.push(DataIntegrityWarning {
                household: run[0].household,
                profiles: run.len(),
            });
        }
    }
    out
}

/// Inner join on household. Profiles without a household aggregate (and aggregates without a
/// profile) are dropped.
pub fn join_households(
    profiles: &[DemographicProfile],
    households: &[HouseholdAggregate],
) -> Vec<JoinedHousehold> {
    let by_household: HashMap<HouseholdId, &HouseholdAggregate> =
        households.iter().map(|h| (h.household, h)).collect();

    profiles
        .iter()
        .filter_map(|profile| {
            let agg = by_household.get(&profile.household)?;
            Some(JoinedHousehold {
                household: profile.household,
                demographics: profile.demographics.clone(),
                avg_spend_per_basket: agg.avg_spend_per_basket,
                avg_items_per_basket: agg.avg_items_per_basket,
                total_spent: agg.total_spent,
                total_transactions: agg.total_transactions,
            })
        })
        .collect()
}
