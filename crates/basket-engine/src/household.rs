use crate::basket::BasketAggregate;
use basket_model::HouseholdId;
use serde::Serialize;
use std::collections::HashMap;

/// Per-household summary computed over basket aggregates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HouseholdAggregate {
    pub household: HouseholdId,
    pub avg_spend_per_basket: f64,
    pub avg_items_per_basket: f64,
    pub total_spent: f64,
    /// Number of distinct baskets.
    pub total_transactions: u64,
}

#[derive(Default)]
struct HouseholdAcc {
    spend: f64,
    items: u64,
    baskets: u64,
}

/// Group basket aggregates by household, ordered by household.
///
/// Averages are taken over baskets, so a household with baskets of 10 and 2 items averages 6
/// items regardless of how the lines were distributed.
pub fn aggregate_households(baskets: &[BasketAggregate]) -> Vec<HouseholdAggregate> {
    let mut groups: HashMap<HouseholdId, HouseholdAcc> = HashMap::new();
    for basket in baskets {
        let acc = groups.entry(basket.household).or_default();
        acc.spend += basket.total_spend;
        acc.items += basket.item_count;
        acc.baskets += 1;
    }

    let mut out: Vec<HouseholdAggregate> = groups
        .into_iter()
        .map(|(household, acc)| {
            // Every group has at least one basket.
            let n = acc.baskets as f64;
            HouseholdAggregate {
                household,
                avg_spend_per_basket: acc.spend / n,
                avg_items_per_basket: acc.items as f64 / n,
                total_spent: acc.spend,
                total_transactions: acc.baskets,
            }
        })
        .collect();
    out.sort_by_key(|h| h.household);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basket(household: i64, basket: i64, total_spend: f64, item_count: u64) -> BasketAggregate {
        BasketAggregate {
            household,
            basket,
            total_spend,
            item_count,
        }
    }

    #[test]
    fn averages_are_per_basket_not_per_line() {
        let households =
            aggregate_households(&[basket(7, 1, 20.0, 10), basket(7, 2, 4.0, 2)]);
        assert_eq!(households.len(), 1);
        let h = &households[0];
        assert_eq!(h.avg_items_per_basket, 6.0);
        assert_eq!(h.avg_spend_per_basket, 12.0);
        assert_eq!(h.total_spent, 24.0);
        assert_eq!(h.total_transactions, 2);
    }

    #[test]
    fn output_is_ordered_by_household() {
        let households = aggregate_households(&[
            basket(9, 1, 1.0, 1),
            basket(3, 1, 1.0, 1),
            basket(5, 1, 1.0, 1),
        ]);
        let ids: Vec<_> = households.iter().map(|h| h.household).collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }
}
