use basket_model::{BasketId, BasketKey, HouseholdId, TransactionLine};
use serde::Serialize;
use std::collections::HashMap;

/// Spend and line count of one (household, basket) pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BasketAggregate {
    pub household: HouseholdId,
    pub basket: BasketId,
    pub total_spend: f64,
    /// Number of lines in the basket. Unit quantities are not summed here.
    pub item_count: u64,
}

impl BasketAggregate {
    pub fn key(&self) -> BasketKey {
        (self.household, self.basket)
    }
}

/// Group lines by (household, basket), ordered by that key.
pub fn aggregate_baskets(lines: &[TransactionLine]) -> Vec<BasketAggregate> {
    let mut slots: HashMap<BasketKey, usize> = HashMap::new();
    let mut out: Vec<BasketAggregate> = Vec::new();

    for line in lines {
        let key = line.basket_key();
        let slot = *slots.entry(key).or_insert_with(|| {
            out.push(BasketAggregate {
                household: key.0,
                basket: key.1,
                total_spend: 0.0,
                item_count: 0,
            });
            out.len() - 1
        });

        let agg = &mut out[slot];
        agg.total_spend += line.spend;
        agg.item_count += 1;
    }

    out.sort_by_key(BasketAggregate::key);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use basket_model::Demographics;

    fn line(household: i64, basket: i64, spend: f64, units: i64) -> TransactionLine {
        TransactionLine {
            household,
            basket,
            date: String::new(),
            product: 0,
            department: String::new(),
            commodity: String::new(),
            spend,
            units,
            store_region: String::new(),
            week: 0,
            year: 0,
            demographics: Demographics::default(),
        }
    }

    #[test]
    fn empty_input_yields_no_baskets() {
        assert!(aggregate_baskets(&[]).is_empty());
    }

    #[test]
    fn item_count_ignores_units() {
        let lines = vec![line(1, 100, 5.0, 12), line(1, 100, 3.0, 4)];
        let baskets = aggregate_baskets(&lines);
        assert_eq!(baskets.len(), 1);
        assert_eq!(baskets[0].item_count, 2);
        assert_eq!(baskets[0].total_spend, 8.0);
    }

    #[test]
    fn basket_numbers_are_scoped_to_their_household() {
        let lines = vec![line(2, 100, 1.0, 1), line(1, 100, 4.0, 1), line(2, 100, 2.0, 1)];
        let baskets = aggregate_baskets(&lines);
        let keys: Vec<_> = baskets.iter().map(BasketAggregate::key).collect();
        assert_eq!(keys, vec![(1, 100), (2, 100)]);
        assert_eq!(baskets[0].total_spend, 4.0);
        assert_eq!(baskets[1].total_spend, 3.0);
        assert_eq!(baskets[1].item_count, 2);
    }
}
