use crate::demographics::JoinedHousehold;
use crate::error::{EngineError, EngineResult};
use basket_model::{Category, Demographics};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Demographic attributes that segment charts can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentAttribute {
    AgeRange,
    MaritalStatus,
    IncomeRange,
    Children,
}

impl SegmentAttribute {
    pub const ALL: [SegmentAttribute; 4] = [
        SegmentAttribute::AgeRange,
        SegmentAttribute::MaritalStatus,
        SegmentAttribute::IncomeRange,
        SegmentAttribute::Children,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SegmentAttribute::AgeRange => "age_range",
            SegmentAttribute::MaritalStatus => "marital_status",
            SegmentAttribute::IncomeRange => "income_range",
            SegmentAttribute::Children => "children",
        }
    }

    /// Title used on the dashboard page.
    pub fn default_title(self) -> &'static str {
        match self {
            SegmentAttribute::AgeRange => "Age",
            SegmentAttribute::MaritalStatus => "Marital Status",
            SegmentAttribute::IncomeRange => "Income Range",
            SegmentAttribute::Children => "Number of Children",
        }
    }

    pub fn category(self, demographics: &Demographics) -> &Category {
        match self {
            SegmentAttribute::AgeRange => &demographics.age_range,
            SegmentAttribute::MaritalStatus => &demographics.marital_status,
            SegmentAttribute::IncomeRange => &demographics.income_range,
            SegmentAttribute::Children => &demographics.children,
        }
    }
}

impl fmt::Display for SegmentAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SegmentAttribute {
    type Err = EngineError;

    /// Accepts the snake_case names as well as the source export's column headers.
    fn from_str(s: &str) -> EngineResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "age_range" => Ok(SegmentAttribute::AgeRange),
            "marital_status" | "marital" => Ok(SegmentAttribute::MaritalStatus),
            "income_range" => Ok(SegmentAttribute::IncomeRange),
            "children" => Ok(SegmentAttribute::Children),
            _ => Err(EngineError::invalid(
                "attribute",
                format!("unknown segment attribute {s:?}"),
            )),
        }
    }
}

/// Aggregates for one category of a [`SegmentAttribute`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub category: Category,
    /// Display label; the null category is shown as `N/A`.
    pub label: String,
    /// Joined rows in the segment (one per household unless its demographics conflict).
    pub households: usize,
    pub avg_spend_per_basket: f64,
    pub avg_items_per_basket: f64,
    pub total_transactions: u64,
    pub total_spent: f64,
}

#[derive(Default)]
struct SegmentAcc {
    rows: usize,
    avg_spend_sum: f64,
    avg_items_sum: f64,
    transactions: u64,
    spent: f64,
}

/// Group the joined view by `attribute`, ordered ascending by category token.
///
/// Labels are assigned after sorting, so the null category keeps the position of its token.
pub fn summarize_segments(
    joined: &[JoinedHousehold],
    attribute: SegmentAttribute,
) -> Vec<SegmentSummary> {
    let mut groups: HashMap<&Category, SegmentAcc> = HashMap::new();
    for row in joined {
        let acc = groups
            .entry(attribute.category(&row.demographics))
            .or_default();
        acc.rows += 1;
        acc.avg_spend_sum += row.avg_spend_per_basket;
        acc.avg_items_sum += row.avg_items_per_basket;
        acc.transactions += row.total_transactions;
        acc.spent += row.total_spent;
    }

    let mut keyed: Vec<(&Category, SegmentAcc)> = groups.into_iter().collect();
    keyed.sort_by(|a, b| a.0.cmp(b.0));

    keyed
        .into_iter()
        .map(|(category, acc)| {
            let n = acc.rows as f64;
            SegmentSummary {
                category: category.clone(),
                label: category.label().to_string(),
                households: acc.rows,
                avg_spend_per_basket: acc.avg_spend_sum / n,
                avg_items_per_basket: acc.avg_items_sum / n,
                total_transactions: acc.transactions,
                total_spent: acc.spent,
            }
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Pie,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// A chart-ready series; turning it into plot markup is left to the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.label.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SegmentCharts {
    pub attribute: SegmentAttribute,
    pub title: String,
    pub segments: Vec<SegmentSummary>,
    /// Total spend per category.
    pub total_spent: ChartSeries,
    /// Each category's mean spend per basket as a share of the sum over all categories.
    pub avg_spend_share: ChartSeries,
}

pub fn build_segment_charts(
    attribute: SegmentAttribute,
    title: &str,
    segments: Vec<SegmentSummary>,
) -> SegmentCharts {
    let total_spent = ChartSeries {
        kind: ChartKind::Bar,
        title: format!("Total Spent By {title}"),
        points: segments
            .iter()
            .map(|s| ChartPoint {
                label: s.label.clone(),
                value: s.total_spent,
            })
            .collect(),
    };

    let denominator: f64 = segments.iter().map(|s| s.avg_spend_per_basket).sum();
    let share = |value: f64| {
        if denominator != 0.0 && denominator.is_finite() {
            value / denominator
        } else {
            0.0
        }
    };
    let avg_spend_share = ChartSeries {
        kind: ChartKind::Pie,
        title: format!("Average Spent Per Basket By {title}"),
        points: segments
            .iter()
            .map(|s| ChartPoint {
                label: s.label.clone(),
                value: share(s.avg_spend_per_basket),
            })
            .collect(),
    };

    SegmentCharts {
        attribute,
        title: title.to_string(),
        segments,
        total_spent,
        avg_spend_share,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_names_round_trip_through_from_str() {
        for attribute in SegmentAttribute::ALL {
            assert_eq!(attribute.name().parse::<SegmentAttribute>(), Ok(attribute));
        }
        assert_eq!("MARITAL".parse::<SegmentAttribute>(), Ok(SegmentAttribute::MaritalStatus));
        assert_eq!("INCOME_RANGE".parse::<SegmentAttribute>(), Ok(SegmentAttribute::IncomeRange));
    }

    #[test]
    fn unknown_attribute_is_an_invalid_parameter() {
        let err = "HOMEOWNER".parse::<SegmentAttribute>().unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidParameter {
                parameter: "attribute",
                ..
            }
        ));
    }

    #[test]
    fn zero_average_spend_yields_zero_shares() {
        let segments = vec![SegmentSummary {
            category: Category::new("1"),
            label: "1".to_string(),
            households: 1,
            avg_spend_per_basket: 0.0,
            avg_items_per_basket: 0.0,
            total_transactions: 1,
            total_spent: 0.0,
        }];
        let charts = build_segment_charts(SegmentAttribute::Children, "Kids", segments);
        assert_eq!(charts.avg_spend_share.values().collect::<Vec<_>>(), vec![0.0]);
        assert_eq!(charts.total_spent.title, "Total Spent By Kids");
        assert_eq!(
            charts.avg_spend_share.title,
            "Average Spent Per Basket By Kids"
        );
    }
}
