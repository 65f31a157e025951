#![allow(dead_code)]

use basket_engine::{Category, Demographics, TransactionLine};

/// Builder for transaction lines with neutral defaults.
pub struct Line(TransactionLine);

impl Line {
    pub fn new(household: i64, basket: i64, spend: f64) -> Self {
        Self(TransactionLine {
            household,
            basket,
            date: "01-JAN-20".to_string(),
            product: 1,
            department: "FOOD".to_string(),
            commodity: "GROCERY".to_string(),
            spend,
            units: 1,
            store_region: "EAST".to_string(),
            week: 1,
            year: 2020,
            demographics: Demographics::default(),
        })
    }

    pub fn units(mut self, units: i64) -> Self {
        self.0.units = units;
        self
    }

    pub fn product(mut self, product: i64) -> Self {
        self.0.product = product;
        self
    }

    pub fn week(mut self, week: i64) -> Self {
        self.0.week = week;
        self
    }

    pub fn age(mut self, token: &str) -> Self {
        self.0.demographics.age_range = Category::new(token);
        self
    }

    pub fn marital(mut self, token: &str) -> Self {
        self.0.demographics.marital_status = Category::new(token);
        self
    }

    pub fn income(mut self, token: &str) -> Self {
        self.0.demographics.income_range = Category::new(token);
        self
    }

    pub fn children(mut self, token: &str) -> Self {
        self.0.demographics.children = Category::new(token);
        self
    }

    pub fn build(self) -> TransactionLine {
        self.0
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}
