use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

pub type HouseholdId = i64;
pub type BasketId = i64;

/// Composite basket identity. Basket numbers are only unique within a household.
pub type BasketKey = (HouseholdId, BasketId);

/// Canonical token for a missing demographic value.
pub const NULL_TOKEN: &str = "null";

/// Display label used for [`NULL_TOKEN`] categories.
pub const NOT_AVAILABLE_LABEL: &str = "N/A";

/// A categorical demographic value.
///
/// The token is the grouping and ordering key. Missing values (an empty field or any casing of
/// `null`) are normalized to [`NULL_TOKEN`] so they form a single group; only [`Category::label`]
/// turns that token into [`NOT_AVAILABLE_LABEL`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(pub(crate) Arc<str>);

impl Category {
    pub fn new(token: &str) -> Self {
        let token = token.trim();
        if Self::is_null_token(token) {
            return Self::null();
        }
        Self(Arc::from(token))
    }

    /// Wrap an already-interned token. Used by the CSV loader to share allocations.
    pub(crate) fn from_interned(token: Arc<str>) -> Self {
        Self(token)
    }

    pub(crate) fn is_null_token(token: &str) -> bool {
        token.is_empty() || token.eq_ignore_ascii_case(NULL_TOKEN)
    }

    pub fn null() -> Self {
        Self(Arc::from(NULL_TOKEN))
    }

    pub fn token(&self) -> &str {
        &self.0
    }

    pub fn is_null(&self) -> bool {
        self.token() == NULL_TOKEN
    }

    pub fn label(&self) -> &str {
        if self.is_null() {
            NOT_AVAILABLE_LABEL
        } else {
            self.token()
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::null()
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.token())
    }
}

/// Household-level demographic attributes attached to every transaction line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Demographics {
    pub age_range: Category,
    pub marital_status: Category,
    pub income_range: Category,
    pub homeowner: Category,
    pub children: Category,
}

/// One purchased line item.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionLine {
    pub household: HouseholdId,
    pub basket: BasketId,
    /// Purchase date as it appears in the source export.
    pub date: String,
    pub product: i64,
    pub department: String,
    pub commodity: String,
    pub spend: f64,
    pub units: i64,
    pub store_region: String,
    pub week: i64,
    pub year: i64,
    pub demographics: Demographics,
}

impl TransactionLine {
    pub fn basket_key(&self) -> BasketKey {
        (self.household, self.basket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_tokens_collapse_to_null() {
        for raw in ["", "  ", "null", "NULL", "Null", " null "] {
            let category = Category::new(raw);
            assert!(category.is_null(), "{raw:?} should be null");
            assert_eq!(category.token(), NULL_TOKEN);
            assert_eq!(category.label(), NOT_AVAILABLE_LABEL);
        }
    }

    #[test]
    fn present_tokens_are_trimmed_and_kept() {
        let category = Category::new(" 35-44 ");
        assert!(!category.is_null());
        assert_eq!(category.token(), "35-44");
        assert_eq!(category.label(), "35-44");
        assert_eq!(category.to_string(), "35-44");
    }

    #[test]
    fn ordering_follows_the_token_not_the_label() {
        // Lowercase `null` sorts after uppercase and digit-leading tokens.
        let mut values = vec![
            Category::null(),
            Category::new("Single"),
            Category::new("19-24"),
            Category::new("Married"),
        ];
        values.sort();
        let labels: Vec<&str> = values.iter().map(Category::label).collect();
        assert_eq!(labels, vec!["19-24", "Married", "Single", "N/A"]);
    }
}
