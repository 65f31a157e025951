use basket_model::{BasketId, HouseholdId};

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid parameter {parameter}: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("non-finite spend {spend} on row {row} (household {household}, basket {basket})")]
    NonFiniteSpend {
        row: usize,
        household: HouseholdId,
        basket: BasketId,
        spend: f64,
    },
}

impl EngineError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            parameter,
            reason: reason.into(),
        }
    }
}
