use basket_model::{HouseholdId, TransactionLine};
use std::sync::Arc;

/// The raw transaction-line table.
///
/// Rows keep their load order; that order is the "natural" order of unsorted table queries.
#[derive(Clone, Debug)]
pub struct RecordStore {
    lines: Arc<[TransactionLine]>,
}

impl RecordStore {
    pub fn new(lines: Vec<TransactionLine>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    pub fn lines(&self) -> &[TransactionLine] {
        &self.lines
    }

    pub fn row_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, row: usize) -> Option<&TransactionLine> {
        self.lines.get(row)
    }

    /// Rows whose household equals `household`, in store order.
    pub fn filter_household(&self, household: HouseholdId) -> Vec<usize> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| line.household == household)
            .map(|(row, _)| row)
            .collect()
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<TransactionLine>> for RecordStore {
    fn from(lines: Vec<TransactionLine>) -> Self {
        Self::new(lines)
    }
}
