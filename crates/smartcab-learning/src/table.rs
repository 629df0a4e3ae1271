//! Dense policy table: one row of action values per encoded state.

use crate::state::{StateIndex, STATE_COUNT};
use serde::Serialize;
use smartcab_core::Action;

pub type Row = [f64; Action::COUNT];

/// Zero-initialised `STATE_COUNT × 4` matrix of action-value estimates.
///
/// The table lives on the heap as one boxed slice and never changes shape. State
/// indices come from [`crate::state::encode`], which only produces values in
/// range, so indexing with anything else is a caller bug and panics.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTable {
    rows: Box<[Row]>,
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![[0.0; Action::COUNT]; STATE_COUNT].into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn get(&self, state: StateIndex, action: Action) -> f64 {
        self.rows[state][action.index()]
    }

    pub fn set(&mut self, state: StateIndex, action: Action, value: f64) {
        self.rows[state][action.index()] = value;
    }

    #[must_use]
    pub fn row(&self, state: StateIndex) -> &Row {
        &self.rows[state]
    }

    /// True while every entry of the row still holds its initial zero.
    #[must_use]
    pub fn is_uninformed(&self, state: StateIndex) -> bool {
        self.rows[state].iter().all(|&v| v == 0.0)
    }

    /// Highest-valued action of the row; ties go to the lowest column.
    #[must_use]
    pub fn greedy_action(&self, state: StateIndex) -> Action {
        let row = &self.rows[state];
        let mut best = 0;
        for (i, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// Maximum over every cell of the table.
    #[must_use]
    pub fn global_max(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| row.iter().copied())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of rows that have moved away from all-zero.
    #[must_use]
    pub fn visited_states(&self) -> usize {
        (0..STATE_COUNT).filter(|&s| !self.is_uninformed(s)).count()
    }

    /// Informed rows with their values and greedy action, in state order.
    #[must_use]
    pub fn entries(&self) -> Vec<TableEntry> {
        (0..STATE_COUNT)
            .filter(|&s| !self.is_uninformed(s))
            .map(|state| TableEntry {
                state,
                values: self.rows[state],
                best: self.greedy_action(state),
            })
            .collect()
    }
}

/// One informed row of the table, as exported in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableEntry {
    pub state: StateIndex,
    pub values: Row,
    pub best: Action,
}
