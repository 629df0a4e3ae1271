//! Temporal-difference update of a single table cell.

use crate::state::StateIndex;
use crate::table::PolicyTable;
use smartcab_core::Action;

/// `Q[s][a] ← (1-α)·Q[s][a] + α·(reward + γ·max(Q))` and returns the new value.
///
/// The future term is the maximum over the whole table, not over the successor
/// state's row. With the default `γ = 0` it vanishes and the agent learns the
/// immediate reward of each (state, action) pair, i.e. a contextual bandit.
pub fn td_update(
    table: &mut PolicyTable,
    state: StateIndex,
    action: Action,
    reward: f64,
    alpha: f64,
    gamma: f64,
) -> f64 {
    let future = if gamma == 0.0 {
        0.0
    } else {
        gamma * table.global_max()
    };
    let old = table.get(state, action);
    let new = (1.0 - alpha) * old + alpha * (reward + future);
    table.set(state, action, new);
    new
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn zero_alpha_leaves_cell_unchanged() {
        let mut table = PolicyTable::new();
        table.set(12, Action::Left, 0.75);
        let v = td_update(&mut table, 12, Action::Left, 5.0, 0.0, 0.0);
        assert!(approx(v, 0.75));
        assert!(approx(table.get(12, Action::Left), 0.75));
    }

    #[test]
    fn fresh_cell_moves_toward_reward() {
        let mut table = PolicyTable::new();
        let v = td_update(&mut table, 0, Action::Forward, 2.0, 0.9, 0.0);
        assert!(approx(v, 1.8));
    }

    #[test]
    fn only_target_cell_changes() {
        let mut table = PolicyTable::new();
        let before = table.clone();
        td_update(&mut table, 194, Action::Forward, -1.0, 0.9, 0.0);
        assert!(approx(table.get(194, Action::Forward), -0.9));
        table.set(194, Action::Forward, 0.0);
        assert_eq!(table, before);
    }

    #[test]
    fn future_term_uses_global_maximum() {
        let mut table = PolicyTable::new();
        table.set(300, Action::Right, 4.0);
        // (1-0.5)*0 + 0.5*(1 + 0.5*4) = 1.5
        let v = td_update(&mut table, 1, Action::Idle, 1.0, 0.5, 0.5);
        assert!(approx(v, 1.5));
    }

    #[test]
    fn negative_alpha_pushes_away_from_reward() {
        let mut table = PolicyTable::new();
        let v = td_update(&mut table, 2, Action::Left, 2.0, -0.1, 0.0);
        assert!(approx(v, -0.2));
    }
}
