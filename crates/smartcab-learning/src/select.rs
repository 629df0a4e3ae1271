//! Exploration/exploitation rule.

use crate::state::StateIndex;
use crate::table::PolicyTable;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smartcab_core::event::Choice;
use smartcab_core::Action;

/// Threshold the scaled draw `r * ε` must exceed before the selector explores.
///
/// With `r` uniform on `[0, 1)` the chance to explore is `1 - 0.1/ε` for
/// `ε > 0.1` and zero otherwise, so exploration fades out well before `ε` does.
/// A non-positive `ε` (past the training horizon) never explores.
pub const EXPLORATION_GATE: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub action: Action,
    pub choice: Choice,
}

/// Picks actions from table rows, owning the only random source of the agent.
#[derive(Debug, Clone)]
pub struct ActionSelector {
    rng: StdRng,
}

impl ActionSelector {
    /// A selector seeded from `seed`, or from OS entropy when `None`.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn select(&mut self, state: StateIndex, table: &PolicyTable, epsilon: f64) -> Selection {
        let r: f64 = self.rng.gen();
        if r * epsilon > EXPLORATION_GATE {
            return Selection {
                action: self.random_action(),
                choice: Choice::Explore,
            };
        }
        if table.is_uninformed(state) {
            return Selection {
                action: self.random_action(),
                choice: Choice::Uninformed,
            };
        }
        Selection {
            action: table.greedy_action(state),
            choice: Choice::Greedy,
        }
    }

    fn random_action(&mut self) -> Action {
        Action::ALL[self.rng.gen_range(0..Action::COUNT)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const DRAWS: usize = 8_000;

    #[test]
    fn zero_epsilon_never_explores() {
        let mut selector = ActionSelector::new(Some(7));
        let mut table = PolicyTable::new();
        table.set(3, Action::Right, 0.5);
        for _ in 0..1_000 {
            let s = selector.select(3, &table, 0.0);
            assert_eq!(s.choice, Choice::Greedy);
            assert_eq!(s.action, Action::Right);
        }
    }

    #[test]
    fn negative_epsilon_behaves_like_zero() {
        let mut selector = ActionSelector::new(Some(8));
        let mut table = PolicyTable::new();
        table.set(9, Action::Left, 2.0);
        for _ in 0..1_000 {
            assert_eq!(selector.select(9, &table, -0.4).choice, Choice::Greedy);
        }
    }

    #[test]
    fn epsilon_at_gate_never_explores() {
        // r < 1, so r * 0.1 < 0.1 always.
        let mut selector = ActionSelector::new(Some(9));
        let table = PolicyTable::new();
        for _ in 0..1_000 {
            assert_ne!(selector.select(0, &table, 0.1).choice, Choice::Explore);
        }
    }

    #[test]
    fn tie_break_picks_lowest_index() {
        let mut selector = ActionSelector::new(Some(1));
        let mut table = PolicyTable::new();
        table.set(40, Action::Left, 1.0);
        table.set(40, Action::Forward, 1.0);
        for _ in 0..500 {
            assert_eq!(selector.select(40, &table, 0.0).action, Action::Left);
        }
    }

    #[test]
    fn uninformed_row_samples_every_action_uniformly() {
        let mut selector = ActionSelector::new(Some(42));
        let table = PolicyTable::new();
        let mut counts: HashMap<Action, usize> = HashMap::new();
        for _ in 0..DRAWS {
            let s = selector.select(17, &table, 0.0);
            assert_eq!(s.choice, Choice::Uninformed);
            *counts.entry(s.action).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), Action::COUNT);
        let expected = DRAWS / Action::COUNT;
        for (action, n) in counts {
            assert!(
                n.abs_diff(expected) < expected / 10,
                "{action} drawn {n} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn exploration_rate_follows_scaled_gate() {
        let mut selector = ActionSelector::new(Some(5));
        let mut table = PolicyTable::new();
        table.set(0, Action::Idle, 1.0);
        let epsilon = 1.2;
        let explored = (0..DRAWS)
            .filter(|_| selector.select(0, &table, epsilon).choice == Choice::Explore)
            .count();
        #[allow(clippy::cast_precision_loss)]
        let rate = explored as f64 / DRAWS as f64;
        let expected = 1.0 - EXPLORATION_GATE / epsilon;
        assert!((rate - expected).abs() < 0.03, "rate {rate} vs {expected}");
    }

    #[test]
    fn seeded_selectors_agree() {
        let table = PolicyTable::new();
        let mut a = ActionSelector::new(Some(99));
        let mut b = ActionSelector::new(Some(99));
        for _ in 0..200 {
            assert_eq!(a.select(0, &table, 1.0), b.select(0, &table, 1.0));
        }
    }
}
