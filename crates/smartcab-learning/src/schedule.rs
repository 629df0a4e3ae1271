//! Per-trial decay of the exploration and learning rates.

use serde::Serialize;

const EPSILON_SCALE: f64 = 1.2;
const EPSILON_POWER: i32 = 5;
const ALPHA_SCALE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rates {
    pub epsilon: f64,
    pub alpha: f64,
}

/// Trial counter plus the rates derived from it.
///
/// `epsilon = 1.2 * ((N - t) / N)^5` and `alpha = 0.9 * (N - t) / N` where `N` is
/// the planned number of trials and `t` the current trial. Both reach zero at
/// `t = N` and keep falling (negative) afterwards; nothing is clamped.
#[derive(Debug, Clone)]
pub struct DecaySchedule {
    num_trials: u32,
    trial: u32,
    rates: Rates,
}

impl DecaySchedule {
    /// `num_trials` must be non-zero; [`crate::AgentConfig::validate`] enforces it.
    #[must_use]
    pub fn new(num_trials: u32) -> Self {
        Self {
            num_trials,
            trial: 0,
            rates: Self::rates_at(num_trials, 0),
        }
    }

    /// Rates for trial `trial` of a run planned for `num_trials` trials.
    #[must_use]
    pub fn rates_at(num_trials: u32, trial: u32) -> Rates {
        let remaining = (f64::from(num_trials) - f64::from(trial)) / f64::from(num_trials);
        Rates {
            epsilon: EPSILON_SCALE * remaining.powi(EPSILON_POWER),
            alpha: ALPHA_SCALE * remaining,
        }
    }

    /// Moves to the next trial and returns its rates.
    pub fn advance(&mut self) -> Rates {
        self.trial = self.trial.saturating_add(1);
        self.rates = Self::rates_at(self.num_trials, self.trial);
        self.rates
    }

    #[must_use]
    pub fn trial(&self) -> u32 {
        self.trial
    }

    #[must_use]
    pub fn num_trials(&self) -> u32 {
        self.num_trials
    }

    #[must_use]
    pub fn rates(&self) -> Rates {
        self.rates
    }

    #[must_use]
    pub fn past_horizon(&self) -> bool {
        self.trial > self.num_trials
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_start_at_full_scale() {
        let schedule = DecaySchedule::new(100);
        assert_eq!(schedule.trial(), 0);
        assert!((schedule.rates().epsilon - 1.2).abs() < 1e-12);
        assert!((schedule.rates().alpha - 0.9).abs() < 1e-12);
    }

    #[test]
    fn rates_are_non_increasing_and_vanish_at_horizon() {
        let n = 50;
        let mut schedule = DecaySchedule::new(n);
        let mut prev = schedule.rates();
        for t in 1..=n {
            let rates = schedule.advance();
            assert_eq!(schedule.trial(), t);
            assert!(rates.epsilon <= prev.epsilon);
            assert!(rates.alpha <= prev.alpha);
            prev = rates;
        }
        assert!(prev.epsilon <= 0.0);
        assert!(prev.alpha <= 0.0);
        assert!(!schedule.past_horizon());
    }

    #[test]
    fn known_values() {
        let r = DecaySchedule::rates_at(10, 5);
        assert!((r.alpha - 0.45).abs() < 1e-12);
        assert!((r.epsilon - 1.2 * 0.5f64.powi(5)).abs() < 1e-12);
    }

    #[test]
    fn rates_go_negative_past_horizon() {
        let mut schedule = DecaySchedule::new(4);
        for _ in 0..6 {
            schedule.advance();
        }
        assert!(schedule.past_horizon());
        let r = schedule.rates();
        // (4 - 6) / 4 = -0.5
        assert!((r.alpha + 0.45).abs() < 1e-12);
        assert!((r.epsilon + 1.2 * 0.5f64.powi(5)).abs() < 1e-12);
    }
}
