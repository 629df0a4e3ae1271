#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Retrospective analysis of training trials.
//!
//! The simulator hands back one [`TrialOutcome`] per trial. This crate folds
//! them into statistics, slices them into fixed-width windows to show the
//! learning curve, flags findings worth a look and packages everything as a
//! serialisable [`TrainingReport`]. It only reads outcomes; it never touches the
//! agent.

use serde::{Deserialize, Serialize};
use smartcab_core::TrialOutcome;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Trials per learning-curve window unless configured otherwise
pub const DEFAULT_WINDOW: usize = 10;

// Finding thresholds
/// Share of penalised steps (10%) above which the final window is flagged
const FINDING_HIGH_PENALTY_RATE: f64 = 0.1;
/// Success rate (80%) below which the final window is flagged
const FINDING_LOW_SUCCESS_RATE: f64 = 0.8;

/// Report format version
const REPORT_VERSION: &str = "0.1.0";
/// Fallback timestamp when formatting fails
const FALLBACK_TIMESTAMP: &str = "1970-01-01T00:00:00Z";

/// Statistics aggregated from trial outcomes.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeStatistics {
    pub trials: usize,
    /// Trials that reached their destination.
    pub reached: usize,
    pub total_reward: f64,
    pub penalties: u64,
    pub steps: u64,
}

impl OutcomeStatistics {
    /// Fraction of trials that reached the destination (0.0 to 1.0).
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.reached as f64 / self.trials as f64
        }
    }

    /// Average net reward per trial.
    #[must_use]
    pub fn average_reward(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.total_reward / self.trials as f64
        }
    }

    /// Fraction of steps that earned a negative reward.
    #[must_use]
    pub fn penalty_rate(&self) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.penalties as f64 / self.steps as f64
        }
    }

    #[must_use]
    pub fn average_steps(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.steps as f64 / self.trials as f64
        }
    }

    fn add(&mut self, outcome: &TrialOutcome) {
        self.trials += 1;
        if outcome.reached {
            self.reached += 1;
        }
        if outcome.net_reward.is_finite() {
            self.total_reward += outcome.net_reward;
        }
        self.penalties += u64::from(outcome.penalties);
        self.steps += u64::from(outcome.steps);
    }
}

/// Statistics of a contiguous range of trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    pub first_trial: u32,
    pub last_trial: u32,
    pub success_rate: f64,
    pub penalty_rate: f64,
    pub average_reward: f64,
    pub stats: OutcomeStatistics,
}

impl WindowStats {
    fn from_slice(outcomes: &[TrialOutcome]) -> Option<Self> {
        let first = outcomes.first()?;
        let last = outcomes.last()?;
        let stats = summarize(outcomes);
        Some(Self {
            first_trial: first.trial,
            last_trial: last.trial,
            success_rate: stats.success_rate(),
            penalty_rate: stats.penalty_rate(),
            average_reward: stats.average_reward(),
            stats,
        })
    }

    fn label(&self) -> String {
        format!("trials {}-{}", self.first_trial, self.last_trial)
    }
}

/// Summary of a whole training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Version of the report format
    pub version: String,
    /// Timestamp when the report was generated
    pub ts: String,
    pub overall: OutcomeStatistics,
    pub success_rate: f64,
    pub penalty_rate: f64,
    pub windows: Vec<WindowStats>,
    /// Human-readable observations about the run
    pub findings: Vec<String>,
    /// Opaque extra data supplied by the caller (e.g. the run configuration)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Folds every outcome into one set of statistics.
#[must_use]
pub fn summarize(outcomes: &[TrialOutcome]) -> OutcomeStatistics {
    let mut stats = OutcomeStatistics::default();
    for outcome in outcomes {
        stats.add(outcome);
    }
    stats
}

/// Analyzes trial outcomes in windows of fixed width.
#[derive(Debug)]
pub struct TrialAnalyzer {
    window: usize,
}

impl Default for TrialAnalyzer {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl TrialAnalyzer {
    /// Create an analyzer with `window` trials per window (at least one).
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
        }
    }

    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Learning curve: consecutive windows in trial order. The last window may be
    /// shorter.
    #[must_use]
    pub fn windows(&self, outcomes: &[TrialOutcome]) -> Vec<WindowStats> {
        outcomes
            .chunks(self.window)
            .filter_map(WindowStats::from_slice)
            .collect()
    }

    /// Heuristic observations about the run.
    #[must_use]
    pub fn findings(&self, outcomes: &[TrialOutcome]) -> Vec<String> {
        let mut findings = Vec::new();
        let windows = self.windows(outcomes);
        let (Some(first), Some(last)) = (windows.first(), windows.last()) else {
            return findings;
        };

        if last.penalty_rate > FINDING_HIGH_PENALTY_RATE {
            findings.push(format!(
                "High penalty rate ({:.1}%) in {}",
                last.penalty_rate * 100.0,
                last.label()
            ));
        }

        if last.success_rate < FINDING_LOW_SUCCESS_RATE {
            findings.push(format!(
                "Low success rate ({:.1}%) in {}",
                last.success_rate * 100.0,
                last.label()
            ));
        }

        if windows.len() >= 2
            && last.success_rate <= first.success_rate
            && last.penalty_rate >= first.penalty_rate
        {
            findings.push(format!(
                "No improvement between {} and {}",
                first.label(),
                last.label()
            ));
        }

        let past_horizon = outcomes.iter().filter(|o| o.alpha < 0.0).count();
        if past_horizon > 0 {
            findings.push(format!(
                "{past_horizon} trial(s) ran past the decay horizon with a negative learning rate"
            ));
        }

        findings
    }

    #[must_use]
    pub fn report(
        &self,
        outcomes: &[TrialOutcome],
        metadata: Option<serde_json::Value>,
    ) -> TrainingReport {
        let overall = summarize(outcomes);
        TrainingReport {
            version: REPORT_VERSION.to_string(),
            ts: iso8601_now(),
            success_rate: overall.success_rate(),
            penalty_rate: overall.penalty_rate(),
            overall,
            windows: self.windows(outcomes),
            findings: self.findings(outcomes),
            metadata,
        }
    }
}

fn iso8601_now() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| FALLBACK_TIMESTAMP.to_string())
}
