//! The learning agent: encoder, selector, learner and decay schedule wired
//! behind the two entry points a run driver calls.

use crate::error::{AgentError, Result};
use crate::learn::td_update;
use crate::schedule::{DecaySchedule, Rates};
use crate::select::ActionSelector;
use crate::state::{encode, StateIndex};
use crate::table::{PolicyTable, TableEntry};
use serde::{Deserialize, Serialize};
use smartcab_core::event::{AgentEvent, Choice, NullObserver, Observer};
use smartcab_core::{Action, Environment, Heading, Location, RoutePlanner, SensorReading};
use std::fmt;
use tracing::{debug, info, warn};

/// Learning parameters fixed for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Planned number of trials; drives the decay schedule and must match the
    /// number of trials the driver actually runs for the rates to reach zero on
    /// the last one.
    pub num_trials: u32,
    /// Discount factor γ for the future-value term.
    pub discount: f64,
    /// Seed for action selection. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            num_trials: 100,
            discount: 0.0,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_trials == 0 {
            return Err(AgentError::InvalidConfig(
                "num_trials must be at least 1".into(),
            ));
        }
        if !self.discount.is_finite() || !(0.0..=1.0).contains(&self.discount) {
            return Err(AgentError::InvalidConfig(format!(
                "discount must lie in [0, 1], got {}",
                self.discount
            )));
        }
        Ok(())
    }
}

/// Everything that happened in one call to [`LearningAgent::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub reading: SensorReading,
    pub hint: Heading,
    pub deadline: i32,
    pub state: StateIndex,
    pub action: Action,
    pub choice: Choice,
    pub reward: f64,
    pub q_value: f64,
}

/// Serializable view of the agent's learned knowledge.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub trial: u32,
    pub num_trials: u32,
    pub epsilon: f64,
    pub alpha: f64,
    pub discount: f64,
    pub visited_states: usize,
    pub entries: Vec<TableEntry>,
}

/// Tabular Q-learning driver.
///
/// Owns its policy table, the random source used for exploration and the route
/// planner it asks for navigation hints. A run driver calls [`reset`] once at the
/// start of every trial and [`update`] once per tick.
///
/// [`reset`]: LearningAgent::reset
/// [`update`]: LearningAgent::update
pub struct LearningAgent<P> {
    config: AgentConfig,
    planner: P,
    table: PolicyTable,
    selector: ActionSelector,
    schedule: DecaySchedule,
    observer: Box<dyn Observer>,
    last_state: Option<StateIndex>,
    horizon_reported: bool,
}

impl<P: fmt::Debug> fmt::Debug for LearningAgent<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LearningAgent")
            .field("config", &self.config)
            .field("planner", &self.planner)
            .field("schedule", &self.schedule)
            .field("visited_states", &self.table.visited_states())
            .field("last_state", &self.last_state)
            .finish_non_exhaustive()
    }
}

impl<P: RoutePlanner> LearningAgent<P> {
    pub fn new(config: AgentConfig, planner: P) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            selector: ActionSelector::new(config.seed),
            schedule: DecaySchedule::new(config.num_trials),
            config,
            planner,
            table: PolicyTable::new(),
            observer: Box::new(NullObserver),
            last_state: None,
            horizon_reported: false,
        })
    }

    /// Routes events to `observer` instead of discarding them.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Prepares for a new trip: routes the planner and decays the rates.
    pub fn reset(&mut self, destination: Location) -> Rates {
        self.planner.route_to(destination);
        let rates = self.schedule.advance();
        let trial = self.schedule.trial();
        self.last_state = None;

        info!(
            trial,
            epsilon = rates.epsilon,
            alpha = rates.alpha,
            %destination,
            "trial started"
        );
        self.observer.observe(&AgentEvent::TrialStarted {
            trial,
            epsilon: rates.epsilon,
            alpha: rates.alpha,
            destination,
        });

        if self.schedule.past_horizon() && !self.horizon_reported {
            self.horizon_reported = true;
            warn!(
                trial,
                num_trials = self.schedule.num_trials(),
                "trial count exceeds configured horizon; learning and exploration rates are negative"
            );
            self.observer.observe(&AgentEvent::HorizonExceeded {
                trial,
                num_trials: self.schedule.num_trials(),
            });
        }
        rates
    }

    /// One tick: sense, encode, select, act, learn.
    pub fn update<E: Environment + ?Sized>(&mut self, t: u64, env: &mut E) -> Step {
        let hint = self.planner.next_waypoint(&env.pose());
        let reading = env.sense();
        let deadline = env.deadline();

        let state = encode(&reading, hint);
        let Rates { epsilon, alpha } = self.schedule.rates();
        let selection = self.selector.select(state, &self.table, epsilon);

        let reward = env.act(selection.action);

        let q_value = td_update(
            &mut self.table,
            state,
            selection.action,
            reward,
            alpha,
            self.config.discount,
        );
        self.last_state = Some(state);

        let trial = self.schedule.trial();
        debug!(
            trial,
            t,
            deadline,
            state,
            action = %selection.action,
            choice = ?selection.choice,
            reward,
            q_value,
            "step"
        );
        self.observer.observe(&AgentEvent::StepCompleted {
            trial,
            t,
            deadline,
            reading,
            hint,
            state,
            action: selection.action,
            choice: selection.choice,
            reward,
            q_value,
        });

        Step {
            reading,
            hint,
            deadline,
            state,
            action: selection.action,
            choice: selection.choice,
            reward,
            q_value,
        }
    }
}

impl<P> LearningAgent<P> {
    /// Forwards an event produced outside the agent (e.g. by a simulator) to the
    /// agent's observer.
    pub fn observe(&mut self, event: &AgentEvent) {
        self.observer.observe(event);
    }

    #[must_use]
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    #[must_use]
    pub fn planner(&self) -> &P {
        &self.planner
    }

    #[must_use]
    pub fn trial(&self) -> u32 {
        self.schedule.trial()
    }

    #[must_use]
    pub fn rates(&self) -> Rates {
        self.schedule.rates()
    }

    /// State encoded on the most recent tick of the current trial.
    #[must_use]
    pub fn last_state(&self) -> Option<StateIndex> {
        self.last_state
    }

    #[must_use]
    pub fn snapshot(&self) -> AgentSnapshot {
        let rates = self.schedule.rates();
        AgentSnapshot {
            trial: self.schedule.trial(),
            num_trials: self.schedule.num_trials(),
            epsilon: rates.epsilon,
            alpha: rates.alpha,
            discount: self.config.discount,
            visited_states: self.table.visited_states(),
            entries: self.table.entries(),
        }
    }

    pub fn snapshot_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.snapshot())?)
    }
}
