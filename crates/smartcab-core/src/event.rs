//! Structured events emitted while an agent trains.
//!
//! The learning core never prints. Everything worth seeing about a run (trial
//! boundaries with their decayed rates, each step's state/action/reward, the
//! outcome of a trial) is handed to an [`Observer`] as an [`AgentEvent`]. Events
//! serialise to flat JSON objects tagged with an `event` field so a JSONL trace
//! can be filtered with ordinary tools.

use crate::{Action, Heading, Location, SensorReading, TrialOutcome};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Why the selector picked an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice {
    /// The exploration gate fired.
    Explore,
    /// The table row carried no information yet.
    Uninformed,
    /// Highest-valued action in the row.
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AgentEvent {
    TrialStarted {
        trial: u32,
        epsilon: f64,
        alpha: f64,
        destination: Location,
    },
    StepCompleted {
        trial: u32,
        t: u64,
        deadline: i32,
        reading: SensorReading,
        hint: Heading,
        state: usize,
        action: Action,
        choice: Choice,
        reward: f64,
        /// Table value of `(state, action)` after the update.
        q_value: f64,
    },
    /// The trial counter passed the configured number of trials; rates are now
    /// negative.
    HorizonExceeded { trial: u32, num_trials: u32 },
    TrialFinished(TrialOutcome),
}

/// Receives events from an agent or simulator.
pub trait Observer {
    fn observe(&mut self, event: &AgentEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn observe(&mut self, _event: &AgentEvent) {}
}

/// Keeps events in memory. Clones share the same buffer, so a caller can hand one
/// clone to an agent and read the events back from another.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Rc<RefCell<Vec<AgentEvent>>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.borrow().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl Observer for RecordingObserver {
    fn observe(&mut self, event: &AgentEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

impl<O: Observer + ?Sized> Observer for Box<O> {
    fn observe(&mut self, event: &AgentEvent) {
        (**self).observe(event);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::Light;
    use serde_json::json;

    #[test]
    fn step_event_roundtrip() {
        let event = AgentEvent::StepCompleted {
            trial: 3,
            t: 7,
            deadline: 12,
            reading: SensorReading::clear(Light::Red),
            hint: Heading::Forward,
            state: 194,
            action: Action::Forward,
            choice: Choice::Greedy,
            reward: -1.0,
            q_value: -0.9,
        };

        let serialized = serde_json::to_string(&event).expect("Serialization failed");
        assert!(serialized.contains("\"event\":\"step_completed\""));
        assert!(serialized.contains("\"choice\":\"greedy\""));

        let back: AgentEvent = serde_json::from_str(&serialized).expect("Deserialization failed");
        assert_eq!(back, event);
    }

    #[test]
    fn trial_finished_flattens_outcome() {
        let event = AgentEvent::TrialFinished(TrialOutcome {
            trial: 1,
            reached: true,
            steps: 9,
            deadline: 11,
            net_reward: 21.5,
            penalties: 1,
            epsilon: 0.9,
            alpha: 0.8,
        });
        let value = serde_json::to_value(&event).expect("Serialization failed");
        assert_eq!(value["event"], json!("trial_finished"));
        assert_eq!(value["reached"], json!(true));
        assert_eq!(value["steps"], json!(9));
    }

    #[test]
    fn recording_observer_clones_share_buffer() {
        let recorder = RecordingObserver::new();
        let mut handle: Box<dyn Observer> = Box::new(recorder.clone());
        handle.observe(&AgentEvent::HorizonExceeded {
            trial: 11,
            num_trials: 10,
        });
        assert_eq!(recorder.len(), 1);
        assert!(matches!(
            recorder.events()[0],
            AgentEvent::HorizonExceeded { trial: 11, .. }
        ));
    }
}
