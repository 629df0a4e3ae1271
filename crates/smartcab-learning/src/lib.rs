#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Tabular Q-learning for the smartcab driving agent.
//!
//! A sensor reading and the route planner's hint are encoded into one of 384
//! states ([`state`]). Each state owns a row of four action values in a dense
//! [`PolicyTable`]. The [`ActionSelector`] explores with a probability derived
//! from the current exploration rate and otherwise follows the row, and
//! [`td_update`] folds every reward back into the cell just taken. The rates decay
//! once per trial ([`DecaySchedule`]). [`LearningAgent`] ties these together
//! behind `reset` and `update`.

pub mod agent;
pub mod error;
pub mod learn;
pub mod schedule;
pub mod select;
pub mod state;
pub mod table;

pub use agent::{AgentConfig, AgentSnapshot, LearningAgent, Step};
pub use error::{AgentError, Result};
pub use learn::td_update;
pub use schedule::{DecaySchedule, Rates};
pub use select::{ActionSelector, Selection, EXPLORATION_GATE};
pub use state::{encode, StateIndex, STATE_COUNT};
pub use table::{PolicyTable, TableEntry};
