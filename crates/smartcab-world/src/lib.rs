#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Headless grid-world traffic simulation for the smartcab agent.
//!
//! A [`World`] is a toroidal grid of intersections, each with a two-phase
//! [`TrafficLight`], a few scripted cars and the learning agent's cab. It
//! implements [`smartcab_core::Environment`] for that cab, scoring each move
//! with the right-of-way [`rules`]. [`GridPlanner`] supplies navigation hints and
//! [`Simulator`] runs trials end to end.

pub mod config;
pub mod error;
pub mod light;
pub mod planner;
pub mod rules;
pub mod simulator;
pub mod world;

pub use config::WorldConfig;
pub use error::{Result, WorldError};
pub use light::TrafficLight;
pub use planner::{waypoint, GridPlanner};
pub use simulator::Simulator;
pub use world::{TripStats, World};
