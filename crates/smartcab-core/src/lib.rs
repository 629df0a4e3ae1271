#![warn(clippy::unwrap_used, clippy::expect_used)]

//! Shared vocabulary for the smartcab workspace.
//!
//! The learning agent, the grid world and the analysis tooling all speak in the
//! types defined here: the categorical sensor reading a car receives at an
//! intersection, the closed set of actions it may take, the grid geometry used by
//! route planners, and the two traits ([`Environment`], [`RoutePlanner`]) through
//! which the agent consumes its collaborators.

pub mod event;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Failure to read a categorical value from text.
///
/// Categorical inputs are closed enumerations. Text that names none of the
/// variants is rejected here, at the boundary, instead of being mapped to a
/// default that would alias another state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown light state: {0:?}")]
    Light(String),
    #[error("unknown heading: {0:?}")]
    Heading(String),
    #[error("unknown action: {0:?}")]
    Action(String),
}

/// Colour of the traffic light facing a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Light {
    Green,
    Red,
}

impl Light {
    pub const ALL: [Light; 2] = [Light::Green, Light::Red];

    #[must_use]
    pub fn ordinal(self) -> usize {
        match self {
            Light::Green => 0,
            Light::Red => 1,
        }
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Light::Green => "green",
            Light::Red => "red",
        })
    }
}

impl FromStr for Light {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(Light::Green),
            "red" => Ok(Light::Red),
            _ => Err(ParseError::Light(s.to_string())),
        }
    }
}

/// A relative heading: where a car intends to go at the next intersection.
///
/// Used both as the route planner's navigation hint and as the announced intent
/// of other cars observed at an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    Left,
    Right,
    Forward,
}

impl Heading {
    pub const ALL: [Heading; 3] = [Heading::Left, Heading::Right, Heading::Forward];

    /// Code of the heading when used as a navigation hint (`left=0`, `right=1`,
    /// `forward=2`).
    #[must_use]
    pub fn ordinal(self) -> usize {
        match self {
            Heading::Left => 0,
            Heading::Right => 1,
            Heading::Forward => 2,
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Heading::Left => "left",
            Heading::Right => "right",
            Heading::Forward => "forward",
        })
    }
}

impl FromStr for Heading {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Heading::Left),
            "right" => Ok(Heading::Right),
            "forward" => Ok(Heading::Forward),
            _ => Err(ParseError::Heading(s.to_string())),
        }
    }
}

/// Traffic observed in one direction: `None` when no car is there, otherwise the
/// heading that car announced.
pub type Traffic = Option<Heading>;

pub const TRAFFIC_VALUES: [Traffic; 4] = [
    None,
    Some(Heading::Left),
    Some(Heading::Right),
    Some(Heading::Forward),
];

/// Code of an observed traffic value (`none=0`, `left=1`, `right=2`, `forward=3`).
#[must_use]
pub fn traffic_ordinal(traffic: Traffic) -> usize {
    match traffic {
        None => 0,
        Some(Heading::Left) => 1,
        Some(Heading::Right) => 2,
        Some(Heading::Forward) => 3,
    }
}

/// Parses `none` or a heading name.
pub fn parse_traffic(s: &str) -> Result<Traffic, ParseError> {
    if s.trim().eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// What a car perceives at its current intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensorReading {
    pub light: Light,
    pub oncoming: Traffic,
    pub left: Traffic,
    pub right: Traffic,
}

impl SensorReading {
    /// A reading with the given light and no other traffic.
    #[must_use]
    pub fn clear(light: Light) -> Self {
        Self {
            light,
            oncoming: None,
            left: None,
            right: None,
        }
    }
}

/// One of the four moves available to a car at an intersection.
///
/// The discriminant order is the column order of the policy table and the
/// tie-break order of greedy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Wait in place.
    #[serde(rename = "none")]
    Idle,
    Left,
    Right,
    Forward,
}

impl Action {
    pub const COUNT: usize = 4;
    pub const ALL: [Action; Action::COUNT] =
        [Action::Idle, Action::Left, Action::Right, Action::Forward];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The action at column `index`, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The heading this action drives toward; `None` for waiting.
    #[must_use]
    pub fn heading(self) -> Option<Heading> {
        match self {
            Action::Idle => None,
            Action::Left => Some(Heading::Left),
            Action::Right => Some(Heading::Right),
            Action::Forward => Some(Heading::Forward),
        }
    }
}

impl From<Heading> for Action {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::Left => Action::Left,
            Heading::Right => Action::Right,
            Heading::Forward => Action::Forward,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.heading() {
            Some(h) => h.fmt(f),
            None => f.write_str("none"),
        }
    }
}

impl FromStr for Action {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "idle" => Ok(Action::Idle),
            other => other
                .parse::<Heading>()
                .map(Action::from)
                .map_err(|_| ParseError::Action(s.to_string())),
        }
    }
}

/// An intersection on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn manhattan(self, other: Location) -> u32 {
        (self.x - other.x).unsigned_abs() + (self.y - other.y).unsigned_abs()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Absolute travel direction as a unit vector. `y` grows southward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction {
    pub dx: i32,
    pub dy: i32,
}

impl Direction {
    pub const NORTH: Direction = Direction { dx: 0, dy: -1 };
    pub const SOUTH: Direction = Direction { dx: 0, dy: 1 };
    pub const EAST: Direction = Direction { dx: 1, dy: 0 };
    pub const WEST: Direction = Direction { dx: -1, dy: 0 };
    pub const ALL: [Direction; 4] = [
        Direction::NORTH,
        Direction::SOUTH,
        Direction::EAST,
        Direction::WEST,
    ];

    #[must_use]
    pub fn turn_left(self) -> Self {
        Self {
            dx: self.dy,
            dy: -self.dx,
        }
    }

    #[must_use]
    pub fn turn_right(self) -> Self {
        Self {
            dx: -self.dy,
            dy: self.dx,
        }
    }

    /// Direction after taking `heading` at an intersection.
    #[must_use]
    pub fn after(self, heading: Heading) -> Self {
        match heading {
            Heading::Left => self.turn_left(),
            Heading::Right => self.turn_right(),
            Heading::Forward => self,
        }
    }

    #[must_use]
    pub fn is_vertical(self) -> bool {
        self.dy != 0
    }

    #[must_use]
    pub fn dot(self, other: Direction) -> i32 {
        self.dx * other.dx + self.dy * other.dy
    }
}

/// Where a car is and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pose {
    pub location: Location,
    pub heading: Direction,
}

/// The world as seen by the learning agent.
pub trait Environment {
    /// Current sensor reading at the agent's intersection.
    fn sense(&self) -> SensorReading;
    /// Steps left before the trip is late. Informational only.
    fn deadline(&self) -> i32;
    /// Location and facing of the agent, consumed by route planners.
    fn pose(&self) -> Pose;
    /// Executes `action` and returns the reward it earned.
    fn act(&mut self, action: Action) -> f64;
}

/// Supplies the heading that makes progress toward a destination.
pub trait RoutePlanner {
    fn route_to(&mut self, destination: Location);
    fn next_waypoint(&self, pose: &Pose) -> Heading;
}

/// Summary of one finished trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub trial: u32,
    /// Whether the destination was reached before the trial ended.
    pub reached: bool,
    pub steps: u32,
    /// Deadline left when the trial ended; negative when late.
    pub deadline: i32,
    pub net_reward: f64,
    /// Number of steps with a negative reward.
    pub penalties: u32,
    pub epsilon: f64,
    pub alpha: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn categoricals_parse_case_insensitively() {
        assert_eq!("Red".parse::<Light>().unwrap(), Light::Red);
        assert_eq!(" forward ".parse::<Heading>().unwrap(), Heading::Forward);
        assert_eq!("none".parse::<Action>().unwrap(), Action::Idle);
        assert_eq!("LEFT".parse::<Action>().unwrap(), Action::Left);
        assert_eq!(parse_traffic("None").unwrap(), None);
        assert_eq!(parse_traffic("right").unwrap(), Some(Heading::Right));
    }

    #[test]
    fn unknown_categoricals_are_rejected() {
        assert_eq!(
            "amber".parse::<Light>(),
            Err(ParseError::Light("amber".into()))
        );
        assert!("backward".parse::<Heading>().is_err());
        assert!(matches!(
            "reverse".parse::<Action>(),
            Err(ParseError::Action(_))
        ));
        assert!(parse_traffic("").is_err());
    }

    #[test]
    fn action_indices_follow_table_columns() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(Action::COUNT), None);
    }

    #[test]
    fn turns_rotate_quarter_circle() {
        assert_eq!(Direction::EAST.turn_right(), Direction::SOUTH);
        assert_eq!(Direction::EAST.turn_left(), Direction::NORTH);
        assert_eq!(Direction::NORTH.turn_left(), Direction::WEST);
        for d in Direction::ALL {
            assert_eq!(d.turn_left().turn_right(), d);
            assert_eq!(d.turn_right().turn_right().dot(d), -1);
        }
    }

    #[test]
    fn action_serializes_idle_as_none() {
        let json = serde_json::to_string(&Action::Idle).unwrap();
        assert_eq!(json, "\"none\"");
        let back: Action = serde_json::from_str("\"forward\"").unwrap();
        assert_eq!(back, Action::Forward);
    }
}
