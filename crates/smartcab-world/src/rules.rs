//! Right-of-way and reward rules.

use smartcab_core::{Action, Heading, Light, SensorReading};

pub const ILLEGAL_MOVE_REWARD: f64 = -1.0;
pub const IDLE_REWARD: f64 = 0.0;
pub const WAYPOINT_REWARD: f64 = 2.0;
pub const OFF_ROUTE_REWARD: f64 = -0.5;
pub const ARRIVAL_BONUS: f64 = 10.0;

/// Whether `action` is allowed given what the car sees.
///
/// Forward needs green. Left needs green and no oncoming car except one that
/// also turns left. Right is allowed on green, and on red unless traffic from
/// the left is going straight through.
#[must_use]
pub fn is_legal(reading: &SensorReading, action: Action) -> bool {
    let green = reading.light == Light::Green;
    match action {
        Action::Idle => true,
        Action::Forward => green,
        Action::Left => green && matches!(reading.oncoming, None | Some(Heading::Left)),
        Action::Right => green || reading.left != Some(Heading::Forward),
    }
}

/// Reward for an action before any arrival bonus.
#[must_use]
pub fn move_reward(legal: bool, action: Action, waypoint: Heading) -> f64 {
    if !legal {
        return ILLEGAL_MOVE_REWARD;
    }
    match action.heading() {
        None => IDLE_REWARD,
        Some(h) if h == waypoint => WAYPOINT_REWARD,
        Some(_) => OFF_ROUTE_REWARD,
    }
}
