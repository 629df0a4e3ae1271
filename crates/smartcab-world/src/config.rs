use crate::error::{Result, WorldError};
use serde::{Deserialize, Serialize};

/// Shape and rules of the simulated town.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Intersections per row; x runs `1..=width`.
    pub width: i32,
    /// Intersections per column; y runs `1..=height`.
    pub height: i32,
    /// Scripted cars wandering the grid besides the learning agent.
    pub dummy_agents: usize,
    /// End a trial as soon as the deadline runs out.
    pub enforce_deadline: bool,
    pub light_period_min: u32,
    pub light_period_max: u32,
    /// Smallest manhattan distance between start and destination.
    pub min_route_distance: u32,
    /// Deadline granted per unit of route distance.
    pub deadline_factor: i32,
    /// Steps past the deadline after which a trial is abandoned regardless of
    /// `enforce_deadline`.
    pub hard_time_limit: i32,
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 6,
            dummy_agents: 3,
            enforce_deadline: false,
            light_period_min: 3,
            light_period_max: 5,
            min_route_distance: 4,
            deadline_factor: 5,
            hard_time_limit: 100,
            seed: None,
        }
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width < 2 || self.height < 2 {
            return Err(WorldError::InvalidConfig(format!(
                "grid must be at least 2x2, got {}x{}",
                self.width, self.height
            )));
        }
        if self.light_period_min == 0 || self.light_period_min > self.light_period_max {
            return Err(WorldError::InvalidConfig(format!(
                "light period range {}..={} is empty or starts at zero",
                self.light_period_min, self.light_period_max
            )));
        }
        // Both bounds are at least 2 here, so the sum is positive.
        let widest = (self.width - 1 + self.height - 1).unsigned_abs();
        if self.min_route_distance > widest {
            return Err(WorldError::InvalidConfig(format!(
                "min_route_distance {} exceeds the largest distance on the grid ({widest})",
                self.min_route_distance
            )));
        }
        if self.deadline_factor < 1 {
            return Err(WorldError::InvalidConfig(
                "deadline_factor must be at least 1".into(),
            ));
        }
        if self.hard_time_limit < 0 {
            return Err(WorldError::InvalidConfig(
                "hard_time_limit must not be negative".into(),
            ));
        }
        Ok(())
    }
}
