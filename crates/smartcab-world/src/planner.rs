use smartcab_core::{Heading, Location, Pose, RoutePlanner};

/// Heading that closes the gap to `destination`, east/west first.
///
/// Facing away from the target column the planner asks for a right turn, which
/// becomes a U-turn over the next two intersections. At the destination itself
/// it answers `Forward`.
#[must_use]
pub fn waypoint(pose: &Pose, destination: Location) -> Heading {
    let dx = destination.x - pose.location.x;
    let dy = destination.y - pose.location.y;
    let h = pose.heading;

    if dx != 0 {
        if dx * h.dx > 0 {
            Heading::Forward
        } else if dx * h.dx < 0 {
            Heading::Right
        } else if dx * h.dy > 0 {
            Heading::Left
        } else {
            Heading::Right
        }
    } else if dy != 0 {
        if dy * h.dy > 0 {
            Heading::Forward
        } else if dy * h.dy < 0 {
            Heading::Right
        } else if dy * h.dx > 0 {
            Heading::Right
        } else {
            Heading::Left
        }
    } else {
        Heading::Forward
    }
}

/// Route planner for the grid world.
#[derive(Debug, Default, Clone)]
pub struct GridPlanner {
    destination: Option<Location>,
}

impl GridPlanner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn destination(&self) -> Option<Location> {
        self.destination
    }
}

impl RoutePlanner for GridPlanner {
    fn route_to(&mut self, destination: Location) {
        self.destination = Some(destination);
    }

    fn next_waypoint(&self, pose: &Pose) -> Heading {
        match self.destination {
            Some(destination) => waypoint(pose, destination),
            None => Heading::Forward,
        }
    }
}
