//! The simulated town: a toroidal grid of signalled intersections, a handful
//! of scripted cars and the learning agent's cab.

use crate::config::WorldConfig;
use crate::error::Result;
use crate::light::TrafficLight;
use crate::planner::waypoint;
use crate::rules::{is_legal, move_reward, ARRIVAL_BONUS};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smartcab_core::{
    Action, Direction, Environment, Heading, Light, Location, Pose, SensorReading, Traffic,
};
use std::collections::BTreeMap;
use tracing::debug;

const PRIMARY: usize = 0;

#[derive(Debug, Clone, Copy)]
struct Car {
    pose: Pose,
    /// Heading the car announces to others at its intersection.
    intent: Traffic,
}

/// Running totals for the current trip of the learning agent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TripStats {
    pub steps: u32,
    pub net_reward: f64,
    pub penalties: u32,
    pub reached: bool,
}

#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    rng: StdRng,
    t: u64,
    lights: BTreeMap<Location, TrafficLight>,
    /// Index 0 is the learning agent; the rest are scripted.
    cars: Vec<Car>,
    destination: Location,
    deadline: i32,
    done: bool,
    trip: TripStats,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut lights = BTreeMap::new();
        for x in 1..=config.width {
            for y in 1..=config.height {
                lights.insert(
                    Location::new(x, y),
                    TrafficLight::random(&mut rng, config.light_period_min, config.light_period_max),
                );
            }
        }

        let mut cars = Vec::with_capacity(config.dummy_agents + 1);
        for _ in 0..=config.dummy_agents {
            let pose = Pose {
                location: random_location(&mut rng, &config),
                heading: random_direction(&mut rng),
            };
            let intent = Some(random_heading(&mut rng));
            cars.push(Car { pose, intent });
        }

        let destination = cars[PRIMARY].pose.location;
        Ok(Self {
            config,
            rng,
            t: 0,
            lights,
            cars,
            destination,
            deadline: 0,
            done: true,
            trip: TripStats::default(),
        })
    }

    /// Starts a new trip for the learning agent and returns its destination.
    ///
    /// Start and destination are drawn uniformly among pairs at least
    /// `min_route_distance` apart; the deadline scales with their distance.
    pub fn reset(&mut self) -> Location {
        let (start, destination) = loop {
            let start = random_location(&mut self.rng, &self.config);
            let destination = random_location(&mut self.rng, &self.config);
            if start.manhattan(destination) >= self.config.min_route_distance {
                break (start, destination);
            }
        };

        for light in self.lights.values_mut() {
            light.reset(&mut self.rng);
        }

        let heading = random_direction(&mut self.rng);
        let pose = Pose {
            location: start,
            heading,
        };
        self.cars[PRIMARY] = Car {
            pose,
            intent: Some(waypoint(&pose, destination)),
        };

        self.t = 0;
        self.destination = destination;
        // Distance is bounded by the grid size, which fits comfortably in i32.
        let distance = i32::try_from(start.manhattan(destination)).unwrap_or(i32::MAX);
        self.deadline = distance.saturating_mul(self.config.deadline_factor);
        self.done = false;
        self.trip = TripStats::default();

        debug!(%start, %destination, deadline = self.deadline, "trip reset");
        destination
    }

    /// Advances lights and moves scripted traffic on the intent each car
    /// announced last step, then draws their next intents.
    pub fn begin_step(&mut self) {
        let t = self.t;
        for light in self.lights.values_mut() {
            light.update(t);
        }
        for i in 1..self.cars.len() {
            if let Some(intent) = self.cars[i].intent {
                let reading = self.sense_for(i);
                if is_legal(&reading, Action::from(intent)) {
                    self.drive(i, intent);
                }
            }
            // Announced to the other cars until this car's next move.
            self.cars[i].intent = Some(random_heading(&mut self.rng));
        }
    }

    /// Charges the step against the deadline and ends overdue trips.
    pub fn end_step(&mut self) {
        self.t += 1;
        self.deadline -= 1;
        if self.done {
            return;
        }
        if self.config.enforce_deadline && self.deadline <= 0 {
            debug!(t = self.t, "deadline reached");
            self.done = true;
        } else if self.deadline <= -self.config.hard_time_limit {
            debug!(t = self.t, "hard time limit reached");
            self.done = true;
        }
    }

    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    #[must_use]
    pub fn trip(&self) -> TripStats {
        self.trip
    }

    #[must_use]
    pub fn destination(&self) -> Location {
        self.destination
    }

    #[must_use]
    pub fn t(&self) -> u64 {
        self.t
    }

    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    fn sense_for(&self, index: usize) -> SensorReading {
        let me = self.cars[index].pose;
        let light = self
            .lights
            .get(&me.location)
            .map_or(Light::Red, |l| l.facing(me.heading));

        let mut reading = SensorReading::clear(light);
        for (j, other) in self.cars.iter().enumerate() {
            if j == index
                || other.pose.location != me.location
                || other.pose.heading == me.heading
            {
                continue;
            }
            if me.heading.dot(other.pose.heading) == -1 {
                if reading.oncoming != Some(Heading::Left) {
                    reading.oncoming = other.intent;
                }
            } else if other.pose.heading == me.heading.turn_left() {
                // Coming from our right, travelling toward our left.
                if !matches!(reading.right, Some(Heading::Forward | Heading::Left)) {
                    reading.right = other.intent;
                }
            } else if reading.left != Some(Heading::Forward) {
                reading.left = other.intent;
            }
        }
        reading
    }

    fn drive(&mut self, index: usize, heading: Heading) {
        let car = &mut self.cars[index];
        let direction = car.pose.heading.after(heading);
        car.pose = Pose {
            location: step_on_torus(car.pose.location, direction, &self.config),
            heading: direction,
        };
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, index: usize, pose: Pose, intent: Traffic) {
        self.cars[index] = Car { pose, intent };
    }

    #[cfg(test)]
    pub(crate) fn set_light(&mut self, location: Location, light: TrafficLight) {
        self.lights.insert(location, light);
    }

    #[cfg(test)]
    pub(crate) fn set_route(&mut self, destination: Location, deadline: i32) {
        self.destination = destination;
        self.deadline = deadline;
        self.done = false;
        self.trip = TripStats::default();
    }
}

impl Environment for World {
    fn sense(&self) -> SensorReading {
        self.sense_for(PRIMARY)
    }

    fn deadline(&self) -> i32 {
        self.deadline
    }

    fn pose(&self) -> Pose {
        self.cars[PRIMARY].pose
    }

    fn act(&mut self, action: Action) -> f64 {
        let reading = self.sense_for(PRIMARY);
        let route = waypoint(&self.cars[PRIMARY].pose, self.destination);
        let legal = is_legal(&reading, action);
        let mut reward = move_reward(legal, action, route);

        if legal {
            if let Some(heading) = action.heading() {
                self.drive(PRIMARY, heading);
            }
        }

        if !self.done && self.cars[PRIMARY].pose.location == self.destination {
            if self.deadline >= 0 {
                reward += ARRIVAL_BONUS;
            }
            self.done = true;
            self.trip.reached = true;
            debug!(t = self.t, deadline = self.deadline, "destination reached");
        }

        let pose = self.cars[PRIMARY].pose;
        self.cars[PRIMARY].intent = Some(waypoint(&pose, self.destination));

        self.trip.steps += 1;
        self.trip.net_reward += reward;
        if reward < 0.0 {
            self.trip.penalties += 1;
        }
        reward
    }
}

fn random_location<R: Rng + ?Sized>(rng: &mut R, config: &WorldConfig) -> Location {
    Location::new(
        rng.gen_range(1..=config.width),
        rng.gen_range(1..=config.height),
    )
}

fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Direction {
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Heading {
    Heading::ALL[rng.gen_range(0..Heading::ALL.len())]
}

/// Moves one block in `direction`, wrapping around the grid edges.
fn step_on_torus(from: Location, direction: Direction, config: &WorldConfig) -> Location {
    Location::new(
        (from.x - 1 + direction.dx).rem_euclid(config.width) + 1,
        (from.y - 1 + direction.dy).rem_euclid(config.height) + 1,
    )
}
