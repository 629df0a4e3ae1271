use rand::Rng;
use smartcab_core::{Direction, Light};

/// Two-phase signal at one intersection.
#[derive(Debug, Clone)]
pub struct TrafficLight {
    /// `true` while north/south traffic has green.
    north_south: bool,
    period: u32,
    last_flip: u64,
}

impl TrafficLight {
    pub fn random<R: Rng + ?Sized>(rng: &mut R, min_period: u32, max_period: u32) -> Self {
        Self {
            north_south: rng.gen(),
            period: rng.gen_range(min_period..=max_period),
            last_flip: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn fixed(north_south: bool, period: u32) -> Self {
        Self {
            north_south,
            period,
            last_flip: 0,
        }
    }

    /// Re-randomises the phase and restarts the cycle at `t = 0`.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.north_south = rng.gen();
        self.last_flip = 0;
    }

    pub fn update(&mut self, t: u64) {
        if t.saturating_sub(self.last_flip) >= u64::from(self.period) {
            self.north_south = !self.north_south;
            self.last_flip = t;
        }
    }

    /// Colour shown to a car travelling in `heading`.
    #[must_use]
    pub fn facing(&self, heading: Direction) -> Light {
        if self.north_south == heading.is_vertical() {
            Light::Green
        } else {
            Light::Red
        }
    }
}
