//! Discretisation of a sensor reading plus navigation hint into a table row.

use smartcab_core::{traffic_ordinal, Heading, SensorReading};

/// Row index into the policy table, in `0..STATE_COUNT`.
pub type StateIndex = usize;

const LIGHT_WEIGHT: usize = 192;
const LEFT_WEIGHT: usize = 48;
const RIGHT_WEIGHT: usize = 12;
const ONCOMING_WEIGHT: usize = 3;

/// light (2) × left (4) × right (4) × oncoming (4) × hint (3).
pub const STATE_COUNT: usize = 2 * 4 * 4 * 4 * 3;

/// Mixed-radix encoding, most significant field first:
/// `light*192 + left*48 + right*12 + oncoming*3 + hint`.
#[must_use]
pub fn encode(reading: &SensorReading, hint: Heading) -> StateIndex {
    reading.light.ordinal() * LIGHT_WEIGHT
        + traffic_ordinal(reading.left) * LEFT_WEIGHT
        + traffic_ordinal(reading.right) * RIGHT_WEIGHT
        + traffic_ordinal(reading.oncoming) * ONCOMING_WEIGHT
        + hint.ordinal()
}
