//! Encodes a reading, teaches the table one penalty and prints what the
//! selector does with it.
//!
//! Run with: cargo run -p smartcab-learning --example decide

use smartcab_core::{Action, Heading, Light, SensorReading};
use smartcab_learning::{encode, td_update, ActionSelector, DecaySchedule, PolicyTable};

fn main() {
    let reading = SensorReading::clear(Light::Red);
    let state = encode(&reading, Heading::Forward);
    println!("reading {reading:?} + hint forward -> state {state}");

    let mut table = PolicyTable::new();
    let rates = DecaySchedule::rates_at(10, 1);
    let q = td_update(&mut table, state, Action::Forward, -1.0, rates.alpha, 0.0);
    println!("after one illegal forward (alpha {:.2}): Q = {q:.3}", rates.alpha);

    let mut selector = ActionSelector::new(Some(7));
    for epsilon in [rates.epsilon, 0.0] {
        let s = selector.select(state, &table, epsilon);
        println!("epsilon {epsilon:.3}: {} ({:?})", s.action, s.choice);
    }
}
