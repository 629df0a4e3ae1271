use crate::world::World;
use smartcab_core::event::AgentEvent;
use smartcab_core::{Environment, RoutePlanner, TrialOutcome};
use smartcab_learning::LearningAgent;
use std::thread;
use std::time::Duration;
use tracing::info;

/// Drives trials: resets the world and the agent, then ticks until the trip
/// ends. Holds no learning state of its own.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    update_delay: Duration,
}

impl Simulator {
    /// `update_delay` is slept after every tick; zero runs flat out.
    #[must_use]
    pub fn new(update_delay: Duration) -> Self {
        Self { update_delay }
    }

    pub fn run<P: RoutePlanner>(
        &self,
        agent: &mut LearningAgent<P>,
        world: &mut World,
        n_trials: u32,
    ) -> Vec<TrialOutcome> {
        (0..n_trials)
            .map(|_| self.run_trial(agent, world))
            .collect()
    }

    pub fn run_trial<P: RoutePlanner>(
        &self,
        agent: &mut LearningAgent<P>,
        world: &mut World,
    ) -> TrialOutcome {
        let destination = world.reset();
        let rates = agent.reset(destination);

        while !world.is_done() {
            world.begin_step();
            agent.update(world.t(), world);
            world.end_step();
            if !self.update_delay.is_zero() {
                thread::sleep(self.update_delay);
            }
        }

        let trip = world.trip();
        let outcome = TrialOutcome {
            trial: agent.trial(),
            reached: trip.reached,
            steps: trip.steps,
            deadline: world.deadline(),
            net_reward: trip.net_reward,
            penalties: trip.penalties,
            epsilon: rates.epsilon,
            alpha: rates.alpha,
        };
        info!(
            trial = outcome.trial,
            reached = outcome.reached,
            steps = outcome.steps,
            net_reward = outcome.net_reward,
            penalties = outcome.penalties,
            "trial finished"
        );
        agent.observe(&AgentEvent::TrialFinished(outcome.clone()));
        outcome
    }
}
