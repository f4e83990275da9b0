use crate::agent::Agent;
use crate::errors::AgentError;
use crate::interfaces::ObstacleQuery;
use crate::world::SimulatedBody;

use log::debug;
use roamer::TrialResult;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Seconds before the trial times out.
    pub max_time: f32,
    /// Control tick length in seconds.
    pub dt: f32,
    /// The goal counts as reached within this distance.
    pub goal_threshold: f32,
    /// Seconds between collision checks.
    pub collision_check_interval: f32,
    /// An obstacle within this radius of the body is a collision.
    pub collision_check_radius: f32,
}

impl Default for TrialConfig {
    fn default() -> TrialConfig {
        TrialConfig {
            max_time: 10.0,
            dt: 0.02,
            goal_threshold: 1.0,
            collision_check_interval: 0.2,
            collision_check_radius: 1.0,
        }
    }
}

/// One agent driving one body until it reaches its goal or runs out of
/// time. A trial yields exactly one [`TrialResult`].
#[derive(Clone, Debug)]
pub struct Trial<'w> {
    agent: Agent,
    body: SimulatedBody<'w>,
    config: TrialConfig,
    max_ticks: u64,
    check_every: u64,
    ticks: u64,
    distance_traveled: f32,
    collisions: u32,
    finished: bool,
}

impl<'w> Trial<'w> {
    pub fn new(agent: Agent, body: SimulatedBody<'w>, config: TrialConfig) -> Trial<'w> {
        let max_ticks = (config.max_time / config.dt).round() as u64;
        let check_every = ((config.collision_check_interval / config.dt).round() as u64).max(1);
        Trial {
            agent,
            body,
            config,
            max_ticks,
            check_every,
            ticks: 0,
            distance_traveled: 0.0,
            collisions: 0,
            finished: false,
        }
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn body(&self) -> &SimulatedBody<'w> {
        &self.body
    }

    pub fn elapsed(&self) -> f32 {
        self.ticks as f32 * self.config.dt
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances the trial by one tick. Returns the result on the tick the
    /// trial ends and `None` on every other call, including every call
    /// after it ended.
    pub fn step(&mut self) -> Result<Option<TrialResult>, AgentError> {
        if self.finished {
            return Ok(None);
        }
        let dt = self.config.dt;
        self.agent.step(dt, &mut self.body)?;
        self.distance_traveled += self.body.advance(dt);
        self.ticks += 1;

        if self.ticks % self.check_every == 0
            && self
                .body
                .world()
                .is_blocked(self.body.pose().position(), self.config.collision_check_radius)
        {
            self.collisions += 1;
        }

        let remaining = self.body.pose().distance_to(self.agent.goal());
        let goal_reached = remaining < self.config.goal_threshold;
        if !goal_reached && self.ticks < self.max_ticks {
            return Ok(None);
        }

        self.finished = true;
        let result = TrialResult {
            agent_id: self.agent.id(),
            goal_reached,
            time_elapsed: self.elapsed(),
            distance_traveled: self.distance_traveled,
            collisions: self.collisions,
            final_distance_to_goal: remaining,
        };
        debug!(
            "agent {} {} after {:.2}s, {} collisions",
            result.agent_id,
            if goal_reached { "reached its goal" } else { "timed out" },
            result.time_elapsed,
            result.collisions
        );
        Ok(Some(result))
    }

    /// Steps the trial to completion.
    pub fn run(mut self) -> Result<TrialResult, AgentError> {
        loop {
            if let Some(result) = self.step()? {
                return Ok(result);
            }
        }
    }
}
