//! Trial outcomes and their conversion into fitness.
//!
//! Every agent in a generation runs one trial and reports exactly one
//! [`TrialResult`]. Results are gathered in a [`GenerationResults`]
//! barrier; the population can only be evaluated once it is complete.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What an agent achieved in one trial.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Index of the agent's genome in the population.
    pub agent_id: usize,
    pub goal_reached: bool,
    /// Seconds until the goal was reached or the trial timed out.
    pub time_elapsed: f32,
    /// Total path length driven.
    pub distance_traveled: f32,
    pub collisions: u32,
    pub final_distance_to_goal: f32,
}

/// Weights of the scalar fitness function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Awarded when the goal is reached.
    pub goal_bonus: f32,
    /// Maximum award for progress when the goal is not reached.
    pub distance_weight: f32,
    /// Remaining distance at which the progress award drops to zero.
    pub distance_scale: f32,
    /// Maximum award for finishing early.
    pub time_bonus: f32,
    /// Trial duration at which the time award drops to zero.
    pub time_limit: f32,
    /// Subtracted per collision.
    pub collision_penalty: f32,
}

impl Default for FitnessConfig {
    fn default() -> FitnessConfig {
        FitnessConfig {
            goal_bonus: 15.0,
            distance_weight: 1.0,
            distance_scale: 10.0,
            time_bonus: 1.0,
            time_limit: 10.0,
            collision_penalty: 0.01,
        }
    }
}

impl FitnessConfig {
    /// Scores a trial.
    ///
    /// ```text
    /// goal_bonus                                      if the goal was reached
    /// distance_weight·(1 − clamp01(final/scale))      otherwise
    /// + time_bonus·clamp01(1 − time/time_limit)
    /// − collision_penalty·collisions
    /// ```
    ///
    /// # Examples
    /// ```
    /// use roamer::{FitnessConfig, TrialResult};
    ///
    /// let result = TrialResult {
    ///     agent_id: 0,
    ///     goal_reached: true,
    ///     time_elapsed: 5.0,
    ///     distance_traveled: 12.0,
    ///     collisions: 2,
    ///     final_distance_to_goal: 0.4,
    /// };
    /// let fitness = FitnessConfig::default().score(&result);
    /// assert!((fitness - (15.0 + 0.5 - 0.02)).abs() < 1e-5);
    /// ```
    pub fn score(&self, result: &TrialResult) -> f32 {
        let outcome = if result.goal_reached {
            self.goal_bonus
        } else if self.distance_scale > 0.0 {
            self.distance_weight
                * (1.0 - clamp01(result.final_distance_to_goal / self.distance_scale))
        } else {
            0.0
        };
        let speed = if self.time_limit > 0.0 {
            self.time_bonus * clamp01(1.0 - result.time_elapsed / self.time_limit)
        } else {
            0.0
        };
        outcome + speed - self.collision_penalty * result.collisions as f32
    }
}

fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("agent {agent_id} is not part of a generation of {size}")]
    UnknownAgent { agent_id: usize, size: usize },
    #[error("agent {0} already submitted a result this generation")]
    AlreadySubmitted(usize),
    #[error("{} agents have not reported: {:?}", .missing.len(), .missing)]
    Incomplete { missing: Vec<usize> },
}

/// Collects exactly one result per agent for a generation.
#[derive(Clone, Debug, Default)]
pub struct GenerationResults {
    slots: Vec<Option<TrialResult>>,
}

impl GenerationResults {
    /// A barrier expecting results from agents `0..size`.
    pub fn new(size: usize) -> GenerationResults {
        GenerationResults {
            slots: vec![None; size],
        }
    }

    /// Records a result under its `agent_id`.
    ///
    /// # Examples
    /// ```
    /// use roamer::{GenerationResults, SubmissionError, TrialResult};
    ///
    /// let result = TrialResult {
    ///     agent_id: 1,
    ///     goal_reached: false,
    ///     time_elapsed: 10.0,
    ///     distance_traveled: 3.0,
    ///     collisions: 0,
    ///     final_distance_to_goal: 7.0,
    /// };
    /// let mut results = GenerationResults::new(2);
    /// results.submit(result).unwrap();
    ///
    /// assert_eq!(results.submit(result), Err(SubmissionError::AlreadySubmitted(1)));
    /// assert!(!results.is_complete());
    /// assert_eq!(results.missing(), vec![0]);
    /// ```
    pub fn submit(&mut self, result: TrialResult) -> Result<(), SubmissionError> {
        let size = self.slots.len();
        let slot = self
            .slots
            .get_mut(result.agent_id)
            .ok_or(SubmissionError::UnknownAgent {
                agent_id: result.agent_id,
                size,
            })?;
        if slot.is_some() {
            return Err(SubmissionError::AlreadySubmitted(result.agent_id));
        }
        *slot = Some(result);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Agents that have not reported yet.
    pub fn missing(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// The results ordered by agent, if every agent has reported.
    pub fn into_results(self) -> Result<Vec<TrialResult>, SubmissionError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(SubmissionError::Incomplete { missing });
        }
        Ok(self.slots.into_iter().flatten().collect())
    }
}
