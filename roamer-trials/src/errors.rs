use roamer::{EvolutionError, SubmissionError};
use roamer_nn::weights::WeightFileError;
use roamer_nn::NetworkError;
use roamer_perception::grid::GridError;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ControllerError {
    #[error("controller networks need 2 outputs, found {0}")]
    OutputCount(usize),
    #[error(transparent)]
    Network(#[from] NetworkError),
}

#[derive(Debug, Error, PartialEq)]
pub enum AgentError {
    #[error("controller expects {expected} features, the feature config yields {found}")]
    FeatureCount { expected: usize, found: usize },
    #[error("invalid tick length {0}")]
    InvalidTick(f32),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("malformed experiment config: {0}")]
    Parse(String),
    #[error("invalid experiment config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Controller(#[from] ControllerError),
    #[error("agent {agent_id}: {source}")]
    Agent { agent_id: usize, source: AgentError },
    #[error("no valid spawn and goal found after {0} attempts")]
    NoScenario(usize),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Evolution(#[from] EvolutionError),
    #[error(transparent)]
    Weights(#[from] WeightFileError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("could not serialize population: {0}")]
    Snapshot(String),
}
