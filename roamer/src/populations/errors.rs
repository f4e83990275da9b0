use crate::trials::SubmissionError;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EvolutionError {
    /// Evolution was requested before the current generation was evaluated.
    #[error("generation {0} has not been evaluated")]
    Unevaluated(usize),
    /// Pareto selection needs trial results, but fitness was assigned directly.
    #[error("pareto selection requires trial results for generation {0}")]
    MissingObjectives(usize),
    #[error("expected {expected} trial results, got {found}")]
    ResultCountMismatch { expected: usize, found: usize },
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}
