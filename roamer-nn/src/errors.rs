use thiserror::Error;

/// Errors raised while building or evaluating a network.
#[derive(Debug, Error, PartialEq)]
pub enum NetworkError {
    #[error("a network needs an input and an output layer, got {0} layers")]
    TooFewLayers(usize),
    #[error("layer {0} has no neurons")]
    EmptyLayer(usize),
    #[error("expected {expected} parameters, got {found}")]
    ParameterCount { expected: usize, found: usize },
    #[error("parameter {index} is not finite")]
    NonFiniteParameter { index: usize },
    #[error("expected {expected} inputs, got {found}")]
    InputLength { expected: usize, found: usize },
    #[error("input {index} is not finite")]
    NonFiniteInput { index: usize },
}
