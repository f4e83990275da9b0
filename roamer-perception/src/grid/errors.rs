use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("grid resolution must be finite and positive, got {0}")]
    InvalidResolution(f32),
    #[error("grid bounds {min:?}..{max:?} enclose no cells")]
    EmptyBounds { min: [f32; 2], max: [f32; 2] },
    #[error("beam step size must be finite and positive, got {0}")]
    InvalidStepSize(f32),
}
