use thiserror::Error;

/// Reasons a gene vector cannot form a genome.
#[derive(Debug, Error, PartialEq)]
pub enum GenomeError {
    #[error("expected {expected} genes, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("gene {index} has non-finite value {value}")]
    NonFiniteGene { index: usize, value: f32 },
}
