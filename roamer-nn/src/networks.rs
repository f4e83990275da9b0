//! Network implementations generated from genomes.
mod feedforward;

pub use feedforward::FeedforwardNetwork;
