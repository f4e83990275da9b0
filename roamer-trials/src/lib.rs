//! Simulated navigation trials for evolved controllers.
//!
//! An [`Agent`] couples a pose estimator, an occupancy grid and a
//! feedforward controller. Each tick it fuses odometry with landmark
//! sightings, folds the latest lidar scan into its map, assembles a
//! feature vector and issues a motor command to its body. A [`Trial`]
//! drives one agent until it reaches its goal or times out, and an
//! [`Experiment`] runs a whole population of controllers through shared
//! scenarios, one generation at a time.
//!
//! The sensing and actuation seams are traits in [`interfaces`]; the
//! [`world`] module provides a simulated arena that implements them.
//!
//! # Example usage
//! ```no_run
//! use roamer_trials::config::ExperimentConfig;
//! use roamer_trials::experiment::Experiment;
//! use std::path::Path;
//!
//! let config = ExperimentConfig::load("configs/default.ron").unwrap();
//! let experiment = Experiment::new(config).unwrap();
//! let summary = experiment.evolve(Path::new("runs/default")).unwrap();
//! println!("evolved {} generations", summary.generations);
//! ```
pub mod agent;
pub mod config;
pub mod controller;
pub mod errors;
pub mod experiment;
pub mod features;
pub mod interfaces;
pub mod reports;
pub mod trial;
pub mod world;

pub use agent::{Agent, AgentConfig};
pub use config::ExperimentConfig;
pub use controller::{FeedforwardController, MotionLimits, MotorCommand};
pub use errors::{AgentError, ConfigError, ControllerError, ExperimentError};
pub use experiment::Experiment;
pub use trial::{Trial, TrialConfig};
