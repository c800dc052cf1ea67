//! Core engine types: entity ids, deterministic RNG, configuration, errors.
//!
//! Everything here is independent of the effect model and is shared by the
//! rest of the crate.

pub mod config;
pub mod entity;
pub mod error;
pub mod rng;

pub use config::PipelineConfig;
pub use entity::EntityId;
pub use error::{PipelineError, PipelineResult};
pub use rng::{GameRng, GameRngState, RandomSource};
