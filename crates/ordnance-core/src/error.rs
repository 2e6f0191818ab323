//! Error types for content loading, replication decoding, and stepping.

use glam::Vec2;
use thiserror::Error;

/// Content pack loading failures.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("content pack is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("descriptor name `{0}` is defined more than once")]
    DuplicateName(String),

    #[error("descriptor `{from}` references unknown descriptor `{to}`")]
    UnknownReference { from: String, to: String },

    #[error("descriptor reference cycle: {}", .0.join(" -> "))]
    CyclicReference(Vec<String>),

    #[error("descriptor registry is full")]
    RegistryFull,
}

/// Replication payload decoding failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplicationError {
    #[error("creation message must be {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Per-projectile faults raised during a step.
#[derive(Debug, Error, PartialEq)]
pub enum StepError {
    #[error("non-finite position {0}")]
    NonFinitePosition(Vec2),

    #[error("non-finite velocity {0}")]
    NonFiniteVelocity(Vec2),
}
