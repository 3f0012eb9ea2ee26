/*
 * Error Module
 *
 * Error types for the flocking core. Vector arithmetic has its own small
 * error enum so geometry code can stay independent of the simulation; the
 * simulation wraps it in FlockError together with obstacle, configuration
 * and time-step failures.
 */

use thiserror::Error;

/// Precondition failures raised by `Vector2D` operations.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum VectorError {
    /// A component or scalar operand was NaN or infinite, or a magnitude was negative.
    #[error("invalid vector operand: {0}")]
    InvalidVector(&'static str),
    /// Scalar division by exactly zero.
    #[error("division by zero")]
    DivisionByZero,
    /// `reflect` was given a normal whose length is not 1 (tolerance 1e-6).
    #[error("reflection normal must have unit length, got magnitude {magnitude}")]
    InvalidNormal { magnitude: f32 },
}

/// Errors surfaced by the simulation API.
#[derive(Debug, Error)]
pub enum FlockError {
    #[error(transparent)]
    Vector(#[from] VectorError),
    #[error("obstacle polygon needs at least 3 vertices, got {vertices}")]
    DegeneratePolygon { vertices: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("time step must be finite, non-negative and keep the flock in f32 range, got {0}")]
    InvalidTimeStep(f32),
    #[error("malformed configuration document: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}
