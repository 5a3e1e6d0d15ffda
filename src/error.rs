//! Error type for the fallible edges of the simulation
//!
//! The tick path itself is total; only construction from untrusted input and
//! settings loading can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid ball: mass {mass} and radius {radius} must both be finite and > 0")]
    InvalidBall { mass: f32, radius: f32 },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Json(#[from] serde_json::Error),
}
