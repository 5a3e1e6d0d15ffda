//! Simulation settings
//!
//! Everything the front end may tune lives here. Loaded from JSON when a path
//! is given, otherwise the defaults in [`crate::consts`] apply.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::consts::*;
use crate::sim::{MassScaling, PhysicsParams, QuadtreeConfig};

/// Broad-phase strategy used by [`crate::sim::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    #[default]
    Quadtree,
    BruteForce,
}

impl DetectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMode::Quadtree => "quadtree",
            DetectionMode::BruteForce => "brute_force",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quadtree" | "tree" => Some(DetectionMode::Quadtree),
            "brute_force" | "brute-force" | "brute" => Some(DetectionMode::BruteForce),
            _ => None,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Arena ===
    /// Arena width in pixels
    pub width: f32,
    /// Arena height in pixels
    pub height: f32,
    /// Acceleration along +Y (pixels/s²)
    pub gravity: f32,

    // === Collision response ===
    /// Push-out bias and wall contact threshold
    pub epsilon: f32,
    /// Impulse multiplier (1.0 = perfectly elastic)
    pub restitution: f32,
    /// How the push-out and impulse are split between the two balls
    pub mass_scaling: MassScaling,
    /// Scale reflected wall velocity by 1/mass
    pub lossy_boundary: bool,

    // === Broad phase ===
    pub detection: DetectionMode,
    pub quadtree: QuadtreeConfig,

    // === Presentation ===
    /// Frames a ball stays highlighted after a collision
    pub collision_flash_frames: u32,
    /// Multiplier applied to every Δt passed to `tick`
    pub time_scale: f32,

    /// Seed for `World::scatter`
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            gravity: DEFAULT_GRAVITY,

            epsilon: PHYSICS_EPSILON,
            restitution: RESTITUTION,
            mass_scaling: MassScaling::Harmonic,
            lossy_boundary: false,

            detection: DetectionMode::Quadtree,
            quadtree: QuadtreeConfig::default(),

            collision_flash_frames: COLLISION_FLASH_FRAMES,
            time_scale: 1.0,

            seed: DEFAULT_SEED,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document; missing fields take defaults
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path`, falling back to defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Using default settings: {err}");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), SimError> {
        let positive = |name: &str, v: f32| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(SimError::InvalidSettings(format!("{name} must be > 0, got {v}")))
            }
        };

        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("epsilon", self.epsilon)?;
        positive("time_scale", self.time_scale)?;

        if !self.gravity.is_finite() {
            return Err(SimError::InvalidSettings("gravity must be finite".into()));
        }
        if !self.restitution.is_finite() || self.restitution < 0.0 {
            return Err(SimError::InvalidSettings(format!(
                "restitution must be >= 0, got {}",
                self.restitution
            )));
        }
        if self.quadtree.max_objects == 0 {
            return Err(SimError::InvalidSettings("quadtree.max_objects must be > 0".into()));
        }
        Ok(())
    }

    /// Collision response parameters derived from these settings
    pub fn physics(&self) -> PhysicsParams {
        PhysicsParams {
            epsilon: self.epsilon,
            restitution: self.restitution,
            mass_scaling: self.mass_scaling,
            lossy_boundary: self.lossy_boundary,
        }
    }
}
