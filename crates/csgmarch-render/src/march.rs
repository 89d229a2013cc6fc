//! Sphere tracing along a single ray

use csgmarch_math::Vector3;
use csgmarch_sdf::ImplicitSurface;
use serde::{Deserialize, Serialize};

use crate::{RenderError, Result};

/// March settings as written in a config file, before validation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarchSettings {
    pub max_steps: u32,
    pub max_distance: f64,
    pub epsilon: f64,
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self {
            max_steps: 100,
            max_distance: 50.0,
            epsilon: 0.001,
        }
    }
}

/// Validated ray-march limits.
///
/// `max_steps >= 1`, and `max_distance` and `epsilon` are finite and
/// positive. Deserialization goes through the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MarchSettings", into = "MarchSettings")]
pub struct MarchParams {
    max_steps: u32,
    max_distance: f64,
    epsilon: f64,
}

impl MarchParams {
    pub fn new(max_steps: u32, max_distance: f64, epsilon: f64) -> Result<Self> {
        if max_steps == 0 {
            return Err(RenderError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }
        if !(max_distance.is_finite() && max_distance > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "max_distance must be finite and > 0, got {}",
                max_distance
            )));
        }
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "epsilon must be finite and > 0, got {}",
                epsilon
            )));
        }
        Ok(Self {
            max_steps,
            max_distance,
            epsilon,
        })
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Default for MarchParams {
    fn default() -> Self {
        let s = MarchSettings::default();
        Self {
            max_steps: s.max_steps,
            max_distance: s.max_distance,
            epsilon: s.epsilon,
        }
    }
}

impl TryFrom<MarchSettings> for MarchParams {
    type Error = RenderError;

    fn try_from(s: MarchSettings) -> Result<Self> {
        Self::new(s.max_steps, s.max_distance, s.epsilon)
    }
}

impl From<MarchParams> for MarchSettings {
    fn from(p: MarchParams) -> Self {
        Self {
            max_steps: p.max_steps,
            max_distance: p.max_distance,
            epsilon: p.epsilon,
        }
    }
}

/// Outcome of marching one ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    /// Depth of the hit, or `max_distance` on a miss
    pub distance: f64,
    /// Iteration index at which the march ended
    pub steps: u32,
    pub hit: bool,
}

/// March from `origin` along unit `direction` until the field drops below
/// epsilon (hit) or the depth reaches `max_distance` (miss).
///
/// - Hit on iteration `i`: `{depth, i, true}`
/// - Overshoot: `{max_distance, max_steps, false}`
/// - Steps exhausted: `{max_distance, max_steps - 1, false}`
pub fn ray_march<S: ImplicitSurface + ?Sized>(
    scene: &S,
    origin: Vector3,
    direction: Vector3,
    params: &MarchParams,
) -> MarchResult {
    let mut depth = 0.0;
    let mut steps = 0;

    for i in 0..params.max_steps {
        let d = scene.evaluate(origin + depth * direction);
        if d < params.epsilon {
            return MarchResult {
                distance: depth,
                steps: i,
                hit: true,
            };
        }

        depth += d;
        if depth >= params.max_distance {
            return MarchResult {
                distance: params.max_distance,
                steps: params.max_steps,
                hit: false,
            };
        }
        steps = i;
    }

    MarchResult {
        distance: params.max_distance,
        steps,
        hit: false,
    }
}
