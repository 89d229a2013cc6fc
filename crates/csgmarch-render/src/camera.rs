//! Pinhole camera and primary ray generation

use csgmarch_math::Vector3;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{RenderError, Result};

/// A look-at camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vector3,
    /// Point the camera is looking at
    pub target: Vector3,
    /// Up vector (usually Y-up)
    pub up: Vector3,
    /// Vertical field of view in degrees
    pub fov: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 5.0),
            target: Vector3::ZERO,
            up: Vector3::Y,
            fov: 45.0,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera looking at a target from a position
    pub fn look_at(position: Vector3, target: Vector3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    /// Get the forward direction (normalized)
    pub fn forward(&self) -> Vector3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Get the right direction (normalized)
    pub fn right(&self) -> Vector3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Get the actual up direction (may differ from self.up due to camera orientation)
    pub fn actual_up(&self) -> Vector3 {
        self.right().cross(self.forward())
    }

    /// Get distance from camera to target
    pub fn distance(&self) -> f64 {
        (self.position - self.target).length()
    }

    /// Direction of the primary ray through a viewport coordinate.
    ///
    /// `uv` spans `[0, 1]²` with `v` growing upward; `aspect` is width over
    /// height.
    pub fn ray_direction(&self, uv: DVec2, aspect: f64) -> Vector3 {
        let forward = self.forward();
        let right = self.right();
        let up = self.actual_up();
        let tan_half_fov = (self.fov.to_radians() * 0.5).tan();

        let x = (2.0 * uv.x - 1.0) * tan_half_fov * aspect;
        let y = (2.0 * uv.y - 1.0) * tan_half_fov;
        (forward + x * right + y * up).normalize_or_zero()
    }

    /// Place the camera on a circle of `radius` around the target's Y axis,
    /// keeping its current height
    pub fn orbit_y(&mut self, angle: f64, radius: f64) {
        self.position = Vector3::new(
            self.target.x + angle.sin() * radius,
            self.position.y,
            self.target.z + angle.cos() * radius,
        );
    }

    /// Reject cameras that cannot produce a view
    pub fn validate(&self) -> Result<()> {
        if !(self.position.is_finite() && self.target.is_finite() && self.up.is_finite()) {
            return Err(RenderError::InvalidConfig(
                "camera vectors must be finite".to_string(),
            ));
        }
        if self.distance() == 0.0 {
            return Err(RenderError::InvalidConfig(
                "camera position and target coincide".to_string(),
            ));
        }
        if self.forward().cross(self.up).length() < 1e-9 {
            return Err(RenderError::InvalidConfig(
                "camera up vector is parallel to the view direction".to_string(),
            ));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(RenderError::InvalidConfig(format!(
                "camera fov must be in (0, 180) degrees, got {}",
                self.fov
            )));
        }
        Ok(())
    }
}
