//! Lighting and background settings

use csgmarch_math::Vector3;
use serde::{Deserialize, Serialize};

use crate::{Color, RenderError, Result};

/// A white point light with an ambient term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Light {
    /// Light position in world space
    pub position: Vector3,
    /// Light color (RGB, 0-1)
    pub color: Color,
    /// Fraction of the light color applied everywhere
    pub ambient_strength: f64,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vector3::new(4.0, 4.0, 4.0),
            color: Color::ONE,
            ambient_strength: 0.2,
        }
    }
}

/// Vertical gradient shown where rays miss
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    /// Color at the bottom edge of the frame
    pub bottom: Color,
    /// Color at the top edge of the frame
    pub top: Color,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            bottom: Color::new(0.1, 0.1, 0.2),
            top: Color::new(0.2, 0.3, 0.4),
        }
    }
}

impl Background {
    /// Gradient color at normalized screen height `y` (0 = bottom, 1 = top)
    pub fn color_at(&self, y: f64) -> Color {
        self.bottom.lerp(self.top, y)
    }
}

/// Everything about the scene's appearance that is not geometry
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub light: Light,
    pub background: Background,
}

impl Environment {
    pub fn validate(&self) -> Result<()> {
        let light = &self.light;
        if !(light.position.is_finite() && light.color.is_finite()) {
            return Err(RenderError::InvalidConfig(
                "light position and color must be finite".to_string(),
            ));
        }
        if !light.ambient_strength.is_finite() || light.ambient_strength < 0.0 {
            return Err(RenderError::InvalidConfig(format!(
                "ambient strength must be finite and non-negative, got {}",
                light.ambient_strength
            )));
        }
        if !(self.background.bottom.is_finite() && self.background.top.is_finite()) {
            return Err(RenderError::InvalidConfig(
                "background colors must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default background gradient at normalized screen height `y`
pub fn background_color(y: f64) -> Color {
    Background::default().color_at(y)
}
