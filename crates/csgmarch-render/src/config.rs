//! Render configuration and scene files
//!
//! Both are JSON. Every config field has a default, so a file only needs to
//! name what it changes.

use std::fs;
use std::path::Path;

use csgmarch_sdf::Surface;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::environment::Environment;
use crate::march::MarchParams;
use crate::{RenderError, Result};

/// Everything needed to render a frame besides the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    pub camera: Camera,
    pub environment: Environment,
    pub march: MarchParams,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            camera: Camera::default(),
            environment: Environment::default(),
            march: MarchParams::default(),
        }
    }
}

impl RenderConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded render config");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        self.camera.validate()?;
        self.environment.validate()
    }

    /// Width over height
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height.max(1))
    }
}

/// Read a scene tree from JSON and validate it
pub fn load_scene(path: impl AsRef<Path>) -> Result<Surface> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let scene: Surface = serde_json::from_str(&text)?;
    scene.validate()?;
    tracing::info!(
        path = %path.display(),
        nodes = scene.node_count(),
        depth = scene.depth(),
        "loaded scene"
    );
    Ok(scene)
}

/// Write a scene tree as pretty-printed JSON
pub fn save_scene(scene: &Surface, path: impl AsRef<Path>) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(scene)?)?;
    Ok(())
}
