//! CPU frame renderer

use std::sync::Arc;
use std::time::Instant;

use csgmarch_math::depth_factor;
use csgmarch_sdf::{ImplicitSurface, Surface};
use glam::DVec2;
use image::RgbaImage;
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::environment::Environment;
use crate::march::{MarchParams, ray_march};
use crate::shading::{Color, shade};
use crate::{RenderError, Result};

/// Color seen through viewport coordinate `uv` (`v` grows upward).
///
/// Hits are shaded and darkened by how many steps the march took; misses
/// show the background gradient.
pub fn trace_pixel<S: ImplicitSurface + ?Sized>(
    scene: &S,
    camera: &Camera,
    environment: &Environment,
    params: &MarchParams,
    uv: DVec2,
    aspect: f64,
) -> Color {
    let dir = camera.ray_direction(uv, aspect);
    let m = ray_march(scene, camera.position, dir, params);

    if !m.hit {
        return environment.background.color_at(uv.y);
    }

    let p = camera.position + dir * m.distance;
    let n = scene.gradient(p);
    let lit = shade(p, n, -dir, &environment.light, scene, params);
    lit * depth_factor(f64::from(m.steps), f64::from(params.max_steps()))
}

/// Quantize a color to 8-bit RGBA, clamping each channel to `[0, 1]`
pub fn to_rgba8(color: Color) -> [u8; 4] {
    let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(color.x), channel(color.y), channel(color.z), 255]
}

/// Renders frames of a swappable scene.
///
/// The scene root sits behind a lock and is replaced wholesale. Each frame
/// takes one snapshot of the root, so a concurrent [`set_scene`] never
/// produces a frame mixing two scenes.
///
/// [`set_scene`]: Raymarcher::set_scene
pub struct Raymarcher {
    scene: RwLock<Arc<Surface>>,
    camera: Camera,
    environment: Environment,
    march: MarchParams,
}

impl Raymarcher {
    /// Create a renderer with default camera, lighting and march settings
    pub fn new(scene: impl Into<Arc<Surface>>) -> Self {
        Self::with_config(scene, &RenderConfig::default())
    }

    /// Create a renderer using the camera, environment and march settings of `config`
    pub fn with_config(scene: impl Into<Arc<Surface>>, config: &RenderConfig) -> Self {
        Self {
            scene: RwLock::new(scene.into()),
            camera: config.camera,
            environment: config.environment,
            march: config.march,
        }
    }

    /// Current scene root
    pub fn scene(&self) -> Arc<Surface> {
        Arc::clone(&self.scene.read())
    }

    /// Replace the scene root; frames already rendering keep the old one
    pub fn set_scene(&self, scene: impl Into<Arc<Surface>>) {
        let scene = scene.into();
        tracing::debug!(
            kind = scene.kind(),
            nodes = scene.node_count(),
            "scene replaced"
        );
        *self.scene.write() = scene;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn march_params(&self) -> &MarchParams {
        &self.march
    }

    pub fn set_march_params(&mut self, march: MarchParams) {
        self.march = march;
    }

    /// Render one frame.
    ///
    /// Rows are traced in parallel; pixel centers sit at half-integer
    /// coordinates and row 0 is the top of the image.
    pub fn render_to_image(&self, width: u32, height: u32) -> Result<RgbaImage> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidConfig(format!(
                "image size must be non-zero, got {}x{}",
                width, height
            )));
        }

        let scene = self.scene();
        let start = Instant::now();
        let aspect = f64::from(width) / f64::from(height);
        let row_len = width as usize * 4;
        let mut pixels = vec![0u8; row_len * height as usize];

        pixels
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(row, row_pixels)| {
                let v = 1.0 - (row as f64 + 0.5) / f64::from(height);
                for (x, px) in row_pixels.chunks_exact_mut(4).enumerate() {
                    let u = (x as f64 + 0.5) / f64::from(width);
                    let color = trace_pixel(
                        scene.as_ref(),
                        &self.camera,
                        &self.environment,
                        &self.march,
                        DVec2::new(u, v),
                        aspect,
                    );
                    px.copy_from_slice(&to_rgba8(color));
                }
            });

        tracing::debug!(
            width,
            height,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "rendered frame"
        );

        RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            RenderError::InvalidConfig("frame buffer does not match image size".to_string())
        })
    }

    /// Render one frame and write it as an image file
    pub fn render_to_file(
        &self,
        width: u32,
        height: u32,
        path: impl AsRef<std::path::Path>,
    ) -> Result<()> {
        let image = self.render_to_image(width, height)?;
        image.save(path.as_ref())?;
        tracing::info!(path = %path.as_ref().display(), width, height, "wrote frame");
        Ok(())
    }
}
