//! GPU-ready uniform block for the generated raymarch shader

use bytemuck::{Pod, Zeroable};
use csgmarch_math::Vector3;

use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::environment::Environment;
use crate::march::MarchParams;

/// Uniforms consumed by `raymarch.wgsl`
/// This struct must match the WGSL struct layout exactly
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Uniforms {
    pub camera_position: [f32; 3],
    pub fov_degrees: f32,
    pub camera_target: [f32; 3],
    pub aspect: f32,
    pub camera_up: [f32; 3],
    pub max_steps: i32,
    pub light_position: [f32; 3],
    pub ambient_strength: f32,
    pub light_color: [f32; 3],
    pub max_distance: f32,
    pub background_bottom: [f32; 3],
    pub epsilon: f32,
    pub background_top: [f32; 3],
    pub _pad: f32,
}

fn to_f32(v: Vector3) -> [f32; 3] {
    v.as_vec3().to_array()
}

impl Uniforms {
    pub fn new(
        camera: &Camera,
        environment: &Environment,
        march: &MarchParams,
        aspect: f64,
    ) -> Self {
        Self {
            camera_position: to_f32(camera.position),
            fov_degrees: camera.fov as f32,
            camera_target: to_f32(camera.target),
            aspect: aspect as f32,
            camera_up: to_f32(camera.up),
            max_steps: i32::try_from(march.max_steps()).unwrap_or(i32::MAX),
            light_position: to_f32(environment.light.position),
            ambient_strength: environment.light.ambient_strength as f32,
            light_color: to_f32(environment.light.color),
            max_distance: march.max_distance() as f32,
            background_bottom: to_f32(environment.background.bottom),
            epsilon: march.epsilon() as f32,
            background_top: to_f32(environment.background.top),
            _pad: 0.0,
        }
    }
}

impl From<&RenderConfig> for Uniforms {
    fn from(config: &RenderConfig) -> Self {
        Self::new(
            &config.camera,
            &config.environment,
            &config.march,
            config.aspect(),
        )
    }
}

impl Default for Uniforms {
    fn default() -> Self {
        Uniforms::from(&RenderConfig::default())
    }
}
