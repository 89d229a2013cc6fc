//! Phong lighting with a binary shadow ray

use csgmarch_math::Vector3;
use csgmarch_sdf::ImplicitSurface;

use crate::environment::Light;
use crate::march::{MarchParams, ray_march};

/// Linear RGB, nominally in `[0, 1]` per channel
pub type Color = Vector3;

/// Distance the shadow ray starts above the surface
pub const SHADOW_BIAS: f64 = 0.1;

/// Light kept in shadowed regions
pub const SHADOW_ATTENUATION: f64 = 0.5;

pub const SPECULAR_STRENGTH: f64 = 0.5;
pub const SHININESS: f64 = 32.0;

/// Color of a lit surface point.
///
/// `normal` and `view_dir` are unit vectors; `view_dir` points from the
/// surface toward the camera.
pub fn shade<S: ImplicitSurface + ?Sized>(
    point: Vector3,
    normal: Vector3,
    view_dir: Vector3,
    light: &Light,
    scene: &S,
    params: &MarchParams,
) -> Color {
    let ambient = light.ambient_strength * light.color;

    let light_dir = (light.position - point).normalize_or_zero();
    let diffuse = normal.dot(light_dir).max(0.0) * light.color;

    let reflect_dir = (-light_dir).reflect(normal);
    let spec = view_dir.dot(reflect_dir).max(0.0).powf(SHININESS);
    let specular = SPECULAR_STRENGTH * spec * light.color;

    let shadow = shadow_factor(point, normal, light, scene, params);

    ambient + (diffuse + specular) * shadow
}

/// `SHADOW_ATTENUATION` if anything lies between the biased point and the
/// light, else 1
pub fn shadow_factor<S: ImplicitSurface + ?Sized>(
    point: Vector3,
    normal: Vector3,
    light: &Light,
    scene: &S,
    params: &MarchParams,
) -> f64 {
    let origin = point + normal * SHADOW_BIAS;
    let to_light = light.position - origin;
    let occluder = ray_march(scene, origin, to_light.normalize_or_zero(), params);

    if occluder.distance < to_light.length() {
        SHADOW_ATTENUATION
    } else {
        1.0
    }
}
