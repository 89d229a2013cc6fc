//! csgmarch SDF - Implicit surface trees and shader generation
//!
//! This crate holds the scene representation shared by the CPU ray marcher
//! and the GPU shader path.
//!
//! ## Key Types
//!
//! - [`Surface`] - The implicit surface tree (primitives and boolean operations)
//! - [`ImplicitSurface`] - Distance evaluation and numeric gradient
//! - [`SceneId`] - The built-in demonstration scenes
//! - [`WgslGenerator`] - Converts [`Surface`] trees to WGSL shader code
//!
//! ## Example
//!
//! ```rust
//! use csgmarch_math::Vector3;
//! use csgmarch_sdf::{ImplicitSurface, Surface, build_shader};
//!
//! let scene = Surface::difference(
//!     Surface::sphere(Vector3::ZERO, 1.0),
//!     Surface::box3(Vector3::new(0.5, 0.0, 0.0), Vector3::splat(0.8)),
//! );
//! assert!(scene.evaluate(Vector3::new(0.0, 0.0, 3.0)) > 0.0);
//!
//! let shader = build_shader(&scene);
//! assert!(shader.contains("op_difference"));
//! ```

mod error;
mod scenes;
mod surface;
mod wgsl_gen;

pub use error::{Error, Result};
pub use scenes::{
    SceneId, complex_scene, custom_scene, difference_scene, intersection_scene, sphere_scene,
    union_scene,
};
pub use surface::{DEFAULT_BOX_SMOOTHING, GRADIENT_STEP, ImplicitSurface, Surface};
pub use wgsl_gen::{WgslGenerator, build_shader, get_base_shader, inject_scene_sdf};
