//! csgmarch Render - CPU ray marching of implicit surface scenes
//!
//! This crate turns a [`Surface`](csgmarch_sdf::Surface) tree into pixels:
//! sphere tracing, Phong shading with a binary shadow ray, and a parallel
//! frame renderer.
//!
//! ## Features
//!
//! - Configurable ray marching ([`MarchParams`], [`ray_march`])
//! - Lighting with shadow test and step-count darkening ([`shade`])
//! - Pinhole camera with orbit support ([`Camera`])
//! - Row-parallel frame rendering to `image::RgbaImage` ([`Raymarcher`])
//! - JSON render configs and scene files ([`RenderConfig`], [`load_scene`])
//! - Uniform block mirroring the generated WGSL shader ([`Uniforms`])
//!
//! ## Example
//!
//! ```rust
//! use csgmarch_render::Raymarcher;
//! use csgmarch_sdf::SceneId;
//!
//! let renderer = Raymarcher::new(SceneId::default().build());
//! let image = renderer.render_to_image(64, 48)?;
//! assert_eq!(image.dimensions(), (64, 48));
//! # Ok::<(), csgmarch_render::RenderError>(())
//! ```

pub mod camera;
pub mod config;
pub mod environment;
mod error;
pub mod march;
pub mod raymarcher;
pub mod shading;
pub mod uniforms;

pub use camera::Camera;
pub use config::{RenderConfig, load_scene, save_scene};
pub use environment::{Background, Environment, Light, background_color};
pub use error::{RenderError, Result};
pub use march::{MarchParams, MarchResult, MarchSettings, ray_march};
pub use raymarcher::{Raymarcher, to_rgba8, trace_pixel};
pub use shading::{
    Color, SHADOW_ATTENUATION, SHADOW_BIAS, SHININESS, SPECULAR_STRENGTH, shade, shadow_factor,
};
pub use uniforms::Uniforms;
