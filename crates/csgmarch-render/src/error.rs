//! Error types for csgmarch-render

use thiserror::Error;

/// Result type alias using the renderer's error type
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while configuring or running the renderer
#[derive(Error, Debug)]
pub enum RenderError {
    /// Render, camera or march settings are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A scene failed to build or validate
    #[error("Surface error: {0}")]
    Surface(#[from] csgmarch_sdf::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config or scene file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
