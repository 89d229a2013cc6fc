//! Error types for csgmarch-sdf

use thiserror::Error;

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or selecting surfaces
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A node parameter is outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A scene name, index or key did not match any built-in scene
    #[error("Unknown scene: {0}")]
    UnknownScene(String),
}
