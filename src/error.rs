//! Error type shared by the palette codec, renderer, and configuration.

use thiserror::Error;

/// Errors produced by colorsort operations.
///
/// The optimization core itself never fails; errors come from the I/O
/// edges (palette files, images) and from configuration validation.
#[derive(Error, Debug)]
pub enum ColorsortError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The palette JSON could not be parsed or written.
    #[error("palette JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A palette record is structurally valid JSON but not a usable color.
    #[error("invalid color at index {index}: {message}")]
    InvalidColor { index: usize, message: String },

    /// Encoding the output image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ColorsortError {
    pub(crate) fn invalid_color(index: usize, message: impl Into<String>) -> Self {
        ColorsortError::InvalidColor {
            index,
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        ColorsortError::Config(message.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ColorsortError>;
