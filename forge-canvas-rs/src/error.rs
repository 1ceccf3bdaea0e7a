use forge_canvas_canvas2d::Canvas2dError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FcError {
    /// No canvas matched the requested name, and there is no current canvas.
    #[error("No canvas with provided name found")]
    NoCanvas,

    #[error(transparent)]
    Canvas(#[from] Canvas2dError),

    #[error("Text measurement failed: {0}")]
    Measurement(String),

    #[error("Failed to load image from {url}: {reason}")]
    ImageLoad { url: String, reason: String },

    #[error("HTTP access denied for image URL: {0}")]
    AccessDenied(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Invalid resolver configuration: {0}")]
    Config(#[from] serde_json::Error),
}
