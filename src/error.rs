use std::path::PathBuf;

use thiserror::Error;

use crate::command::PoolError;
use crate::config::ConfigError;
use crate::diagram::DiagramType;
use crate::state::PersistenceError;

/// Errors raised while turning an encoded image into pixels or back
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Failed to parse SVG: {0}")]
    Svg(String),

    #[error("SVG has an empty canvas")]
    EmptyCanvas,

    #[error("Invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors raised by the renderer registry and the rendering backends
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no registered renderers support diagram type '{0}'")]
    NoRendererFound(DiagramType),

    #[error("rendering of '{diagram}' failed: {reason}")]
    RenderingFailed {
        diagram: String,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl RenderError {
    /// A rendering failure with no underlying error, e.g. a missing script
    pub fn failed(diagram: &str, reason: impl Into<String>) -> Self {
        Self::RenderingFailed {
            diagram: diagram.to_owned(),
            reason: reason.into(),
            source: None,
        }
    }

    /// Wraps a network, protocol or transcoding error
    pub fn wrap<E>(diagram: &str, reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RenderingFailed {
            diagram: diagram.to_owned(),
            reason: format!("{}: {}", reason.into(), source),
            source: Some(Box::new(source)),
        }
    }
}

/// Errors raised while writing a diagram image to a file or the clipboard
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("diagram '{0}' has no rendered image")]
    NoImage(String),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("clipboard unavailable: {0}")]
    Clipboard(String),
}

/// Umbrella error for the action layer
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type AppResult<T> = Result<T, AppError>;
