//! Error taxonomy for the relay pipeline
//!
//! Every fatal variant is raised before streaming starts; the steady-state
//! loop only ever recovers locally (a skipped frame is not an error).

use thiserror::Error;

use crate::acquire::frame::PixelFormat;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested camera id is not present.
    #[error("failed to access camera '{0}'")]
    CameraUnavailable(String),

    /// Discovery found nothing to stream from.
    #[error("no cameras accessible")]
    NoCameras,

    /// The capture format has no conversion to the display format.
    #[error("pixel format {from:?} cannot be materialized as {to:?}")]
    UnsupportedFormat { from: PixelFormat, to: PixelFormat },

    /// Window or renderer failure.
    #[error("render surface error: {0}")]
    Surface(String),

    /// The other side of the frame queue is gone.
    #[error("frame queue disconnected")]
    Disconnected,

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("image encode error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Fold a renderer library's stringly error into [`Error::Surface`].
    pub fn surface(err: impl ToString) -> Self {
        Error::Surface(err.to_string())
    }
}
