pub mod acquire;
pub mod display;
pub mod error;
pub mod relay;
pub mod session;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub use acquire::backend::{AcquisitionBackend, FrameHandler, StreamGuard};
pub use acquire::frame::{DisplayImage, Frame, FrameStatus, PixelFormat};
pub use error::Error;
pub use relay::FrameRelay;

use display::surface::ENTER_KEY;

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub relay: RelayConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Number of simulated cameras available to discovery
    pub count: usize,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub format: PixelFormat,
    /// Capture buffers in flight between backend and handler
    pub buffer_count: usize,
    /// Deliver every Nth frame with Incomplete status (None = all Complete)
    pub incomplete_every: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Pixel format every enqueued image is converted to
    pub display_format: PixelFormat,
    pub queue_capacity: usize,
    /// Log a producer-side frame rate once per window
    pub log_rate: bool,
    /// Save each display image as PNG under this directory
    pub save_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    /// `{camera}` is replaced with the streaming camera's name
    pub window_title: String,
    /// Display pacing cap; 0 disables pacing
    pub target_fps: u32,
    /// Input poll timeout per loop iteration
    pub poll_timeout_ms: u64,
    /// Key code that ends the session
    pub stop_key: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            relay: RelayConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            count: 1,
            width: 640,
            height: 480,
            fps: 30,
            format: PixelFormat::Rgb24,
            buffer_count: 10,
            incomplete_every: None,
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            display_format: PixelFormat::Bgr24,
            queue_capacity: 10,
            log_rate: true,
            save_dir: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            window_title: "Stream from '{camera}'. Press <Enter> to stop.".into(),
            target_fps: 30,
            poll_timeout_ms: 1,
            stop_key: ENTER_KEY,
        }
    }
}

impl Config {
    /// Layer an optional `iris.toml` and `IRIS__*` environment overrides
    /// over the built-in defaults.
    pub fn load() -> Result<Self, Error> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name("iris").required(false))
            .add_source(config::Environment::with_prefix("IRIS").separator("__"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::convert;

    #[test]
    fn default_config_is_self_consistent() {
        let config = Config::default();
        assert!(config.camera.count > 0);
        assert!(config.relay.queue_capacity > 0);
        assert!(config.camera.buffer_count > 0);
        assert!(convert::is_convertible(
            config.camera.format,
            config.relay.display_format
        ));
    }
}
