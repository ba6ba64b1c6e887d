//! Acquisition backend seam
//!
//! The pipeline depends on a deliberately small slice of any capture stack:
//! start streaming with a handler and a buffer count, and stop streaming.
//! Everything else (discovery, feature setup, format negotiation) belongs to
//! the concrete backend.

use tracing::warn;

use crate::acquire::frame::Frame;
use crate::error::Error;

/// Per-frame callback registered with [`AcquisitionBackend::start_streaming`].
/// Invoked synchronously on a backend-owned thread, once per captured frame.
pub type FrameHandler = Box<dyn FnMut(Frame) + Send + 'static>;

pub trait AcquisitionBackend {
    /// Begin invoking `handler` once per captured frame, with `buffer_count`
    /// capture buffers in flight.
    fn start_streaming(&mut self, handler: FrameHandler, buffer_count: usize)
        -> Result<(), Error>;

    /// Stop the capture thread. Must be safe to call when not streaming.
    fn stop_streaming(&mut self) -> Result<(), Error>;
}

/// Scoped streaming session: `stop_streaming` runs exactly once however the
/// display loop exits, stop key, error or unwind.
pub struct StreamGuard<'a, B: AcquisitionBackend + ?Sized> {
    backend: &'a mut B,
    stopped: bool,
}

impl<'a, B: AcquisitionBackend + ?Sized> StreamGuard<'a, B> {
    pub fn new(backend: &'a mut B) -> Self {
        Self {
            backend,
            stopped: false,
        }
    }

    pub fn stop(&mut self) -> Result<(), Error> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        self.backend.stop_streaming()
    }
}

impl<B: AcquisitionBackend + ?Sized> Drop for StreamGuard<'_, B> {
    fn drop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            if let Err(e) = self.backend.stop_streaming() {
                warn!("stop_streaming during teardown failed: {e}");
            }
        }
    }
}
