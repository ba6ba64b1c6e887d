//! Rendering surface seam

use std::time::Duration;

use crate::acquire::frame::DisplayImage;
use crate::error::Error;

/// Key code the default configuration stops on (Enter).
pub const ENTER_KEY: i32 = 13;

/// Input observed while polling the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// A key press, by platform key code.
    Key(i32),
    /// The window was asked to close.
    Closed,
}

/// The slice of a window/renderer library the display loop depends on.
pub trait RenderSurface {
    /// Present one image.
    fn show(&mut self, image: &DisplayImage) -> Result<(), Error>;

    /// Wait up to `timeout` for one input event.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<SurfaceEvent>, Error>;

    /// Release the window.
    fn destroy(&mut self) -> Result<(), Error>;
}
