pub mod backend;
pub mod frame;
pub mod sim;

pub use backend::{AcquisitionBackend, FrameHandler, StreamGuard};
pub use frame::{DisplayImage, Frame, FramePool, FrameStatus, PixelFormat};
pub use sim::SimCamera;
