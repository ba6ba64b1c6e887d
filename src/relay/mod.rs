pub mod convert;
pub mod handler;
pub mod queue;
pub mod rate;

pub use handler::FrameRelay;
pub use queue::{FrameReceiver, FrameSender};
pub use rate::RateCounter;
