//! One streaming session: queue, relay, display loop, guaranteed stop

use tracing::instrument;

use crate::acquire::backend::{AcquisitionBackend, StreamGuard};
use crate::display::run::DisplayLoop;
use crate::display::surface::RenderSurface;
use crate::error::Error;
use crate::relay::handler::FrameRelay;
use crate::relay::queue;
use crate::Config;

/// Stream `backend` into `surface` until the stop key or a failure.
///
/// Streaming is stopped exactly once on every exit path, including unwinds
/// out of the display loop.
#[instrument(skip_all)]
pub fn run<B, S>(backend: &mut B, surface: S, config: &Config) -> Result<(), Error>
where
    B: AcquisitionBackend + ?Sized,
    S: RenderSurface,
{
    let (tx, rx) = queue::bounded(config.relay.queue_capacity);
    let relay = FrameRelay::new(config.relay.clone(), tx);

    backend.start_streaming(relay.into_handler(), config.camera.buffer_count)?;
    let mut stream = StreamGuard::new(backend);

    let outcome = DisplayLoop::new(surface, config.display.clone(), rx).run();
    let stopped = stream.stop();
    outcome.and(stopped)
}
