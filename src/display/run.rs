//! Consumer-side display loop
//!
//! Runs on the main thread: watch for the stop key, pop one image, overlay
//! the frame rate, pace to the target interval, render. Pacing caps the
//! display rate only; acquisition is throttled separately, by queue
//! backpressure.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::display::overlay;
use crate::display::surface::{RenderSurface, SurfaceEvent};
use crate::error::Error;
use crate::relay::queue::FrameReceiver;
use crate::relay::rate::RateCounter;
use crate::DisplayConfig;

const RATE_WINDOW: Duration = Duration::from_secs(1);

pub struct DisplayLoop<S: RenderSurface> {
    surface: S,
    config: DisplayConfig,
    queue: FrameReceiver,
}

impl<S: RenderSurface> DisplayLoop<S> {
    pub fn new(surface: S, config: DisplayConfig, queue: FrameReceiver) -> Self {
        Self {
            surface,
            config,
            queue,
        }
    }

    /// Run until the stop key, window close, producer disconnect or a
    /// surface failure. The surface is released on every exit path;
    /// streaming shutdown belongs to the caller's
    /// [`StreamGuard`](crate::acquire::backend::StreamGuard).
    pub fn run(mut self) -> Result<(), Error> {
        let outcome = self.pump();
        let teardown = self.surface.destroy();
        if let Err(e) = &teardown {
            debug!("surface teardown failed: {e}");
        }
        outcome.and(teardown)
    }

    fn pump(&mut self) -> Result<(), Error> {
        let poll = Duration::from_millis(self.config.poll_timeout_ms);
        let target = (self.config.target_fps > 0)
            .then(|| Duration::from_secs_f64(1.0 / f64::from(self.config.target_fps)));
        let mut rate = RateCounter::new(RATE_WINDOW, Instant::now());
        let mut last_render: Option<Instant> = None;

        loop {
            match self.surface.poll_key(poll)? {
                Some(SurfaceEvent::Key(key)) if key == self.config.stop_key => {
                    info!("stop key received");
                    return Ok(());
                }
                Some(SurfaceEvent::Closed) => {
                    info!("window closed");
                    return Ok(());
                }
                _ => {}
            }

            let mut image = match self.queue.pop() {
                Ok(image) => image,
                Err(_) => {
                    info!("frame source disconnected");
                    return Ok(());
                }
            };

            rate.tick(Instant::now());
            overlay::draw_label(
                &mut image,
                &format!("FPS: {:.2}", rate.fps()),
                10,
                10,
                2,
            );

            // Sleep off the residual of the target frame interval.
            if let (Some(target), Some(last)) = (target, last_render) {
                let since = last.elapsed();
                if since < target {
                    std::thread::sleep(target - since);
                }
            }

            self.surface.show(&image)?;
            last_render = Some(Instant::now());
        }
    }
}
