//! Producer-side frame handler
//!
//! Invoked once per captured frame on the backend's thread. Frame-level
//! failures are recovered locally, never propagated into the backend, and
//! the source buffer travels back to the pool on every path: the skip and
//! error paths drop the frame, which requeues it.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::acquire::backend::FrameHandler;
use crate::acquire::frame::{DisplayImage, Frame, FrameStatus, PixelFormat};
use crate::error::Error;
use crate::relay::convert;
use crate::relay::queue::FrameSender;
use crate::relay::rate::RateCounter;
use crate::RelayConfig;

const RATE_WINDOW: Duration = Duration::from_secs(1);

pub struct FrameRelay {
    config: RelayConfig,
    queue: FrameSender,
    rate: Option<RateCounter>,
    disconnected: bool,
}

impl FrameRelay {
    pub fn new(config: RelayConfig, queue: FrameSender) -> Self {
        let rate = config
            .log_rate
            .then(|| RateCounter::new(RATE_WINDOW, Instant::now()));
        Self {
            config,
            queue,
            rate,
            disconnected: false,
        }
    }

    /// Handle one delivered frame.
    pub fn handle(&mut self, frame: Frame) {
        if frame.status != FrameStatus::Complete {
            debug!(
                sequence = frame.meta.sequence,
                status = ?frame.status,
                "skipping frame"
            );
            metrics::counter!("frames_skipped").increment(1);
            return;
        }
        debug!(sequence = frame.meta.sequence, "acquired frame");

        let sequence = frame.meta.sequence;
        let image = match convert::to_display(&frame, self.config.display_format) {
            Ok(image) => image,
            Err(e) => {
                warn!("conversion failed: {e}");
                return;
            }
        };
        // The copy is made; give the buffer back before the push can block.
        frame.requeue();

        if let Some(rate) = &mut self.rate {
            if let Some(fps) = rate.tick(Instant::now()) {
                info!("current frame rate: {fps:.2} fps");
            }
        }

        if let Some(dir) = &self.config.save_dir {
            if let Err(e) = save_image(&image, dir, sequence) {
                warn!("frame save failed: {e}");
            }
        }

        if self.queue.push(image).is_err() && !self.disconnected {
            self.disconnected = true;
            debug!("display queue disconnected; discarding converted frames");
        }
    }

    /// The relay as the single function value a backend registers.
    pub fn into_handler(self) -> FrameHandler {
        let mut relay = self;
        Box::new(move |frame| relay.handle(frame))
    }
}

fn save_image(image: &DisplayImage, dir: &Path, sequence: u64) -> Result<(), Error> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("frame_{sequence:06}.png"));
    match image.format {
        PixelFormat::Rgb24 => image::save_buffer(
            &path,
            &image.data,
            image.width,
            image.height,
            image::ExtendedColorType::Rgb8,
        )?,
        PixelFormat::Bgr24 => {
            let rgb: Vec<u8> = image
                .data
                .chunks_exact(3)
                .flat_map(|px| [px[2], px[1], px[0]])
                .collect();
            image::save_buffer(
                &path,
                &rgb,
                image.width,
                image.height,
                image::ExtendedColorType::Rgb8,
            )?;
        }
        PixelFormat::Mono8 => image::save_buffer(
            &path,
            &image.data,
            image.width,
            image.height,
            image::ExtendedColorType::L8,
        )?,
        from => {
            return Err(Error::UnsupportedFormat {
                from,
                to: PixelFormat::Rgb24,
            })
        }
    }
    Ok(())
}
