//! Synthetic acquisition backend
//!
//! Stands in for a vendor capture stack: a worker thread leases buffers from
//! a fixed pool, fills them with a moving test pattern and invokes the
//! registered handler at the configured rate. Backpressure from the handler
//! throttles the worker the same way it would throttle an SDK callback
//! thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::acquire::backend::{AcquisitionBackend, FrameHandler};
use crate::acquire::frame::{FrameMetadata, FramePool, FrameStatus, PixelFormat, PoolStats};
use crate::error::Error;
use crate::relay::convert;
use crate::CameraConfig;

const ACQUIRE_TIMEOUT: Duration = Duration::from_millis(50);

#[derive(Debug)]
pub struct SimCamera {
    id: String,
    config: CameraConfig,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    stats: Option<PoolStats>,
    stop_calls: Arc<AtomicU64>,
}

/// Enumerate the synthetic cameras the configuration declares.
pub fn discover(config: &CameraConfig) -> Vec<SimCamera> {
    (0..config.count)
        .map(|i| SimCamera::new(format!("SIM-{i}"), config.clone()))
        .collect()
}

/// Pick a camera by id, or the first available when no id was given.
pub fn select_camera(cameras: Vec<SimCamera>, id: Option<&str>) -> Result<SimCamera, Error> {
    match id {
        Some(id) => cameras
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| Error::CameraUnavailable(id.to_string())),
        None => {
            let mut cameras = cameras;
            if cameras.is_empty() {
                return Err(Error::NoCameras);
            }
            Ok(cameras.remove(0))
        }
    }
}

impl SimCamera {
    pub fn new(id: String, config: CameraConfig) -> Self {
        Self {
            id,
            config,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            stats: None,
            stop_calls: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> String {
        format!("Iris simulated camera {}", self.id)
    }

    /// Check that this camera's capture format converts to `display`.
    ///
    /// Runs before streaming; a failure here is fatal, the way a real
    /// backend's format negotiation would be.
    pub fn negotiate_display_format(&self, display: PixelFormat) -> Result<(), Error> {
        if convert::is_convertible(self.config.format, display) {
            Ok(())
        } else {
            Err(Error::UnsupportedFormat {
                from: self.config.format,
                to: display,
            })
        }
    }

    /// Pool accounting for the current stream; None before the first start.
    pub fn pool_stats(&self) -> Option<PoolStats> {
        self.stats.clone()
    }

    pub fn stop_calls(&self) -> u64 {
        self.stop_calls.load(Ordering::Acquire)
    }
}

impl AcquisitionBackend for SimCamera {
    fn start_streaming(
        &mut self,
        mut handler: FrameHandler,
        buffer_count: usize,
    ) -> Result<(), Error> {
        if self.worker.is_some() {
            warn!(camera = %self.id, "stream already running");
            return Ok(());
        }

        let cfg = self.config.clone();
        let frame_len =
            (cfg.width as usize) * (cfg.height as usize) * cfg.format.bytes_per_pixel();
        let pool = FramePool::new(buffer_count, frame_len);
        self.stats = Some(pool.stats());
        self.running.store(true, Ordering::Release);

        let running = self.running.clone();
        let worker = thread::Builder::new()
            .name(format!("{}-capture", self.id))
            .spawn(move || {
                let interval = Duration::from_secs_f64(1.0 / f64::from(cfg.fps.max(1)));
                let stride = cfg.width * cfg.format.bytes_per_pixel() as u32;
                let mut sequence = 0u64;
                let mut next_due = Instant::now();

                while running.load(Ordering::Acquire) {
                    // Wait for a free buffer; the timeout keeps shutdown
                    // responsive when every buffer is outstanding.
                    let Some(mut buf) = pool.acquire(ACQUIRE_TIMEOUT) else {
                        continue;
                    };
                    sequence += 1;

                    let status = match cfg.incomplete_every {
                        Some(n) if n > 0 && sequence % n == 0 => FrameStatus::Incomplete,
                        _ => FrameStatus::Complete,
                    };
                    if status == FrameStatus::Complete {
                        fill_pattern(&mut buf, &cfg, sequence);
                    }

                    let meta = Arc::new(FrameMetadata {
                        sequence,
                        width: cfg.width,
                        height: cfg.height,
                        stride,
                        format: cfg.format,
                    });
                    handler(pool.wrap(buf, meta, status));

                    next_due += interval;
                    let now = Instant::now();
                    if next_due > now {
                        thread::sleep(next_due - now);
                    } else {
                        next_due = now;
                    }
                }
                debug!("capture worker exiting");
            })?;

        self.worker = Some(worker);
        info!(camera = %self.id, buffers = buffer_count, "streaming started");
        Ok(())
    }

    fn stop_streaming(&mut self) -> Result<(), Error> {
        self.stop_calls.fetch_add(1, Ordering::AcqRel);
        self.running.store(false, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
            info!(camera = %self.id, "streaming stopped");
        }
        Ok(())
    }
}

/// Moving gradient so consecutive frames are visibly distinct.
fn fill_pattern(buf: &mut [u8], config: &CameraConfig, sequence: u64) {
    let width = config.width as usize;
    let shift = (sequence & 0xff) as u8;

    match config.format {
        PixelFormat::Mono8 => {
            for (i, px) in buf.iter_mut().enumerate() {
                *px = ((i % width) as u8).wrapping_add(shift);
            }
        }
        PixelFormat::Rgb24 | PixelFormat::Bgr24 => {
            for (i, px) in buf.chunks_exact_mut(3).enumerate() {
                px[0] = ((i % width) as u8).wrapping_add(shift);
                px[1] = (i / width) as u8;
                px[2] = shift;
            }
        }
        PixelFormat::Yuyv4 => {
            // Luma gradient with neutral chroma.
            for (i, px) in buf.chunks_exact_mut(4).enumerate() {
                let luma = ((i * 2 % width) as u8).wrapping_add(shift);
                px[0] = luma;
                px[1] = 128;
                px[2] = luma.wrapping_add(1);
                px[3] = 128;
            }
        }
    }
}
