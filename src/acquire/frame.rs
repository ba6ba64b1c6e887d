//! Frame types and the backend buffer pool

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

/// Pixel formats the pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Mono8,
    Rgb24,
    Bgr24,
    Yuyv4,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Mono8 => 1,
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => 3,
            PixelFormat::Yuyv4 => 2,
        }
    }
}

/// Completion status reported by the acquisition backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Complete,
    Incomplete,
    Invalid,
}

/// Frame metadata shared between backend and relay
#[derive(Debug, Clone)]
pub struct FrameMetadata {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    /// Bytes per image row, padding included
    pub stride: u32,
    pub format: PixelFormat,
}

/// One acquired frame.
///
/// The buffer is leased from a [`FramePool`] and travels back to it exactly
/// once: explicitly via [`Frame::requeue`], or on drop for the skip, error
/// and unwind paths.
pub struct Frame {
    buf: Option<Vec<u8>>,
    pub meta: Arc<FrameMetadata>,
    pub status: FrameStatus,
    pub timestamp: Instant,
    home: ReturnHandle,
}

impl Frame {
    pub fn data(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or(&[])
    }

    /// Return the buffer to the backend pool.
    pub fn requeue(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.home.returned.fetch_add(1, Ordering::AcqRel);
            // A closed pool means the backend is gone; the buffer just drops.
            let _ = self.home.tx.send(buf);
        }
    }
}

impl Drop for Frame {
    fn drop(&mut self) {
        self.release();
    }
}

#[derive(Clone)]
struct ReturnHandle {
    tx: flume::Sender<Vec<u8>>,
    returned: Arc<AtomicU64>,
}

/// Fixed set of capture buffers recycled between the backend and the handler.
pub struct FramePool {
    free: flume::Receiver<Vec<u8>>,
    handle: ReturnHandle,
    delivered: Arc<AtomicU64>,
}

impl FramePool {
    pub fn new(buffer_count: usize, buffer_len: usize) -> Self {
        let (tx, rx) = flume::unbounded();
        for _ in 0..buffer_count {
            let _ = tx.send(vec![0u8; buffer_len]);
        }
        Self {
            free: rx,
            handle: ReturnHandle {
                tx,
                returned: Arc::new(AtomicU64::new(0)),
            },
            delivered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lease a free buffer, waiting until the handler returns one.
    pub fn acquire(&self, timeout: Duration) -> Option<Vec<u8>> {
        self.free.recv_timeout(timeout).ok()
    }

    /// Wrap a filled buffer as a frame that owes itself back to this pool.
    pub fn wrap(&self, buf: Vec<u8>, meta: Arc<FrameMetadata>, status: FrameStatus) -> Frame {
        self.delivered.fetch_add(1, Ordering::AcqRel);
        Frame {
            buf: Some(buf),
            meta,
            status,
            timestamp: Instant::now(),
            home: self.handle.clone(),
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            delivered: self.delivered.clone(),
            returned: self.handle.returned.clone(),
        }
    }
}

/// Shared view of a pool's delivery/return accounting.
#[derive(Debug, Clone)]
pub struct PoolStats {
    delivered: Arc<AtomicU64>,
    returned: Arc<AtomicU64>,
}

impl PoolStats {
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Acquire)
    }

    pub fn returned(&self) -> u64 {
        self.returned.load(Ordering::Acquire)
    }

    pub fn outstanding(&self) -> u64 {
        self.delivered().saturating_sub(self.returned())
    }
}

/// Display-ready image: an independently owned conversion of one frame,
/// with no obligation back to the backend.
#[derive(Debug, Clone)]
pub struct DisplayImage {
    pub data: BytesMut,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl DisplayImage {
    /// Row pitch in bytes; display images are always tightly packed.
    pub fn pitch(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(format: PixelFormat) -> Arc<FrameMetadata> {
        Arc::new(FrameMetadata {
            sequence: 1,
            width: 4,
            height: 2,
            stride: 4 * format.bytes_per_pixel() as u32,
            format,
        })
    }

    #[test]
    fn requeue_returns_buffer_to_pool() {
        let pool = FramePool::new(1, 8);
        let stats = pool.stats();

        let buf = pool.acquire(Duration::from_millis(10)).unwrap();
        let frame = pool.wrap(buf, meta(PixelFormat::Mono8), FrameStatus::Complete);
        assert_eq!(stats.outstanding(), 1);

        frame.requeue();
        assert_eq!(stats.delivered(), 1);
        assert_eq!(stats.returned(), 1);
        assert!(pool.acquire(Duration::from_millis(10)).is_some());
    }

    #[test]
    fn dropping_a_frame_requeues_it() {
        let pool = FramePool::new(1, 8);
        let stats = pool.stats();

        let buf = pool.acquire(Duration::from_millis(10)).unwrap();
        drop(pool.wrap(buf, meta(PixelFormat::Mono8), FrameStatus::Incomplete));

        assert_eq!(stats.returned(), 1);
        assert_eq!(stats.outstanding(), 0);
    }

    #[test]
    fn acquire_blocks_while_all_buffers_are_out() {
        let pool = FramePool::new(1, 8);
        let buf = pool.acquire(Duration::from_millis(10)).unwrap();
        let held = pool.wrap(buf, meta(PixelFormat::Mono8), FrameStatus::Complete);

        assert!(pool.acquire(Duration::from_millis(20)).is_none());
        held.requeue();
        assert!(pool.acquire(Duration::from_millis(10)).is_some());
    }
}
