//! Bounded hand-off between the relay and the display loop
//!
//! Thin wrapper over a bounded flume channel. The blocking behaviour is the
//! backpressure contract: a full queue stalls the producer until the
//! consumer pops; it never drops and never grows past capacity.

use flume::{Receiver, Sender, TryRecvError};

use crate::acquire::frame::DisplayImage;
use crate::error::Error;

pub fn bounded(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (tx, rx) = flume::bounded(capacity);
    (FrameSender { tx }, FrameReceiver { rx })
}

#[derive(Clone)]
pub struct FrameSender {
    tx: Sender<DisplayImage>,
}

impl FrameSender {
    /// Blocks while the queue is full. Fails only when the consumer is gone.
    pub fn push(&self, image: DisplayImage) -> Result<(), Error> {
        self.tx.send(image).map_err(|_| Error::Disconnected)?;
        metrics::gauge!("frame_queue_depth").set(self.tx.len() as f64);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

pub struct FrameReceiver {
    rx: Receiver<DisplayImage>,
}

impl FrameReceiver {
    /// Blocks while the queue is empty. Fails only when the producer is gone.
    pub fn pop(&self) -> Result<DisplayImage, Error> {
        let image = self.rx.recv().map_err(|_| Error::Disconnected)?;
        metrics::gauge!("frame_queue_depth").set(self.rx.len() as f64);
        Ok(image)
    }

    pub fn try_pop(&self) -> Result<Option<DisplayImage>, Error> {
        match self.rx.try_recv() {
            Ok(image) => Ok(Some(image)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::Disconnected),
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.rx.capacity().unwrap_or(usize::MAX)
    }
}
