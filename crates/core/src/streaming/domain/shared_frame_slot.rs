use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::shared::encoded_buffer::EncodedBuffer;

/// Single-value, last-write-wins holder for the most recent encoded frame.
///
/// Cloning yields another handle to the same slot. The lock guards only a
/// reference-counted pointer, so the writer never waits on a reader's I/O
/// and readers always see a complete buffer.
#[derive(Clone, Debug, Default)]
pub struct SharedFrameSlot {
    latest: Arc<Mutex<Option<EncodedBuffer>>>,
    closed: Arc<AtomicBool>,
}

impl SharedFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored buffer. The previous buffer is dropped outside
    /// the lock.
    pub fn set(&self, buffer: EncodedBuffer) {
        let previous = self.lock().replace(buffer);
        drop(previous);
    }

    pub fn get(&self) -> Option<EncodedBuffer> {
        self.lock().clone()
    }

    /// Tells publishers to finish their streams.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, Option<EncodedBuffer>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
