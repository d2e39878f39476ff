use std::thread;
use std::time::Duration;

use crate::streaming::domain::multipart::encode_part;
use crate::streaming::domain::shared_frame_slot::SharedFrameSlot;

/// Outcome of one look at the slot.
#[derive(Debug, PartialEq, Eq)]
pub enum PublisherPoll {
    /// A complete multipart chunk for the current buffer.
    Part(Vec<u8>),
    /// Nothing published yet; retry after the poll interval.
    Pending,
    /// The slot was closed; the stream should end.
    Closed,
}

/// Per-client view of the slot. Reads only, never mutates it.
///
/// Polling runs at its own cadence, independent of the producer, so a slow
/// client sees the latest frame and a fast one may see the same frame twice.
#[derive(Clone, Debug)]
pub struct StreamPublisher {
    slot: SharedFrameSlot,
    poll_interval: Duration,
}

impl StreamPublisher {
    pub fn new(slot: SharedFrameSlot, poll_interval: Duration) -> Self {
        Self {
            slot,
            poll_interval,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn poll(&self) -> PublisherPoll {
        if self.slot.is_closed() {
            return PublisherPoll::Closed;
        }
        match self.slot.get() {
            Some(buffer) => PublisherPoll::Part(encode_part(&buffer)),
            None => PublisherPoll::Pending,
        }
    }

    /// Blocking iterator of chunks for thread-per-client transports.
    pub fn blocking_parts(self) -> BlockingParts {
        BlockingParts {
            publisher: self,
            started: false,
        }
    }
}

/// Yields one chunk per poll interval until the slot is closed. The
/// first chunk is returned without waiting.
pub struct BlockingParts {
    publisher: StreamPublisher,
    started: bool,
}

impl Iterator for BlockingParts {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        loop {
            if self.started {
                thread::sleep(self.publisher.poll_interval);
            }
            self.started = true;
            match self.publisher.poll() {
                PublisherPoll::Part(part) => return Some(part),
                PublisherPoll::Pending => continue,
                PublisherPoll::Closed => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::encoded_buffer::EncodedBuffer;
    use std::time::Instant;

    const TICK: Duration = Duration::from_millis(5);

    #[test]
    fn test_pending_before_first_publish() {
        let publisher = StreamPublisher::new(SharedFrameSlot::new(), TICK);
        assert_eq!(publisher.poll(), PublisherPoll::Pending);
    }

    #[test]
    fn test_part_wraps_current_buffer() {
        let slot = SharedFrameSlot::new();
        slot.set(EncodedBuffer::new(vec![1, 2, 3, 4]));
        let publisher = StreamPublisher::new(slot, TICK);
        match publisher.poll() {
            PublisherPoll::Part(part) => {
                assert!(part.starts_with(b"--frame\r\n"));
                assert!(part.ends_with(&[1, 2, 3, 4, b'\r', b'\n']));
            }
            other => panic!("expected a part, got {other:?}"),
        }
    }

    #[test]
    fn test_closed_wins_over_buffer() {
        let slot = SharedFrameSlot::new();
        slot.set(EncodedBuffer::new(vec![1]));
        slot.close();
        assert_eq!(StreamPublisher::new(slot, TICK).poll(), PublisherPoll::Closed);
    }

    #[test]
    fn test_blocking_parts_repeat_latest_until_closed() {
        let slot = SharedFrameSlot::new();
        slot.set(EncodedBuffer::new(vec![7; 10]));
        let mut parts = StreamPublisher::new(slot.clone(), TICK).blocking_parts();

        let first = parts.next().unwrap();
        let second = parts.next().unwrap();
        assert_eq!(first, second);

        slot.set(EncodedBuffer::new(vec![8; 10]));
        assert!(parts.next().unwrap().ends_with(&[8, b'\r', b'\n']));

        slot.close();
        assert!(parts.next().is_none());
    }

    #[test]
    fn test_blocking_parts_wait_for_first_publish() {
        let slot = SharedFrameSlot::new();
        let writer = slot.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            writer.set(EncodedBuffer::new(vec![1, 2]));
        });

        let started = Instant::now();
        let part = StreamPublisher::new(slot, TICK).blocking_parts().next();
        handle.join().unwrap();

        assert!(part.is_some());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_many_publishers_read_same_slot() {
        let slot = SharedFrameSlot::new();
        slot.set(EncodedBuffer::new(vec![3; 4]));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let publisher = StreamPublisher::new(slot.clone(), TICK);
                thread::spawn(move || publisher.blocking_parts().take(3).count())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 3);
        }
        assert_eq!(slot.get().unwrap().as_bytes(), &[3; 4]);
    }
}
