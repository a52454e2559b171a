//! In-process bounded FIFO standing in for the kernel queue
//!
//! Clones share the same buffer, so a test can keep a handle and inspect
//! what a benchmark phase left behind.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use super::QueueDevice;
use crate::error::DeviceError;

#[derive(Debug, Clone)]
pub struct MemoryQueue {
    buffer: Arc<Mutex<VecDeque<u8>>>,
    capacity: usize,
}

impl MemoryQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Copy of the buffered bytes, oldest first
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().iter().copied().collect()
    }
}

impl QueueDevice for MemoryQueue {
    fn write_byte(&mut self, byte: u8) -> Result<(), DeviceError> {
        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            return Err(DeviceError::Write(io::Error::new(
                io::ErrorKind::Other,
                "queue full",
            )));
        }
        buffer.push_back(byte);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, DeviceError> {
        self.buffer
            .lock()
            .pop_front()
            .ok_or_else(|| DeviceError::Read(io::Error::from(io::ErrorKind::UnexpectedEof)))
    }

    fn drain(&mut self) -> Result<usize, DeviceError> {
        let mut buffer = self.buffer.lock();
        let drained = buffer.len();
        buffer.clear();
        Ok(drained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = MemoryQueue::new(4);
        queue.write_byte(b'a').unwrap();
        queue.write_byte(b'b').unwrap();

        assert_eq!(queue.read_byte().unwrap(), b'a');
        assert_eq!(queue.read_byte().unwrap(), b'b');
        assert!(queue.read_byte().is_err());
    }

    #[test]
    fn test_capacity_enforced() {
        let mut queue = MemoryQueue::new(2);
        assert_eq!(queue.capacity(), 2);
        queue.write_byte(b'a').unwrap();
        queue.write_byte(b'b').unwrap();
        assert!(matches!(queue.write_byte(b'c'), Err(DeviceError::Write(_))));
    }

    #[test]
    fn test_clones_share_buffer() {
        let mut queue = MemoryQueue::new(8);
        let observer = queue.clone();
        queue.write_byte(b'z').unwrap();
        assert_eq!(observer.contents(), vec![b'z']);

        assert_eq!(queue.drain().unwrap(), 1);
        assert!(observer.is_empty());
    }
}
