//! Queue device boundary
//!
//! The queue itself lives outside this process (a kernel character device).
//! Everything here reaches it through the `QueueDevice` capability:
//! one byte in, one byte out, or discard everything buffered.

mod char_device;
mod client;
mod memory;

pub use char_device::{CharDevice, DEFAULT_DEVICE_PATH};
pub use client::{QueueDeviceClient, SharedCounter};
pub use memory::MemoryQueue;

use crate::error::DeviceError;

/// Byte-oriented queue device
pub trait QueueDevice: Send {
    /// Transfers exactly one byte into the queue
    fn write_byte(&mut self, byte: u8) -> Result<(), DeviceError>;

    /// Takes exactly one byte out of the queue
    fn read_byte(&mut self) -> Result<u8, DeviceError>;

    /// Discards all currently buffered bytes, returning how many were dropped
    fn drain(&mut self) -> Result<usize, DeviceError>;
}
