//! Device client with a local shadow of the queue occupancy
//!
//! The client is only ever reached through the phase mutex, so the shadow
//! counter is mutated under that lock by construction (`&mut self`).

use rand::Rng;
use tracing::info;

use super::QueueDevice;
use crate::error::DeviceError;

/// Items believed to be in the queue. Never queried from the device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SharedCounter(usize);

impl SharedCounter {
    pub fn get(&self) -> usize {
        self.0
    }

    fn increment(&mut self) {
        self.0 += 1;
    }

    fn decrement(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}

pub struct QueueDeviceClient<D> {
    device: D,
    counter: SharedCounter,
}

impl<D: QueueDevice> QueueDeviceClient<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            counter: SharedCounter::default(),
        }
    }

    /// Writes one random lowercase character. Returns the byte written.
    pub fn write(&mut self) -> Result<u8, DeviceError> {
        let ch = rand::thread_rng().gen_range(b'a'..=b'z');
        self.device.write_byte(ch)?;
        self.counter.increment();
        info!(
            "Wrote data: {}, Queue size: {}",
            ch as char,
            self.counter.get()
        );
        Ok(ch)
    }

    /// Reads one byte, unless the shadow counter says the queue is empty.
    ///
    /// The guard is advisory: the device's real occupancy is never asked.
    pub fn read(&mut self) -> Result<u8, DeviceError> {
        if self.counter.get() == 0 {
            return Err(DeviceError::GuardRejected);
        }
        let byte = self.device.read_byte()?;
        self.counter.decrement();
        info!(
            "Read data: {}, Queue size: {}",
            byte as char,
            self.counter.get()
        );
        Ok(byte)
    }

    /// Discards whatever the device holds and zeroes the shadow counter.
    ///
    /// The counter is reset even when the device drain fails.
    pub fn drain(&mut self) -> Result<usize, DeviceError> {
        self.counter.reset();
        self.device.drain()
    }

    pub fn count(&self) -> usize {
        self.counter.get()
    }

    pub fn into_device(self) -> D {
        self.device
    }
}
