//! Character device backend
//!
//! Every operation opens the device, transfers one byte and closes it again,
//! so each read/write is an independent session on the driver side.

use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use super::QueueDevice;
use crate::error::DeviceError;

pub const DEFAULT_DEVICE_PATH: &str = "/dev/myQueue";

/// Queue device reachable at a fixed filesystem path
#[derive(Debug, Clone)]
pub struct CharDevice {
    path: PathBuf,
}

impl CharDevice {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self, write: bool) -> Result<std::fs::File, DeviceError> {
        OpenOptions::new()
            .read(!write)
            .write(write)
            .open(&self.path)
            .map_err(|source| DeviceError::Open {
                path: self.path.display().to_string(),
                source,
            })
    }
}

impl QueueDevice for CharDevice {
    fn write_byte(&mut self, byte: u8) -> Result<(), DeviceError> {
        let mut file = self.open(true)?;
        file.write_all(&[byte]).map_err(DeviceError::Write)
    }

    fn read_byte(&mut self) -> Result<u8, DeviceError> {
        let mut file = self.open(false)?;
        let mut buf = [0u8; 1];
        file.read_exact(&mut buf).map_err(DeviceError::Read)?;
        Ok(buf[0])
    }

    fn drain(&mut self) -> Result<usize, DeviceError> {
        let mut file = self.open(false)?;
        let mut buf = [0u8; 4096];
        let mut drained = 0;
        loop {
            match file.read(&mut buf) {
                Ok(0) => return Ok(drained),
                Ok(n) => drained += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(DeviceError::Drain(e)),
            }
        }
    }
}
