//! Error types for pinq
//!
//! Only `SetupError` is fatal. Affinity and device errors are logged at the
//! point they happen and never leave the worker loop.

use std::io;
use thiserror::Error;

/// Fatal errors raised before (or while starting) a benchmark phase
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn worker thread {name}: {source}")]
    Spawn { name: String, source: io::Error },

    #[error("Worker thread {0} panicked")]
    WorkerPanicked(String),
}

/// Thread placement errors. Non-fatal: the thread keeps its previous affinity.
#[derive(Error, Debug)]
pub enum AffinityError {
    #[error("Invalid core ID: {core_id}. Available cores: 0-{max}")]
    InvalidCore { core_id: i64, max: usize },

    #[error("Failed to set processor affinity for core {core_id}: {reason}")]
    Platform { core_id: usize, reason: String },
}

/// Errors on the external queue device boundary
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Failed to open the device {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("Failed to read from the device: {0}")]
    Read(io::Error),

    #[error("Failed to write to the device: {0}")]
    Write(io::Error),

    #[error("Failed to drain the device: {0}")]
    Drain(io::Error),

    #[error("Queue is empty")]
    GuardRejected,
}
