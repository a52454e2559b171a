//! pinq - producer/consumer affinity benchmark
//!
//! Measures a bounded producer-consumer workload against an external byte
//! queue device twice: all workers pinned to one core, then spread across
//! distinct cores.
//!
//! Layout:
//! - core: monotonic clock, core pinning, counting semaphores, simulated work
//! - device: the external queue behind a byte-level capability
//! - bench: per-phase context, worker loops, phase runner

pub mod bench;
pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod logging;

pub use crate::bench::{BenchmarkReport, BenchmarkRunner, PhaseReport, Placement};
pub use crate::config::{BenchConfig, FailurePolicy};
pub use crate::error::{AffinityError, DeviceError, SetupError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
