//! Core primitives of the harness
//!
//! - time: monotonic phase timing
//! - affinity: pin the calling thread to one core
//! - semaphore: counting semaphores for empty/full slots
//! - work: fixed-cost simulated processing

pub mod affinity;
pub mod semaphore;
pub mod time;
pub mod work;

pub use affinity::{AffinityManager, AffinitySupport};
pub use semaphore::{SemaphorePair, SlotSnapshot};
pub use time::TimeSource;
pub use work::WorkCost;
