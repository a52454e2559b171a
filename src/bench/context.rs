//! Per-phase shared state
//!
//! A context is built fresh for every phase (device drained, counter zeroed,
//! semaphores at their initial counts) and dropped after the phase's threads
//! have joined. Workers only ever see it by shared reference.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

use crate::core::{SemaphorePair, SlotSnapshot};
use crate::device::{QueueDevice, QueueDeviceClient};

/// Outcome counters for one phase
#[derive(Debug, Default)]
pub struct PhaseStats {
    pub writes_ok: AtomicU64,
    pub write_errors: AtomicU64,
    pub reads_ok: AtomicU64,
    pub read_errors: AtomicU64,
    pub guard_rejections: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub writes_ok: u64,
    pub write_errors: u64,
    pub reads_ok: u64,
    pub read_errors: u64,
    pub guard_rejections: u64,
}

impl PhaseStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            writes_ok: self.writes_ok.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            reads_ok: self.reads_ok.load(Ordering::Relaxed),
            read_errors: self.read_errors.load(Ordering::Relaxed),
            guard_rejections: self.guard_rejections.load(Ordering::Relaxed),
        }
    }
}

pub struct BenchmarkContext<D> {
    queue: Mutex<QueueDeviceClient<D>>,
    slots: SemaphorePair,
    stats: PhaseStats,
}

impl<D: QueueDevice> BenchmarkContext<D> {
    /// Drains the device and sets `empty = capacity`, `full = 0`.
    ///
    /// A failed drain is logged; the phase still runs against whatever the
    /// device holds.
    pub fn new(device: D, capacity: usize) -> Self {
        let mut client = QueueDeviceClient::new(device);
        match client.drain() {
            Ok(0) => {}
            Ok(n) => info!("Drained {} stale bytes from the queue", n),
            Err(e) => warn!("Queue drain failed: {}", e),
        }

        Self {
            queue: Mutex::new(client),
            slots: SemaphorePair::new(capacity),
            stats: PhaseStats::default(),
        }
    }

    /// Runs `f` with exclusive access to the device and the shadow counter
    #[inline]
    pub fn with_queue<R>(&self, f: impl FnOnce(&mut QueueDeviceClient<D>) -> R) -> R {
        let mut queue = self.queue.lock();
        f(&mut queue)
    }

    pub fn slots(&self) -> &SemaphorePair {
        &self.slots
    }

    pub fn stats(&self) -> &PhaseStats {
        &self.stats
    }

    /// Current shadow counter value
    pub fn count(&self) -> usize {
        self.queue.lock().count()
    }

    pub fn slot_snapshot(&self) -> SlotSnapshot {
        self.slots.snapshot()
    }

    pub fn into_device(self) -> D {
        self.queue.into_inner().into_device()
    }
}
