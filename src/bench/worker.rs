//! Producer and consumer loop bodies
//!
//! Each iteration: semaphore wait, device access under the context mutex,
//! semaphore signal, then the fixed simulated work. Failures are logged and
//! counted here and never end the loop.

use std::sync::atomic::Ordering;
use tracing::{error, info};

use super::BenchmarkContext;
use crate::config::FailurePolicy;
use crate::core::{AffinityManager, WorkCost};
use crate::device::QueueDevice;
use crate::error::DeviceError;

/// Core a worker was assigned and the cores it may run on after pinning.
///
/// `cores` is `None` where the platform cannot report a thread's mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPlacement {
    pub core_id: usize,
    pub cores: Option<Vec<usize>>,
}

impl WorkerPlacement {
    fn pin(core_id: usize, affinity: &AffinityManager) -> Self {
        // Errors already logged; the thread just stays unpinned
        let _ = affinity.pin(core_id as i64);
        Self {
            core_id,
            cores: affinity.current_cores(),
        }
    }

    /// Eligible set is exactly the assigned core
    pub fn is_pinned(&self) -> bool {
        self.cores.as_deref() == Some(&[self.core_id][..])
    }
}

/// Single writer of a phase
#[derive(Debug, Clone, Copy)]
pub struct ProducerWorker {
    pub core_id: usize,
    pub iterations: usize,
    pub work: WorkCost,
    pub policy: FailurePolicy,
}

impl ProducerWorker {
    pub fn run<D: QueueDevice>(
        &self,
        ctx: &BenchmarkContext<D>,
        affinity: &AffinityManager,
    ) -> WorkerPlacement {
        let placement = WorkerPlacement::pin(self.core_id, affinity);
        info!("Writer thread on core {} started", self.core_id);

        let slots = ctx.slots();
        let stats = ctx.stats();

        for i in 0..self.iterations {
            slots.wait_empty();

            match ctx.with_queue(|queue| queue.write()) {
                Ok(_) => {
                    stats.writes_ok.fetch_add(1, Ordering::Relaxed);
                    slots.signal_full();
                }
                Err(e) => {
                    stats.write_errors.fetch_add(1, Ordering::Relaxed);
                    error!("Error writing to queue (iteration {}): {}", i, e);
                    match self.policy {
                        FailurePolicy::SignalFull => slots.signal_full(),
                        FailurePolicy::RestoreEmpty => slots.signal_empty(),
                    }
                }
            }

            self.work.run();
        }

        info!("Writer thread on core {} finished", self.core_id);
        placement
    }
}

/// One of the readers of a phase
#[derive(Debug, Clone, Copy)]
pub struct ConsumerWorker {
    pub core_id: usize,
    pub iterations: usize,
    pub work: WorkCost,
}

impl ConsumerWorker {
    pub fn run<D: QueueDevice>(
        &self,
        ctx: &BenchmarkContext<D>,
        affinity: &AffinityManager,
    ) -> WorkerPlacement {
        let placement = WorkerPlacement::pin(self.core_id, affinity);
        info!("Reader thread on core {} started", self.core_id);

        let slots = ctx.slots();
        let stats = ctx.stats();

        for i in 0..self.iterations {
            slots.wait_full();

            match ctx.with_queue(|queue| queue.read()) {
                Ok(_) => {
                    stats.reads_ok.fetch_add(1, Ordering::Relaxed);
                }
                Err(DeviceError::GuardRejected) => {
                    stats.guard_rejections.fetch_add(1, Ordering::Relaxed);
                    error!("Error reading from queue (iteration {}): Queue is empty", i);
                }
                Err(e) => {
                    stats.read_errors.fetch_add(1, Ordering::Relaxed);
                    error!("Error reading from queue (iteration {}): {}", i, e);
                }
            }

            // Always hand the slot back, whatever the read did
            slots.signal_empty();

            self.work.run();
        }

        info!("Reader thread on core {} finished", self.core_id);
        placement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MemoryQueue;

    fn producer(iterations: usize, policy: FailurePolicy) -> ProducerWorker {
        ProducerWorker {
            core_id: 0,
            iterations,
            work: WorkCost::none(),
            policy,
        }
    }

    #[test]
    fn test_producer_fills_queue() {
        let queue = MemoryQueue::new(10);
        let ctx = BenchmarkContext::new(queue.clone(), 10);

        let placement =
            producer(10, FailurePolicy::SignalFull).run(&ctx, &AffinityManager::unsupported());

        assert_eq!(placement.core_id, 0);
        assert_eq!(placement.cores, None);
        assert!(!placement.is_pinned());
        assert_eq!(ctx.count(), 10);
        assert_eq!(queue.len(), 10);
        let slots = ctx.slot_snapshot();
        assert_eq!((slots.empty, slots.full, slots.held), (0, 10, 0));
    }

    #[test]
    fn test_producer_restores_permit_on_failure() {
        // Device holds 3 bytes, so 2 of the 5 writes fail
        let ctx = BenchmarkContext::new(MemoryQueue::new(3), 5);

        producer(5, FailurePolicy::RestoreEmpty).run(&ctx, &AffinityManager::unsupported());

        let stats = ctx.stats().snapshot();
        assert_eq!(stats.writes_ok, 3);
        assert_eq!(stats.write_errors, 2);
        assert_eq!(ctx.count(), 3);
        let slots = ctx.slot_snapshot();
        assert_eq!((slots.empty, slots.full), (2, 3));
    }

    #[test]
    fn test_producer_signals_full_on_failure() {
        let ctx = BenchmarkContext::new(MemoryQueue::new(3), 5);

        producer(5, FailurePolicy::SignalFull).run(&ctx, &AffinityManager::unsupported());

        assert_eq!(ctx.count(), 3);
        let slots = ctx.slot_snapshot();
        assert_eq!((slots.empty, slots.full), (0, 5));
    }

    #[test]
    fn test_consumer_guard_rejection_still_frees_slot() {
        let ctx = BenchmarkContext::new(MemoryQueue::new(4), 4);
        // Phantom full permit with nothing behind it
        ctx.slots().wait_empty();
        ctx.slots().signal_full();

        let consumer = ConsumerWorker {
            core_id: 0,
            iterations: 1,
            work: WorkCost::none(),
        };
        consumer.run(&ctx, &AffinityManager::unsupported());

        let stats = ctx.stats().snapshot();
        assert_eq!(stats.guard_rejections, 1);
        assert_eq!(stats.reads_ok, 0);
        assert_eq!(ctx.slot_snapshot().empty, 4);
        assert_eq!(ctx.count(), 0);
    }
}
