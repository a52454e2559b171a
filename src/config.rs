//! Benchmark configuration
//!
//! No CLI flags and no environment variables: the defaults are the fixed
//! workload, the `with_*` setters exist for tests and embedding.

use std::path::PathBuf;

use crate::core::WorkCost;
use crate::device::DEFAULT_DEVICE_PATH;
use crate::error::SetupError;

/// What a producer does with its permit when the device write fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Signal `full_slots` anyway. Keeps every phase live; the consumer that
    /// takes this permit may then hit the empty-queue guard.
    #[default]
    SignalFull,
    /// Hand the permit back to `empty_slots`. No phantom items, but consumers
    /// can wait forever if failures eat the produced-minus-read surplus.
    RestoreEmpty,
}

#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub device_path: PathBuf,
    /// Queue capacity C, the initial `empty_slots` count
    pub capacity: usize,
    /// Write iterations of the single producer
    pub items_produced: usize,
    pub consumer_count: usize,
    /// Read iterations of each consumer, independent of consumer count
    pub items_per_consumer: usize,
    pub work_cost: WorkCost,
    pub failure_policy: FailurePolicy,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            device_path: PathBuf::from(DEFAULT_DEVICE_PATH),
            capacity: 30,
            items_produced: 30,
            consumer_count: 4,
            items_per_consumer: 5,
            work_cost: WorkCost::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl BenchConfig {
    pub fn with_device_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.device_path = path.into();
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_items_produced(mut self, items: usize) -> Self {
        self.items_produced = items;
        self
    }

    pub fn with_consumers(mut self, count: usize, items_per_consumer: usize) -> Self {
        self.consumer_count = count;
        self.items_per_consumer = items_per_consumer;
        self
    }

    pub fn with_work_cost(mut self, cost: WorkCost) -> Self {
        self.work_cost = cost;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Reads performed by all consumers together (saturates on overflow)
    pub fn total_reads(&self) -> usize {
        self.consumer_count.saturating_mul(self.items_per_consumer)
    }

    /// Threads per phase: one producer plus the consumers
    pub fn thread_count(&self) -> usize {
        self.consumer_count.saturating_add(1)
    }

    /// Items expected in the queue after a failure-free phase
    pub fn expected_leftover(&self) -> usize {
        self.items_produced.saturating_sub(self.total_reads())
    }

    /// Rejects workloads that cannot run to completion.
    ///
    /// Consumers need `total_reads` full permits and only the producer makes
    /// them. The producer needs `items_produced` empty permits and gets
    /// `capacity` up front plus one per consumer read.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.capacity == 0 {
            return Err(SetupError::InvalidConfig(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if self.consumer_count == 0 {
            return Err(SetupError::InvalidConfig(
                "at least one consumer is required".to_string(),
            ));
        }
        let total_reads = self
            .consumer_count
            .checked_mul(self.items_per_consumer)
            .ok_or_else(|| {
                SetupError::InvalidConfig(format!(
                    "{} consumers x {} reads overflows",
                    self.consumer_count, self.items_per_consumer
                ))
            })?;
        if total_reads > self.items_produced {
            return Err(SetupError::InvalidConfig(format!(
                "consumers read {} items but the producer only writes {}",
                total_reads, self.items_produced
            )));
        }
        let freed_slots = self.capacity.checked_add(total_reads).ok_or_else(|| {
            SetupError::InvalidConfig(format!(
                "capacity {} plus {} reads overflows",
                self.capacity, total_reads
            ))
        })?;
        if self.items_produced > freed_slots {
            return Err(SetupError::InvalidConfig(format!(
                "producer writes {} items but only {} slots ever free up",
                self.items_produced, freed_slots
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workload() {
        let config = BenchConfig::default();
        assert_eq!(config.capacity, 30);
        assert_eq!(config.items_produced, 30);
        assert_eq!(config.total_reads(), 20);
        assert_eq!(config.thread_count(), 5);
        assert_eq!(config.expected_leftover(), 10);
        assert_eq!(config.failure_policy, FailurePolicy::SignalFull);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_capacity() {
        let config = BenchConfig::default().with_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(SetupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_rejects_no_consumers() {
        let config = BenchConfig::default().with_consumers(0, 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_starved_consumers() {
        let config = BenchConfig::default().with_consumers(4, 10);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_blocked_producer() {
        let config = BenchConfig::default()
            .with_capacity(5)
            .with_items_produced(30)
            .with_consumers(4, 5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overflowing_reads_are_rejected() {
        let config = BenchConfig::default()
            .with_items_produced(usize::MAX)
            .with_consumers(usize::MAX, 2);
        assert!(matches!(
            config.validate(),
            Err(SetupError::InvalidConfig(_))
        ));
        assert_eq!(config.total_reads(), usize::MAX);
        assert_eq!(config.thread_count(), usize::MAX);
    }

    #[test]
    fn test_overflowing_capacity_is_rejected() {
        let config = BenchConfig::default()
            .with_capacity(usize::MAX)
            .with_items_produced(usize::MAX)
            .with_consumers(1, 5);
        assert!(matches!(
            config.validate(),
            Err(SetupError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_balanced_workload_is_valid() {
        let config = BenchConfig::default()
            .with_capacity(4)
            .with_items_produced(20)
            .with_consumers(4, 5);
        assert!(config.validate().is_ok());
        assert_eq!(config.expected_leftover(), 0);
    }
}
