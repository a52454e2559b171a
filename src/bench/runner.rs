//! Phase orchestration: RESET -> SPAWN -> RUN -> JOIN -> RECORD
//!
//! Phases run one after the other and share nothing. Workers borrow the
//! phase context through `thread::scope`, so none of them can outlive it.

use std::thread;
use tracing::{info, warn};

use super::{BenchmarkContext, ConsumerWorker, ProducerWorker, StatsSnapshot, WorkerPlacement};
use crate::config::BenchConfig;
use crate::core::{AffinityManager, SlotSnapshot, TimeSource};
use crate::device::QueueDevice;
use crate::error::SetupError;

/// Thread placement strategy of a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Every worker on core 0
    SingleCore,
    /// Producer on core 0, consumer `i` on core `i + 1`
    MultiCore,
}

impl Placement {
    pub fn producer_core(&self) -> usize {
        0
    }

    pub fn consumer_core(&self, index: usize) -> usize {
        match self {
            Self::SingleCore => 0,
            Self::MultiCore => index + 1,
        }
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleCore => write!(f, "single-core"),
            Self::MultiCore => write!(f, "multi-core"),
        }
    }
}

/// Result of one phase. Written once, after every worker has joined.
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub placement: Placement,
    /// Wall time from just before spawning to after the last join (seconds)
    pub duration_secs: f64,
    /// Shadow counter at the end of the phase
    pub final_count: usize,
    pub stats: StatsSnapshot,
    pub slots: SlotSnapshot,
    /// Thread name and placement of every joined worker, producer first
    pub workers: Vec<(String, WorkerPlacement)>,
}

#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub single_core: PhaseReport,
    pub multi_core: PhaseReport,
}

pub struct BenchmarkRunner {
    config: BenchConfig,
    affinity: AffinityManager,
    clock: TimeSource,
}

impl BenchmarkRunner {
    /// Validates the config and detects affinity support.
    pub fn new(config: BenchConfig) -> Result<Self, SetupError> {
        config.validate()?;
        let affinity = AffinityManager::detect();

        info!(
            "Affinity: {}, {} cores online",
            affinity.support(),
            affinity.core_count()
        );
        if affinity.core_count() < config.thread_count() {
            warn!(
                "Multi-core phase wants {} cores, only {} online; extra workers run unpinned",
                config.thread_count(),
                affinity.core_count()
            );
        }

        Ok(Self {
            config,
            affinity,
            clock: TimeSource::new(),
        })
    }

    pub fn with_affinity(mut self, affinity: AffinityManager) -> Self {
        self.affinity = affinity;
        self
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// Single-core phase then multi-core phase, each on a fresh device handle
    pub fn run<D, F>(&self, mut make_device: F) -> Result<BenchmarkReport, SetupError>
    where
        D: QueueDevice,
        F: FnMut() -> D,
    {
        info!("Running single-core test:");
        let single_core = self.run_phase(Placement::SingleCore, make_device())?;

        info!("Running multi-core test:");
        let multi_core = self.run_phase(Placement::MultiCore, make_device())?;

        Ok(BenchmarkReport {
            single_core,
            multi_core,
        })
    }

    pub fn run_phase<D: QueueDevice>(
        &self,
        placement: Placement,
        device: D,
    ) -> Result<PhaseReport, SetupError> {
        // RESET
        let ctx = BenchmarkContext::new(device, self.config.capacity);

        let producer = ProducerWorker {
            core_id: placement.producer_core(),
            iterations: self.config.items_produced,
            work: self.config.work_cost,
            policy: self.config.failure_policy,
        };
        let consumers: Vec<ConsumerWorker> = (0..self.config.consumer_count)
            .map(|i| ConsumerWorker {
                core_id: placement.consumer_core(i),
                iterations: self.config.items_per_consumer,
                work: self.config.work_cost,
            })
            .collect();

        // RUN
        let start = self.clock.now();

        let ctx_ref = &ctx;
        let affinity = &self.affinity;
        let workers: Vec<(String, WorkerPlacement)> = thread::scope(|scope| {
            // SPAWN
            let mut handles = Vec::with_capacity(consumers.len() + 1);
            let mut spawn_error = None;

            let name = "producer-0".to_string();
            match thread::Builder::new()
                .name(name.clone())
                .spawn_scoped(scope, move || producer.run(ctx_ref, affinity))
            {
                Ok(handle) => handles.push((name, handle)),
                Err(source) => spawn_error = Some(SetupError::Spawn { name, source }),
            }

            for (i, consumer) in consumers.iter().copied().enumerate() {
                if spawn_error.is_some() {
                    break;
                }
                let name = format!("consumer-{}", i + 1);
                match thread::Builder::new()
                    .name(name.clone())
                    .spawn_scoped(scope, move || consumer.run(ctx_ref, affinity))
                {
                    Ok(handle) => handles.push((name, handle)),
                    Err(source) => spawn_error = Some(SetupError::Spawn { name, source }),
                }
            }

            // JOIN: no timeout, each worker stops after its fixed iterations
            let mut first_error = spawn_error;
            let mut workers = Vec::with_capacity(handles.len());
            for (name, handle) in handles {
                match handle.join() {
                    Ok(placement) => workers.push((name, placement)),
                    Err(_) => {
                        if first_error.is_none() {
                            first_error = Some(SetupError::WorkerPanicked(name));
                        }
                    }
                }
            }

            match first_error {
                Some(e) => Err(e),
                None => Ok(workers),
            }
        })?;

        // RECORD
        let end = self.clock.now();
        let report = PhaseReport {
            placement,
            duration_secs: end - start,
            final_count: ctx.count(),
            stats: ctx.stats().snapshot(),
            slots: ctx.slot_snapshot(),
            workers,
        };

        info!(
            "{} duration: {:.6} seconds (queue size {}, {} writes, {} reads, {} failures)",
            placement,
            report.duration_secs,
            report.final_count,
            report.stats.writes_ok,
            report.stats.reads_ok,
            report.stats.write_errors + report.stats.read_errors + report.stats.guard_rejections
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorkCost;
    use crate::device::MemoryQueue;

    #[test]
    fn test_placement_cores() {
        assert_eq!(Placement::SingleCore.producer_core(), 0);
        assert_eq!(Placement::SingleCore.consumer_core(3), 0);
        assert_eq!(Placement::MultiCore.producer_core(), 0);
        let cores: Vec<usize> = (0..4).map(|i| Placement::MultiCore.consumer_core(i)).collect();
        assert_eq!(cores, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_runner_rejects_invalid_config() {
        let config = BenchConfig::default().with_capacity(0);
        assert!(BenchmarkRunner::new(config).is_err());
    }

    #[test]
    fn test_phase_without_affinity() {
        let config = BenchConfig::default().with_work_cost(WorkCost::new(1_000));
        let runner = BenchmarkRunner::new(config)
            .unwrap()
            .with_affinity(AffinityManager::unsupported());

        let queue = MemoryQueue::new(30);
        let report = runner.run_phase(Placement::SingleCore, queue.clone()).unwrap();

        assert_eq!(report.final_count, 10);
        assert_eq!(queue.len(), 10);
        assert_eq!(report.stats.writes_ok, 30);
        assert_eq!(report.stats.reads_ok, 20);
        assert_eq!(report.slots.total(), 30);
        assert!(report.duration_secs > 0.0);

        let names: Vec<&str> = report.workers.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["producer-0", "consumer-1", "consumer-2", "consumer-3", "consumer-4"]
        );
        assert!(report.workers.iter().all(|(_, p)| p.core_id == 0));
    }
}
