//! Benchmark harness: one shared context per phase, one producer and N
//! consumers on dedicated OS threads, timed end to end.

mod context;
mod runner;
mod worker;

pub use context::{BenchmarkContext, PhaseStats, StatsSnapshot};
pub use runner::{BenchmarkReport, BenchmarkRunner, PhaseReport, Placement};
pub use worker::{ConsumerWorker, ProducerWorker, WorkerPlacement};
