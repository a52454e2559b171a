//! pinq binary
//!
//! Runs the single-core phase, then the multi-core phase, against the queue
//! device at /dev/myQueue and prints both durations.
//!
//! Usage:
//!   cargo run --release

use std::process::ExitCode;

use pinq::device::CharDevice;
use pinq::logging::init_logging;
use pinq::{BenchConfig, BenchmarkRunner, Placement};
use tracing::{error, Level};

fn main() -> ExitCode {
    if let Err(e) = init_logging(Level::INFO) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = BenchConfig::default();

    println!("🚀 pinq v{} - Affinity Benchmark", pinq::VERSION);
    println!("====================================");
    println!("  Device:     {}", config.device_path.display());
    println!(
        "  Capacity:   {} (producer writes {})",
        config.capacity, config.items_produced
    );
    println!(
        "  Consumers:  {} x {} reads",
        config.consumer_count, config.items_per_consumer
    );
    println!("  Work cost:  {} iterations", config.work_cost.iterations());
    println!("====================================\n");

    let runner = match BenchmarkRunner::new(config) {
        Ok(runner) => runner,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let device_path = runner.config().device_path.clone();
    let mut durations = Vec::with_capacity(2);
    for (placement, label) in [
        (Placement::SingleCore, "Single-core"),
        (Placement::MultiCore, "Multi-core"),
    ] {
        println!("Running {} test:", placement);
        let report = match runner.run_phase(placement, CharDevice::new(&device_path)) {
            Ok(report) => report,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        println!("{} duration: {:.6} seconds\n", label, report.duration_secs);
        durations.push(report.duration_secs);
    }

    println!("singlecore duration -> {:.6}", durations[0]);
    println!("multicore duration -> {:.6}", durations[1]);

    ExitCode::SUCCESS
}
