//! Diagnostic output setup
//!
//! Library code only emits `tracing` events. The binary installs the
//! subscriber once; the level is fixed because the tool reads no
//! environment.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs a global fmt subscriber with thread ids and names on every line.
///
/// Fails if a global subscriber is already set.
pub fn init_logging(level: Level) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
}
