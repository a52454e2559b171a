//! Core affinity: bind the calling thread to exactly one logical core
//!
//! The capability is detected once at startup:
//! - Native: Linux `sched_setaffinity` on the calling thread via libc
//! - Portable: `core_affinity` on the other platforms it supports
//! - Unsupported: every pin is a logged no-op that reports success
//!
//! A failed pin is never fatal. The thread just keeps its previous mask.

use tracing::{error, info, warn};

use crate::error::AffinityError;

/// How this platform can restrict thread placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffinitySupport {
    Native,
    Portable,
    Unsupported,
}

impl std::fmt::Display for AffinitySupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Portable => write!(f, "portable"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Pins threads to cores. Cheap to copy into every worker.
#[derive(Debug, Clone, Copy)]
pub struct AffinityManager {
    support: AffinitySupport,
    core_count: usize,
}

impl AffinityManager {
    /// Detects affinity support and samples the online core count.
    ///
    /// The count is taken here, before any pinning, because some
    /// platform queries shrink to the caller's current mask.
    pub fn detect() -> Self {
        let support = if cfg!(target_os = "linux") {
            AffinitySupport::Native
        } else if core_affinity::get_core_ids().is_some() {
            AffinitySupport::Portable
        } else {
            AffinitySupport::Unsupported
        };

        Self {
            support,
            core_count: online_cores(),
        }
    }

    /// Manager that never pins. Used where placement must not change.
    pub fn unsupported() -> Self {
        Self {
            support: AffinitySupport::Unsupported,
            core_count: online_cores(),
        }
    }

    pub fn support(&self) -> AffinitySupport {
        self.support
    }

    /// Logical cores online when the manager was created
    pub fn core_count(&self) -> usize {
        self.core_count
    }

    /// Restricts the calling thread to `{core_id}`.
    ///
    /// Out-of-range ids (negative or `>= core_count`) and platform failures
    /// are logged and returned as errors without touching the thread mask.
    pub fn pin(&self, core_id: i64) -> Result<(), AffinityError> {
        if self.support == AffinitySupport::Unsupported {
            info!("Thread affinity unsupported, core {} ignored", core_id);
            return Ok(());
        }

        let core = match usize::try_from(core_id) {
            Ok(core) if core < self.core_count => core,
            _ => {
                let err = AffinityError::InvalidCore {
                    core_id,
                    max: self.core_count.saturating_sub(1),
                };
                error!("{}", err);
                return Err(err);
            }
        };

        let result = match self.support {
            AffinitySupport::Native => set_native(core),
            AffinitySupport::Portable => set_portable(core),
            AffinitySupport::Unsupported => Ok(()),
        };

        match result {
            Ok(()) => {
                info!(
                    "Thread {:?} assigned to core {}",
                    std::thread::current().id(),
                    core
                );
                Ok(())
            }
            Err(reason) => {
                let err = AffinityError::Platform {
                    core_id: core,
                    reason,
                };
                error!("{}", err);
                Err(err)
            }
        }
    }

    /// Cores the calling thread may currently run on.
    ///
    /// Only the native backend can query the mask; others return `None`.
    pub fn current_cores(&self) -> Option<Vec<usize>> {
        match self.support {
            AffinitySupport::Native => get_native(),
            _ => {
                warn!("Affinity mask query not available ({})", self.support);
                None
            }
        }
    }
}

#[cfg(unix)]
fn online_cores() -> usize {
    // SAFETY: sysconf has no preconditions
    let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
    if n > 0 {
        n as usize
    } else {
        num_cpus::get()
    }
}

#[cfg(not(unix))]
fn online_cores() -> usize {
    num_cpus::get()
}

#[cfg(target_os = "linux")]
fn set_native(core: usize) -> Result<(), String> {
    if core >= libc::CPU_SETSIZE as usize {
        return Err(format!("core exceeds CPU_SETSIZE ({})", libc::CPU_SETSIZE));
    }

    // SAFETY: cpu_set_t is plain data; pid 0 targets the calling thread
    let rc = unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(core, &mut set);
        libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
    };

    if rc != 0 {
        return Err(std::io::Error::last_os_error().to_string());
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn set_native(core: usize) -> Result<(), String> {
    set_portable(core)
}

#[cfg(target_os = "linux")]
fn get_native() -> Option<Vec<usize>> {
    // SAFETY: the kernel fills a zeroed cpu_set_t of the size we pass
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        if libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set) != 0 {
            return None;
        }
        Some(
            (0..libc::CPU_SETSIZE as usize)
                .filter(|&core| libc::CPU_ISSET(core, &set))
                .collect(),
        )
    }
}

#[cfg(not(target_os = "linux"))]
fn get_native() -> Option<Vec<usize>> {
    None
}

fn set_portable(core: usize) -> Result<(), String> {
    if core_affinity::set_for_current(core_affinity::CoreId { id: core }) {
        Ok(())
    } else {
        Err("core_affinity::set_for_current refused".to_string())
    }
}
