//! Counting semaphores for slot accounting
//!
//! `SemaphorePair` holds the two slot counters of a bounded queue (empty and
//! full) plus the permits currently held by workers. All three live under one
//! parking_lot mutex, so every wait/signal moves a permit in a single critical
//! section and `empty + full + held == capacity` holds in every snapshot.
//! Each counter has its own condvar; waiters are not woken in FIFO order.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
struct SlotState {
    empty: usize,
    full: usize,
    held: usize,
}

/// Point-in-time view of the slot counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotSnapshot {
    pub empty: usize,
    pub full: usize,
    pub held: usize,
}

impl SlotSnapshot {
    pub fn total(&self) -> usize {
        self.empty + self.full + self.held
    }
}

/// `empty_slots` starts at capacity, `full_slots` at zero
pub struct SemaphorePair {
    state: Mutex<SlotState>,
    empty_available: Condvar,
    full_available: Condvar,
    capacity: usize,
}

impl SemaphorePair {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(SlotState {
                empty: capacity,
                full: 0,
                held: 0,
            }),
            empty_available: Condvar::new(),
            full_available: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Producer side: blocks while the queue is full (backpressure)
    pub fn wait_empty(&self) {
        let mut state = self.state.lock();
        while state.empty == 0 {
            self.empty_available.wait(&mut state);
        }
        state.empty -= 1;
        state.held += 1;
    }

    pub fn signal_empty(&self) {
        let mut state = self.state.lock();
        state.held = state.held.saturating_sub(1);
        state.empty += 1;
        drop(state);
        self.empty_available.notify_one();
    }

    /// Consumer side: blocks until an item has been announced
    pub fn wait_full(&self) {
        let mut state = self.state.lock();
        while state.full == 0 {
            self.full_available.wait(&mut state);
        }
        state.full -= 1;
        state.held += 1;
    }

    pub fn signal_full(&self) {
        let mut state = self.state.lock();
        state.held = state.held.saturating_sub(1);
        state.full += 1;
        drop(state);
        self.full_available.notify_one();
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        let state = self.state.lock();
        SlotSnapshot {
            empty: state.empty,
            full: state.full,
            held: state.held,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_pair_starts_with_all_empty() {
        let pair = SemaphorePair::new(30);
        assert_eq!(pair.capacity(), 30);
        assert_eq!(
            pair.snapshot(),
            SlotSnapshot {
                empty: 30,
                full: 0,
                held: 0
            }
        );
    }

    #[test]
    fn test_wait_full_blocks_until_signal() {
        let pair = Arc::new(SemaphorePair::new(4));
        let waiter = {
            let pair = Arc::clone(&pair);
            thread::spawn(move || {
                pair.wait_full();
                true
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(!waiter.is_finished());

        pair.wait_empty();
        pair.signal_full();
        assert!(waiter.join().unwrap());
        assert_eq!(pair.snapshot().held, 1);
    }

    #[test]
    fn test_pair_conserves_permits_through_handoff() {
        let pair = SemaphorePair::new(4);

        pair.wait_empty();
        assert_eq!(pair.snapshot().held, 1);
        assert_eq!(pair.snapshot().total(), 4);

        pair.signal_full();
        assert_eq!(pair.snapshot().total(), 4);

        pair.wait_full();
        assert_eq!(pair.snapshot().total(), 4);

        pair.signal_empty();
        assert_eq!(
            pair.snapshot(),
            SlotSnapshot {
                empty: 4,
                full: 0,
                held: 0
            }
        );
    }

    #[test]
    fn test_snapshot_total_holds_while_running() {
        const CAPACITY: usize = 30;
        let pair = Arc::new(SemaphorePair::new(CAPACITY));
        let done = Arc::new(AtomicBool::new(false));

        let monitor = {
            let pair = Arc::clone(&pair);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut samples = 0u64;
                let mut broken = 0u64;
                while !done.load(Ordering::Acquire) {
                    if pair.snapshot().total() != CAPACITY {
                        broken += 1;
                    }
                    samples += 1;
                }
                (samples, broken)
            })
        };

        let producer = {
            let pair = Arc::clone(&pair);
            thread::spawn(move || {
                for _ in 0..20_000 {
                    pair.wait_empty();
                    pair.signal_full();
                }
            })
        };
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let pair = Arc::clone(&pair);
                thread::spawn(move || {
                    for _ in 0..5_000 {
                        pair.wait_full();
                        pair.signal_empty();
                    }
                })
            })
            .collect();

        producer.join().unwrap();
        for c in consumers {
            c.join().unwrap();
        }
        done.store(true, Ordering::Release);

        let (samples, broken) = monitor.join().unwrap();
        assert!(samples > 0);
        assert_eq!(broken, 0);
        assert_eq!(pair.snapshot().empty, CAPACITY);
    }
}
