//! Simulated per-item work
//!
//! A bounded busy computation, not a sleep: the cost stays on the CPU the
//! worker is pinned to, which is what the single-core vs multi-core
//! comparison measures.

use std::hint::black_box;

/// Fixed busy-loop cost applied after every queue operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkCost {
    iterations: u64,
}

impl WorkCost {
    pub const fn new(iterations: u64) -> Self {
        Self { iterations }
    }

    pub const fn none() -> Self {
        Self { iterations: 0 }
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Runs the loop. The sum goes through `black_box` so it is not folded away.
    #[inline(never)]
    pub fn run(&self) -> u64 {
        let mut x: u64 = 0;
        for i in 0..black_box(self.iterations) {
            x = x.wrapping_add(black_box(i));
        }
        black_box(x)
    }
}

impl Default for WorkCost {
    fn default() -> Self {
        Self::new(1_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_sums_iterations() {
        assert_eq!(WorkCost::new(5).run(), 10);
        assert_eq!(WorkCost::none().run(), 0);
    }
}
