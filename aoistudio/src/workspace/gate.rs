//! Busy gate for imports.
//!
//! Imports and captures both count as in-flight work. A new import is only
//! admitted when nothing is in flight; captures are always admitted.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counter of in-flight imports and captures.
#[derive(Debug, Default)]
pub struct BusyGate {
    in_flight: AtomicUsize,
}

/// Marks one unit of in-flight work until dropped.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    gate: &'a BusyGate,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl BusyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit an import, or `None` while anything is in flight.
    pub fn try_begin_import(&self) -> Option<BusyGuard<'_>> {
        self.in_flight
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { gate: self })
    }

    /// Admit a capture unconditionally.
    pub fn begin_capture(&self) -> BusyGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        BusyGuard { gate: self }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }
}
