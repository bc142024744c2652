//! An element type that counts its constructions and drops.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared counters for a family of [`Probe`] values.
///
/// Tests hold the `Arc` and read the totals after the code under test
/// finishes (or unwinds). `fail_at` arms an injected panic: the clone that
/// would bring the constructed count to that value panics instead, for
/// exercising partial-construction cleanup.
#[derive(Debug)]
pub struct ProbeStats {
    constructed: AtomicUsize,
    dropped: AtomicUsize,
    fail_at: AtomicUsize,
}

impl ProbeStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            constructed: AtomicUsize::new(0),
            dropped: AtomicUsize::new(0),
            fail_at: AtomicUsize::new(usize::MAX),
        })
    }

    /// Arrange for the clone producing the `n`-th construction to panic.
    pub fn fail_at(&self, n: usize) {
        self.fail_at.store(n, Ordering::SeqCst);
    }

    /// Total constructions observed (direct and via clone).
    pub fn constructed(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    /// Total drops observed.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    /// Constructions minus drops. Zero after balanced cleanup.
    pub fn live(&self) -> usize {
        self.constructed() - self.dropped()
    }

    fn record_construction(&self) {
        let count = self.constructed.fetch_add(1, Ordering::SeqCst) + 1;
        if count == self.fail_at.load(Ordering::SeqCst) {
            // Undo the count: the panicking clone never produced a value,
            // so nothing will be dropped for it.
            self.constructed.fetch_sub(1, Ordering::SeqCst);
            panic!("probe clone failure injected at construction {count}");
        }
    }
}

/// A counted element for lifecycle tests.
///
/// Carries a payload for equality checks and an optional handle to
/// [`ProbeStats`]. The `Default` value is untracked so default-padding
/// paths stay usable without a stats handle.
#[derive(Debug)]
pub struct Probe {
    pub value: u32,
    stats: Option<Arc<ProbeStats>>,
}

impl Probe {
    pub fn new(value: u32, stats: &Arc<ProbeStats>) -> Self {
        stats.record_construction();
        Self {
            value,
            stats: Some(Arc::clone(stats)),
        }
    }

    /// An untracked probe, identical to `Probe::default()` with a payload.
    pub fn untracked(value: u32) -> Self {
        Self { value, stats: None }
    }
}

impl Clone for Probe {
    fn clone(&self) -> Self {
        if let Some(stats) = &self.stats {
            stats.record_construction();
        }
        Self {
            value: self.value,
            stats: self.stats.clone(),
        }
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        if let Some(stats) = &self.stats {
            stats.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self {
            value: 0,
            stats: None,
        }
    }
}

impl PartialEq for Probe {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Probe {}
