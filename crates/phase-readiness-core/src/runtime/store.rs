// crates/phase-readiness-core/src/runtime/store.rs
// ============================================================================
// Module: Phase Readiness Snapshot Store
// Description: Lock-guarded latest snapshot plus bounded history.
// Purpose: Decouple the single producer from any number of readers.
// Dependencies: crate::core, serde, thiserror
// ============================================================================

//! ## Overview
//! [`SnapshotStore`] is the only cross-thread boundary in the system. Every
//! operation takes one exclusive lock for its whole critical section, so
//! readers never observe a half-applied update. Critical sections only copy
//! values; they never perform I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
#[cfg(any(test, feature = "test-support"))]
use std::panic;
#[cfg(any(test, feature = "test-support"))]
use std::panic::AssertUnwindSafe;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::Gate;
use crate::core::ReasonFlag;
use crate::core::ReasonFlags;
use crate::core::Sample;
use crate::core::Verdict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default bound on retained history entries.
pub const DEFAULT_MAX_HISTORY: usize = 100;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Snapshot store failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A previous holder of the lock panicked.
    #[error("snapshot store mutex poisoned")]
    Poisoned,
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Verdict plus the sample fields that produced it.
///
/// # Invariants
/// - Optional readings are `None` when absent or non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sample timestamp in seconds.
    pub t_s: f64,
    /// Primary temperature; `None` before the first update or when non-finite.
    pub temp_c: Option<f64>,
    /// Ambient temperature when reported.
    pub ambient_c: Option<f64>,
    /// Hysteresis index when reported.
    pub hysteresis_index: Option<f64>,
    /// Coherence index when reported.
    pub coherence_index: Option<f64>,
    /// Engine verdict for the sample.
    pub verdict: Verdict,
    /// Wall-clock capture time in unix milliseconds.
    pub captured_at_ms: u64,
}

impl Snapshot {
    /// Builds a snapshot from a sample and its verdict.
    #[must_use]
    pub fn capture(sample: &Sample, verdict: Verdict, captured_at_ms: u64) -> Self {
        Self {
            t_s: sample.t_s,
            temp_c: Some(sample.temp_c).filter(|value| value.is_finite()),
            ambient_c: sample.ambient(),
            hysteresis_index: sample.hysteresis(),
            coherence_index: sample.coherence(),
            verdict,
            captured_at_ms,
        }
    }

    /// Returns the snapshot served before any sample has been published.
    #[must_use]
    pub const fn initial(captured_at_ms: u64) -> Self {
        Self {
            t_s: 0.0,
            temp_c: None,
            ambient_c: None,
            hysteresis_index: None,
            coherence_index: None,
            verdict: Verdict {
                readiness: 0.0,
                gate: Gate::Block,
                flags: ReasonFlags::NONE.with(ReasonFlag::FailsafeDefault),
                dtdt_c_per_s: 0.0,
                trend_c_per_s: 0.0,
                stability_score: 0.0,
            },
            captured_at_ms,
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// State guarded by the store lock.
#[derive(Debug)]
struct StoreState {
    /// Latest snapshot.
    current: Snapshot,
    /// Chronological history, oldest first.
    history: VecDeque<Snapshot>,
    /// Maximum retained history entries.
    max_history: usize,
}

impl StoreState {
    /// Drops the oldest entries until the history fits its bound.
    fn evict_excess(&mut self) {
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }
}

/// Thread-safe holder of the latest snapshot and bounded history.
///
/// # Invariants
/// - History length never exceeds `max_history` after any operation.
/// - History insertion order is chronological.
#[derive(Debug)]
pub struct SnapshotStore {
    /// Store state protected by a mutex.
    state: Mutex<StoreState>,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl SnapshotStore {
    /// Creates an empty store with the given history bound.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            state: Mutex::new(StoreState {
                current: Snapshot::initial(now_ms()),
                history: VecDeque::with_capacity(max_history.min(DEFAULT_MAX_HISTORY)),
                max_history,
            }),
        }
    }

    /// Creates a store whose lock is already poisoned.
    ///
    /// Every operation on the returned store fails with
    /// [`StoreError::Poisoned`].
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn poisoned(max_history: usize) -> Self {
        let store = Self::new(max_history);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = store.state.lock();
            panic::resume_unwind(Box::new("poison snapshot store"));
        }));
        store
    }

    /// Publishes a verdict captured now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn update(&self, sample: &Sample, verdict: Verdict) -> Result<Snapshot, StoreError> {
        self.update_at(sample, verdict, now_ms())
    }

    /// Publishes a verdict with an explicit capture time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn update_at(
        &self,
        sample: &Sample,
        verdict: Verdict,
        captured_at_ms: u64,
    ) -> Result<Snapshot, StoreError> {
        let snapshot = Snapshot::capture(sample, verdict, captured_at_ms);
        let mut guard = self.lock()?;
        guard.current = snapshot;
        guard.history.push_back(snapshot);
        guard.evict_excess();
        drop(guard);
        Ok(snapshot)
    }

    /// Returns a copy of the latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn current(&self) -> Result<Snapshot, StoreError> {
        Ok(self.lock()?.current)
    }

    /// Returns up to `count` most recent entries, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn history(&self, count: usize) -> Result<Vec<Snapshot>, StoreError> {
        let guard = self.lock()?;
        let skip = guard.history.len().saturating_sub(count);
        Ok(guard.history.iter().skip(skip).copied().collect())
    }

    /// Resizes the history bound and evicts any excess oldest entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn set_max_history(&self, max_history: usize) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        guard.max_history = max_history;
        guard.evict_excess();
        drop(guard);
        Ok(())
    }

    /// Returns the current history bound.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn max_history(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.max_history)
    }

    /// Returns the number of retained history entries.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.history.len())
    }

    /// Returns true when no history has been recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Poisoned`] when the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.history.is_empty())
    }

    /// Acquires the store lock.
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Poisoned)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix time in milliseconds.
fn now_ms() -> u64 {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}
