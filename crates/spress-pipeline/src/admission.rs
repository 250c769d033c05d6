//! Per-caller admission control.
//!
//! Each caller may have at most one conversion in flight. A permit is
//! held for the duration of the conversion and released on drop, so the
//! slot frees even when the conversion path errors out early.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{PipelineError, PipelineResult};

/// The admission set stays usable across a poisoned lock; the set of
/// caller ids cannot be left in a torn state by a panic.
fn lock_set(inner: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

/// Tracks which callers currently have a conversion in flight.
#[derive(Debug, Clone, Default)]
pub struct AdmissionControl {
    inner: Arc<Mutex<HashSet<String>>>,
}

impl AdmissionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to admit a caller. Returns `None` when the caller already
    /// holds a slot.
    pub fn try_acquire(&self, caller: &str) -> Option<AdmissionPermit> {
        let mut held = lock_set(&self.inner);
        if held.insert(caller.to_string()) {
            Some(AdmissionPermit {
                caller: caller.to_string(),
                inner: Arc::clone(&self.inner),
            })
        } else {
            None
        }
    }

    /// Admit a caller or fail with [`PipelineError::Busy`].
    pub fn acquire(&self, caller: &str) -> PipelineResult<AdmissionPermit> {
        self.try_acquire(caller)
            .ok_or_else(|| PipelineError::Busy(caller.to_string()))
    }
}

/// RAII handle for an admitted caller. Dropping releases the slot.
#[derive(Debug)]
pub struct AdmissionPermit {
    caller: String,
    inner: Arc<Mutex<HashSet<String>>>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        lock_set(&self.inner).remove(&self.caller);
    }
}
