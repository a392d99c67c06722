//! Per-strategy execution lock.
//!
//! ```text
//!              try_acquire
//!   ┌──────┐ ─────────────► ┌──────┐
//!   │ free │                │ held │ ── try_acquire ──► Locked
//!   └──────┘ ◄───────────── └──────┘
//!             guard dropped
//! ```
//!
//! State-changing operations run under the lock; a second operation, or
//! the same operation re-entered, is refused instead of queued.

use parking_lot::Mutex;

/// Non-blocking mutual exclusion for strategy operations.
#[derive(Debug, Default)]
pub struct ExecutionLock {
    held_by: Mutex<Option<&'static str>>,
}

impl ExecutionLock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `operation`. Returns the current holder's operation
    /// name when the lock is taken.
    pub fn try_acquire(&self, operation: &'static str) -> Result<ExecutionGuard<'_>, &'static str> {
        let mut held_by = self.held_by.lock();
        match *held_by {
            Some(holder) => Err(holder),
            None => {
                *held_by = Some(operation);
                Ok(ExecutionGuard { lock: self })
            }
        }
    }

    /// Operation currently holding the lock.
    #[must_use]
    pub fn holder(&self) -> Option<&'static str> {
        *self.held_by.lock()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holder().is_some()
    }
}

/// Releases the lock when dropped, on success and error paths alike.
#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ExecutionGuard<'a> {
    lock: &'a ExecutionLock,
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        *self.lock.held_by.lock() = None;
    }
}
