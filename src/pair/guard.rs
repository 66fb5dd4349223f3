//! Non-reentrant critical section.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::AmmError;

/// Holds a pair's lock flag for as long as it lives.
///
/// Dropping the guard releases the flag, so every exit path (success,
/// `?` propagation or unwinding) unlocks the pair.
#[derive(Debug)]
pub(crate) struct ReentrancyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ReentrancyGuard<'a> {
    /// Takes the lock.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Locked`] if the flag is already held.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Result<Self, AmmError> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| AmmError::Locked)?;
        Ok(Self { flag })
    }
}

impl Drop for ReentrancyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
