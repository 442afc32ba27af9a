// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wake notification bridging the gossip codec to a send-loop thread.
//!
//! The codec raises [`ModificationNotifier::on_change`] from whatever thread
//! mutated the registry; the send loop wants to sleep until that happens.
//! Two tiers: an atomic flag for the lock-free fast path, a condvar for
//! blocking waits when the loop is idle.

use super::ModificationNotifier;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Ready-made [`ModificationNotifier`] for external schedulers.
///
/// ```ignore
/// let wake = WakeNotifier::shared();
/// let codec = GossipCodec::new(registry, wake.clone());
///
/// // Send loop:
/// loop {
///     if wake.wait_timeout(Duration::from_millis(500)) {
///         writer.arm();
///     }
///     writer.write_cycle(&socket, dest)?;
///     reader.read_cycle(&socket)?;
/// }
/// ```
#[derive(Debug, Default)]
pub struct WakeNotifier {
    /// Lock-free fast path flag.
    pending: AtomicBool,
    /// Mutex for the condvar; only touched when a waiter may be sleeping.
    sleeping: Mutex<bool>,
    condvar: Condvar,
}

impl WakeNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared notifier ready to hand to [`crate::discovery::GossipCodec`].
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Consume the pending flag (lock-free).
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Peek at the pending flag without consuming it.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Block until a change is raised or `timeout` elapses.
    ///
    /// Returns `true` when a pending change was consumed.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if self.take() {
            return true;
        }

        let mut sleeping = self.sleeping.lock();
        // Re-check under the lock: a notify may have landed in between.
        if self.take() {
            return true;
        }

        *sleeping = true;
        let result = self.condvar.wait_for(&mut sleeping, timeout);
        *sleeping = false;

        if self.take() {
            !result.timed_out()
        } else {
            false
        }
    }
}

impl ModificationNotifier for WakeNotifier {
    fn on_change(&self) {
        self.pending.store(true, Ordering::Release);
        // Racy read is fine: worst case is one spurious condvar signal.
        if *self.sleeping.lock() {
            self.condvar.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_take_consumes_flag() {
        let wake = WakeNotifier::new();
        assert!(!wake.is_pending());
        wake.on_change();
        assert!(wake.is_pending());
        assert!(wake.take());
        assert!(!wake.take());
    }

    #[test]
    fn test_wait_returns_immediately_when_pending() {
        let wake = WakeNotifier::new();
        wake.on_change();
        let start = std::time::Instant::now();
        assert!(wake.wait_timeout(Duration::from_millis(100)));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_wait_times_out_without_change() {
        let wake = WakeNotifier::new();
        assert!(!wake.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_change_wakes_sleeping_waiter() {
        let wake = WakeNotifier::shared();
        let notifier = Arc::clone(&wake);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            notifier.on_change();
        });

        assert!(wake.wait_timeout(Duration::from_millis(500)));
        handle.join().expect("notifier thread panicked");
    }
}
