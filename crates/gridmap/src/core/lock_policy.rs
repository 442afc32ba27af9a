// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pluggable reactions to segment-lock contention.
//!
//! The store's segment-locking code (external to this crate) calls into an
//! installed [`LockEventPolicy`] when a blocking lock acquisition times out
//! or a release fails unexpectedly. Two built-ins are provided: a logging
//! policy that warns and lets the caller carry on, and a strict policy that
//! escalates the call as fatal. Both are stateless values shared via
//! `Arc<dyn LockEventPolicy>` and installed at construction time, so tests
//! can substitute a policy per instance.

use std::fmt;
use std::sync::Arc;

/// Raw owner words above this value carry a packed (process, thread) pair.
const PACKED_THRESHOLD: u64 = 1 << 32;
/// Packed layout: process id lives above bit 33.
const PACKED_PROCESS_SHIFT: u32 = 33;
/// Packed layout: thread id is the low 24 bits.
const PACKED_THREAD_MASK: u64 = 0xFF_FFFF;

/// The holder of a contended lock, decoded from the raw owner word.
///
/// Shared-memory locks spanning processes pack a process id and a thread id
/// into one word; in-process locks store a plain thread id. The packed form
/// is decoded here, once, at the boundary - raw owner words never travel
/// further into the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOwner {
    /// Owning process, when the lock crosses process boundaries.
    pub process_id: Option<u64>,
    /// Owning thread within that process.
    pub thread_id: u64,
}

impl LockOwner {
    /// Decode a raw owner word from the lock structure.
    #[must_use]
    pub fn from_raw(raw: u64) -> Self {
        if raw > PACKED_THRESHOLD {
            Self {
                process_id: Some(raw >> PACKED_PROCESS_SHIFT),
                thread_id: raw & PACKED_THREAD_MASK,
            }
        } else {
            Self {
                process_id: None,
                thread_id: raw,
            }
        }
    }

    /// Owner for an in-process lock.
    #[must_use]
    pub fn thread(thread_id: u64) -> Self {
        Self {
            process_id: None,
            thread_id,
        }
    }
}

impl fmt::Display for LockOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.process_id {
            Some(pid) => write!(f, "process {} thread {}", pid, self.thread_id),
            None => write!(f, "thread {}", self.thread_id),
        }
    }
}

/// A blocking lock acquisition exceeded its timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockTimeout {
    pub owner: LockOwner,
}

impl fmt::Display for LockTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unable to acquire lock held by {}", self.owner)
    }
}

impl std::error::Error for LockTimeout {}

/// A lock release failed unexpectedly (e.g. not held by the releaser).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockError {
    reason: String,
}

impl UnlockError {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for UnlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to unlock: {}", self.reason)
    }
}

impl std::error::Error for UnlockError {}

/// Strategy consulted on lock-contention events.
///
/// Installed once per store instance and shared by every segment, so
/// implementations must be stateless or internally synchronized.
pub trait LockEventPolicy: Send + Sync {
    /// A blocking acquisition gave up after its timeout. `Ok(())` means the
    /// caller may retry or proceed degraded; `Err` escalates as fatal for
    /// that call.
    fn on_lock_timeout(&self, owner: LockOwner) -> Result<(), LockTimeout>;

    /// A release failed. `Ok(())` swallows the failure; `Err` re-raises it.
    fn on_unlock_failure(&self, error: UnlockError) -> Result<(), UnlockError>;
}

/// Warn-and-continue policy: contention is logged, never fatal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingLockPolicy;

impl LockEventPolicy for LoggingLockPolicy {
    fn on_lock_timeout(&self, owner: LockOwner) -> Result<(), LockTimeout> {
        log::warn!("[locks] grabbing lock held by {}", owner);
        Ok(())
    }

    fn on_unlock_failure(&self, error: UnlockError) -> Result<(), UnlockError> {
        log::warn!("[locks] {}", error);
        Ok(())
    }
}

/// Escalating policy: contention events abort the failing call.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictLockPolicy;

impl LockEventPolicy for StrictLockPolicy {
    fn on_lock_timeout(&self, owner: LockOwner) -> Result<(), LockTimeout> {
        Err(LockTimeout { owner })
    }

    fn on_unlock_failure(&self, error: UnlockError) -> Result<(), UnlockError> {
        Err(error)
    }
}

/// Shared warn-and-continue policy value.
#[must_use]
pub fn logging() -> Arc<dyn LockEventPolicy> {
    Arc::new(LoggingLockPolicy)
}

/// Shared escalating policy value.
#[must_use]
pub fn strict() -> Arc<dyn LockEventPolicy> {
    Arc::new(StrictLockPolicy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_thread_owner() {
        let owner = LockOwner::from_raw(5);
        assert_eq!(owner.process_id, None);
        assert_eq!(owner.thread_id, 5);
        assert_eq!(owner.to_string(), "thread 5");
    }

    #[test]
    fn test_packed_owner_decoding() {
        let raw = (42u64 << 33) | 7;
        let owner = LockOwner::from_raw(raw);
        assert_eq!(owner.process_id, Some(42));
        assert_eq!(owner.thread_id, 7);
        assert_eq!(owner.to_string(), "process 42 thread 7");
    }

    #[test]
    fn test_packed_thread_id_masked_to_24_bits() {
        let raw = (1u64 << 33) | 0xABCD_1234;
        let owner = LockOwner::from_raw(raw);
        assert_eq!(owner.thread_id, 0xCD_1234);
    }

    #[test]
    fn test_logging_policy_returns_ok() {
        let policy = logging();
        assert!(policy.on_lock_timeout(LockOwner::from_raw(5)).is_ok());
        assert!(policy
            .on_unlock_failure(UnlockError::new("lock not held by releasing thread"))
            .is_ok());
    }

    #[test]
    fn test_strict_policy_escalates() {
        let policy = strict();
        let err = policy
            .on_lock_timeout(LockOwner::from_raw(5))
            .expect_err("strict policy must escalate timeouts");
        assert_eq!(err.owner.thread_id, 5);
        assert_eq!(err.to_string(), "unable to acquire lock held by thread 5");

        let unlock = UnlockError::new("lock not held by releasing thread");
        let err = policy
            .on_unlock_failure(unlock.clone())
            .expect_err("strict policy must re-raise unlock failures");
        assert_eq!(err, unlock);
    }
}
