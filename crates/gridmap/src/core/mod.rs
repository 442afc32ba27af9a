// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Core membership state and concurrency policy primitives.

pub mod bitset;
pub mod lock_policy;
pub mod registry;

pub use bitset::{iter_set_bits, AtomicBitSet};
pub use lock_policy::{
    LockEventPolicy, LockOwner, LockTimeout, LoggingLockPolicy, StrictLockPolicy, UnlockError,
};
pub use registry::{Endpoint, NodeRegistry};
