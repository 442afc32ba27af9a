// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node registry: the local view of grid membership.
//!
//! One registry per process, created at startup and alive for the process
//! lifetime. It owns the endpoint set and the identifier bit-set; both are
//! mutated only through registry methods so every mutation stays idempotent
//! and monotonic - the properties the anti-entropy exchange depends on.

use crate::core::bitset::{iter_set_bits, AtomicBitSet};
use dashmap::DashSet;
use std::fmt;

/// One advertised node address: hostname (or dotted IP) plus port.
///
/// Identity is by value; the registry collapses duplicates. The hostname is
/// carried verbatim - resolution is the TCP replicator's problem, not ours.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Local membership state: endpoint set plus identifier bit-set.
///
/// Concurrent by construction: the encode path snapshots while application
/// threads insert, so the endpoint set is a sharded concurrent set and the
/// bit-set is atomic. No ordering is promised between a concurrent insert
/// and an in-flight snapshot beyond "included in some future encode".
#[derive(Debug)]
pub struct NodeRegistry {
    endpoints: DashSet<Endpoint>,
    bits: AtomicBitSet,
}

impl NodeRegistry {
    /// Create an empty registry with the given identifier space size.
    #[must_use]
    pub fn new(identifier_capacity: usize) -> Self {
        Self {
            endpoints: DashSet::new(),
            bits: AtomicBitSet::new(identifier_capacity),
        }
    }

    /// Idempotent set-insert. Returns `true` when the endpoint was new.
    pub fn add_endpoint(&self, endpoint: Endpoint) -> bool {
        self.endpoints.insert(endpoint)
    }

    /// Snapshot of the current endpoint set (unordered).
    #[must_use]
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.iter().map(|e| e.key().clone()).collect()
    }

    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn contains_endpoint(&self, endpoint: &Endpoint) -> bool {
        self.endpoints.contains(endpoint)
    }

    /// The identifier bit-set (atomic set/get/iterate).
    #[must_use]
    pub fn bits(&self) -> &AtomicBitSet {
        &self.bits
    }

    /// OR a peer's serialized bit-set into the local one.
    ///
    /// Scans ascending from bit 0; indices beyond the local capacity are
    /// per-bit no-ops and never abort the scan. Pure OR - never clears -
    /// so merging the same source any number of times equals merging once.
    ///
    /// Returns the number of bits this merge newly set.
    pub fn merge_bits(&self, source: &[u8]) -> usize {
        iter_set_bits(source)
            .filter(|&index| self.bits.set(index))
            .count()
    }
}
