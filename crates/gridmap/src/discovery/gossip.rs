// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Cluster-state gossip codec and its bootstrap state machine.
//!
//! # State payload format
//!
//! ```text
//! u16 endpoint count
//! per endpoint: u16 hostname length, UTF-8 hostname, i32 port
//! u16 bit-set byte length
//! raw bit-set bytes
//! ```
//!
//! # Bootstrap payload
//!
//! ```text
//! u16 length (9), UTF-8 "BOOTSTRAP"
//! ```
//!
//! A frame whose payload equals the bootstrap sentinel byte-for-byte is a
//! resync request, never merged as state.

use crate::core::{Endpoint, NodeRegistry};
use crate::wire::{Cursor, CursorMut, StatePayload, WireError, WireResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exact bytes of the bootstrap sentinel payload: u16 length prefix followed
/// by the constant text. Matched byte-for-byte on decode.
pub const BOOTSTRAP_PAYLOAD: &[u8] = &[
    0x00, 0x09, b'B', b'O', b'O', b'T', b'S', b'T', b'R', b'A', b'P',
];

/// Callback raised whenever local state needs broadcasting.
///
/// The external scheduler implements this to re-arm the writer and schedule
/// another send cycle. Called from whatever thread mutated the state, so
/// implementations must be cheap and non-blocking.
pub trait ModificationNotifier: Send + Sync {
    fn on_change(&self);
}

/// [`StatePayload`] implementation gossiping a [`NodeRegistry`].
///
/// Owns the two lock-free protocol flags:
///
/// - bootstrap-pending: edge-triggered; set by [`request_bootstrap`], cleared
///   by the next encode, which then emits only the sentinel
/// - flushed: cleared by every local mutation, set at the start of encode; if
///   it is clear again when encode finishes, a mutation raced the flush and
///   the notifier fires once more so no change is silently absorbed
///
/// [`request_bootstrap`]: GossipCodec::request_bootstrap
pub struct GossipCodec {
    registry: Arc<NodeRegistry>,
    notifier: Arc<dyn ModificationNotifier>,
    bootstrap_pending: AtomicBool,
    flushed: AtomicBool,
}

impl GossipCodec {
    pub fn new(registry: Arc<NodeRegistry>, notifier: Arc<dyn ModificationNotifier>) -> Self {
        Self {
            registry,
            notifier,
            bootstrap_pending: AtomicBool::new(false),
            flushed: AtomicBool::new(true),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Ask every peer for a full-state resend.
    ///
    /// Exactly the next encode emits the bootstrap sentinel instead of state;
    /// the one after that is back to normal full-state emission.
    pub fn request_bootstrap(&self) {
        self.bootstrap_pending.store(true, Ordering::Release);
        self.mark_changed();
    }

    /// Advertise a local endpoint and schedule a broadcast if it was new.
    pub fn add_endpoint(&self, endpoint: Endpoint) -> bool {
        let added = self.registry.add_endpoint(endpoint);
        if added {
            self.mark_changed();
        }
        added
    }

    /// Mark an identifier active and schedule a broadcast if it was new.
    pub fn add_identifier(&self, identifier: usize) -> bool {
        let added = self.registry.bits().set(identifier);
        if added {
            self.mark_changed();
        }
        added
    }

    fn mark_changed(&self) {
        self.flushed.store(false, Ordering::Release);
        self.notifier.on_change();
    }
}

impl StatePayload for GossipCodec {
    fn encode(&self, dst: &mut CursorMut<'_>) -> WireResult<()> {
        // Claim everything mutated so far as flushed; a mutation landing
        // after this point re-clears the flag and is re-raised below.
        self.flushed.store(true, Ordering::Release);

        if self.bootstrap_pending.swap(false, Ordering::AcqRel) {
            dst.write_bytes(BOOTSTRAP_PAYLOAD)?;
            // Full state was skipped this cycle; leave it pending so the
            // scheduler arranges the follow-up send.
            self.mark_changed();
            return Ok(());
        }

        let endpoints = self.registry.endpoints();
        let count = u16::try_from(endpoints.len()).map_err(|_| WireError::InvalidData {
            reason: "endpoint count exceeds u16".into(),
        })?;
        dst.write_u16_be(count)?;
        for endpoint in &endpoints {
            dst.write_str(endpoint.host())?;
            dst.write_i32_be(i32::from(endpoint.port()))?;
        }

        let bits = self.registry.bits().snapshot_bytes();
        let bit_len = u16::try_from(bits.len()).map_err(|_| WireError::InvalidData {
            reason: "bit-set length exceeds u16".into(),
        })?;
        dst.write_u16_be(bit_len)?;
        dst.write_bytes(&bits)?;

        if !self.flushed.load(Ordering::Acquire) {
            // A mutation raced this flush; make sure another send happens.
            self.notifier.on_change();
        }
        Ok(())
    }

    fn decode(&self, src: &mut Cursor<'_>) -> WireResult<()> {
        if src.peek_remaining() == BOOTSTRAP_PAYLOAD {
            log::debug!("[discovery] bootstrap request received, scheduling full-state send");
            self.mark_changed();
            return Ok(());
        }

        let count = src.read_u16_be()?;
        for _ in 0..count {
            let host = src.read_str()?;
            let port = src.read_i32_be()?;
            let port = u16::try_from(port).map_err(|_| WireError::InvalidData {
                reason: "port outside u16 range".into(),
            })?;
            let endpoint = Endpoint::new(host, port);
            if self.registry.add_endpoint(endpoint.clone()) {
                log::debug!("[discovery] learned endpoint {}", endpoint);
            }
        }

        let bit_len = src.read_u16_be()? as usize;
        if bit_len == 0 {
            // Peer advertised no identifiers; an empty contribution is fine.
            return Ok(());
        }
        let bits = src.read_bytes(bit_len)?;
        let merged = self.registry.merge_bits(bits);
        if merged > 0 {
            log::debug!("[discovery] merged {} new identifier(s)", merged);
        }
        Ok(())
    }
}
