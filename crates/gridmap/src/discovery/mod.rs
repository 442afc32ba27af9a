// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Anti-entropy node discovery.
//!
//! Nodes periodically broadcast their full membership view (endpoint set plus
//! identifier bit-set) and merge every view they receive. There are no
//! sequence numbers and no acknowledgments: every registry operation is
//! idempotent and monotonic, so lost, duplicated and reordered datagrams all
//! converge to the same state as long as the external scheduler keeps the
//! read/write cycles running.
//!
//! A node that has just started knows nothing; it sends the bootstrap
//! sentinel ("send me full state") and every peer that hears it re-announces
//! its view on the next cycle.

mod gossip;
mod wake;

pub use gossip::{GossipCodec, ModificationNotifier, BOOTSTRAP_PAYLOAD};
pub use wake::WakeNotifier;
