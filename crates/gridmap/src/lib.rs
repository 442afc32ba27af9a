// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # GridMap Discovery - cluster membership for a replicated off-heap store
//!
//! UDP anti-entropy discovery for GridMap nodes: independently started
//! processes find each other's addresses and reconcile the set of active
//! replica identifiers over an unreliable, unordered, lossy broadcast
//! channel. Also home to the pluggable lock-contention policy consumed by
//! the store's segment-locking layer.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |                External scheduler (replication engine)        |
//! |        drives write_cycle / read_cycle, re-arms the writer    |
//! +---------------------------------------------------------------+
//! |                     Transport Layer                           |
//! |   DatagramWriter | DatagramReader  (length+complement frames) |
//! +---------------------------------------------------------------+
//! |                     Discovery Layer                           |
//! |   GossipCodec (state machine) | bootstrap sentinel | notifier |
//! +---------------------------------------------------------------+
//! |                     Membership State                          |
//! |   NodeRegistry: endpoint set + atomic identifier bit-set      |
//! +---------------------------------------------------------------+
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridmap::config::DiscoveryConfig;
//! use gridmap::core::{Endpoint, NodeRegistry};
//! use gridmap::discovery::{GossipCodec, WakeNotifier};
//! use gridmap::transport::{open_discovery_socket, DatagramReader, DatagramWriter};
//! use std::sync::Arc;
//!
//! fn main() -> std::io::Result<()> {
//!     let config = DiscoveryConfig::default();
//!     let socket = open_discovery_socket(&config)?;
//!
//!     let wake = WakeNotifier::shared();
//!     let registry = Arc::new(NodeRegistry::new(config.identifier_capacity));
//!     let codec = Arc::new(GossipCodec::new(registry, wake.clone()));
//!
//!     codec.add_endpoint(Endpoint::new("10.0.0.1", 7001));
//!     codec.add_identifier(1);
//!     codec.request_bootstrap();
//!
//!     let mut writer = DatagramWriter::new(Arc::clone(&codec), config.max_entry_size);
//!     let mut reader = DatagramReader::new(Arc::clone(&codec), config.max_entry_size);
//!
//!     loop {
//!         if wake.wait_timeout(std::time::Duration::from_millis(500)) {
//!             writer.arm();
//!         }
//!         writer.write_cycle(&socket, config.send_socket_addr())?;
//!         while reader.read_cycle(&socket)? > 0 {}
//!     }
//! }
//! ```
//!
//! ## Design
//!
//! No sequence numbers, no acknowledgments, no retries: every registry
//! operation is idempotent and monotonic, so periodic re-broadcast alone
//! converges all nodes. Frames carry a complemented-length header and are
//! dropped whole on any integrity failure - UDP has no resync point.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`core::NodeRegistry`] | Endpoint set + atomic identifier bit-set |
//! | [`discovery::GossipCodec`] | Encodes/merges cluster state, bootstrap handshake |
//! | [`transport::DatagramReader`] | Validates and decodes one frame per cycle |
//! | [`transport::DatagramWriter`] | Frames and sends state, self-disarming |
//! | [`core::lock_policy`] | Lock-timeout / unlock-failure strategies |

/// Discovery constants and runtime configuration.
pub mod config;
/// Membership state (registry, bit-set) and lock-contention policies.
pub mod core;
/// Anti-entropy gossip codec, bootstrap handshake, change notification.
pub mod discovery;
/// Runtime statistics (power-of-two histogram).
pub mod telemetry;
/// Datagram framing reader/writer and socket construction.
pub mod transport;
/// Cursors, frame header, and the state payload contract.
pub mod wire;

pub use crate::config::DiscoveryConfig;
pub use crate::core::{AtomicBitSet, Endpoint, LockEventPolicy, LockOwner, NodeRegistry};
pub use crate::discovery::{GossipCodec, ModificationNotifier, WakeNotifier};
pub use crate::transport::{DatagramReader, DatagramWriter};
pub use crate::wire::{StatePayload, WireError, WireResult};
