// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GridMap discovery configuration - single source of truth.
//!
//! This module centralizes the discovery wire constants and the per-node
//! runtime configuration. **NEVER hardcode these elsewhere!**
//!
//! - **Level 1 (Static)**: compile-time defaults (port, identifier space,
//!   datagram sizing)
//! - **Level 2 (Dynamic)**: [`DiscoveryConfig`] built once at startup and
//!   passed to the transport/discovery components

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

// =======================================================================
// Static Defaults
// =======================================================================

/// Default UDP port for discovery broadcast traffic.
///
/// Every node in a grid binds and broadcasts on the same port; there is no
/// per-node port arithmetic because the transport is a shared broadcast
/// channel, not point-to-point.
pub const DEFAULT_DISCOVERY_PORT: u16 = 7474;

/// Default identifier space size (bits).
///
/// Node identifiers are single bytes in the replication layer, so 128
/// distinct identifiers cover the supported grid size. The identifier
/// bit-set is sized from this at startup and never resized.
pub const DEFAULT_IDENTIFIER_CAPACITY: usize = 128;

/// Default maximum serialized entry size (bytes).
///
/// Upper bound for one discovery state payload: endpoint list plus
/// identifier bit-set. One datagram carries at most one payload.
pub const DEFAULT_MAX_ENTRY_SIZE: usize = 1024;

/// Receive buffer headroom factor.
///
/// The receive buffer is sized `max_entry_size * RX_HEADROOM_FACTOR` so an
/// oversized or garbled datagram is captured whole and rejected by the
/// length check instead of being silently truncated into a plausible frame.
pub const RX_HEADROOM_FACTOR: usize = 2;

/// IPv4 limited-broadcast address used as the default send destination.
pub const BROADCAST_IP: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 255);

// =======================================================================
// Runtime Configuration
// =======================================================================

/// Per-node discovery configuration, fixed at startup.
///
/// Plain value struct: build one with [`DiscoveryConfig::default`] plus the
/// `with_*` setters and hand it to the socket helper and the reader/writer
/// constructors. Components copy what they need; the config is not consulted
/// again after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// UDP port shared by every node on the broadcast segment.
    pub port: u16,
    /// Destination address for outgoing state datagrams.
    pub send_addr: Ipv4Addr,
    /// Identifier space size in bits (bit-set capacity).
    pub identifier_capacity: usize,
    /// Maximum serialized payload size in bytes.
    pub max_entry_size: usize,
    /// Enable `SO_REUSEPORT` so several processes on one host can share the
    /// discovery port (unix only; ignored elsewhere).
    pub reuse_port: bool,
}

impl DiscoveryConfig {
    /// Destination socket address for outgoing state datagrams.
    #[must_use]
    pub fn send_socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.send_addr, self.port))
    }

    /// Receive buffer size: max entry size plus headroom.
    #[must_use]
    pub fn recv_buffer_size(&self) -> usize {
        self.max_entry_size * RX_HEADROOM_FACTOR
    }

    /// Override the discovery port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the send destination (e.g. a subnet-directed broadcast).
    #[must_use]
    pub fn with_send_addr(mut self, addr: Ipv4Addr) -> Self {
        self.send_addr = addr;
        self
    }

    /// Override the identifier space size.
    #[must_use]
    pub fn with_identifier_capacity(mut self, bits: usize) -> Self {
        self.identifier_capacity = bits;
        self
    }

    /// Override the maximum serialized payload size.
    #[must_use]
    pub fn with_max_entry_size(mut self, bytes: usize) -> Self {
        self.max_entry_size = bytes;
        self
    }

    /// Enable `SO_REUSEPORT` on the discovery socket.
    #[must_use]
    pub fn with_reuse_port(mut self, reuse: bool) -> Self {
        self.reuse_port = reuse;
        self
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_DISCOVERY_PORT,
            send_addr: BROADCAST_IP,
            identifier_capacity: DEFAULT_IDENTIFIER_CAPACITY,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            reuse_port: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.port, 7474);
        assert_eq!(config.identifier_capacity, 128);
        assert_eq!(config.max_entry_size, 1024);
        assert_eq!(config.recv_buffer_size(), 2048);
        assert!(!config.reuse_port);
    }

    #[test]
    fn test_builder_setters() {
        let config = DiscoveryConfig::default()
            .with_port(9400)
            .with_send_addr(Ipv4Addr::new(192, 168, 1, 255))
            .with_identifier_capacity(256)
            .with_max_entry_size(4096)
            .with_reuse_port(true);

        assert_eq!(config.port, 9400);
        assert_eq!(config.send_socket_addr().to_string(), "192.168.1.255:9400");
        assert_eq!(config.identifier_capacity, 256);
        assert_eq!(config.recv_buffer_size(), 8192);
        assert!(config.reuse_port);
    }
}
