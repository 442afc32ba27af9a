// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Two in-process nodes discovering each other over loopback UDP.
//!
//! Plays the role of the external scheduler: drives write/read cycles,
//! re-arms writers when the codec raises a change, and stops once both
//! views converge.
//!
//! ```sh
//! cargo run --example node_discovery
//! ```

use gridmap::config::DiscoveryConfig;
use gridmap::core::{Endpoint, NodeRegistry};
use gridmap::discovery::{GossipCodec, WakeNotifier};
use gridmap::transport::{DatagramReader, DatagramWriter};
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

struct Node {
    name: &'static str,
    socket: UdpSocket,
    addr: SocketAddr,
    wake: Arc<WakeNotifier>,
    codec: Arc<GossipCodec>,
    reader: DatagramReader<GossipCodec>,
    writer: DatagramWriter<GossipCodec>,
}

impl Node {
    fn new(name: &'static str, config: &DiscoveryConfig) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0")?;
        socket.set_nonblocking(true)?;
        let addr = socket.local_addr()?;

        let wake = WakeNotifier::shared();
        let registry = Arc::new(NodeRegistry::new(config.identifier_capacity));
        let codec = Arc::new(GossipCodec::new(registry, wake.clone()));
        let reader = DatagramReader::new(Arc::clone(&codec), config.max_entry_size);
        let writer = DatagramWriter::new(Arc::clone(&codec), config.max_entry_size);

        Ok(Self {
            name,
            socket,
            addr,
            wake,
            codec,
            reader,
            writer,
        })
    }

    fn cycle(&mut self, peer: SocketAddr) -> std::io::Result<()> {
        if self.wake.take() {
            self.writer.arm();
        }
        self.writer.write_cycle(&self.socket, peer)?;
        while self.reader.read_cycle(&self.socket)? > 0 {}
        Ok(())
    }

    fn print_view(&self) {
        let registry = self.codec.registry();
        let mut endpoints = registry.endpoints();
        endpoints.sort_by(|a, b| (a.host(), a.port()).cmp(&(b.host(), b.port())));
        println!("[{}] endpoints:", self.name);
        for endpoint in endpoints {
            println!("[{}]   {}", self.name, endpoint);
        }
        let mut identifiers = Vec::new();
        let mut next = registry.bits().next_set_bit(0);
        while let Some(bit) = next {
            identifiers.push(bit);
            next = registry.bits().next_set_bit(bit + 1);
        }
        println!("[{}] identifiers: {:?}", self.name, identifiers);
    }
}

fn main() -> std::io::Result<()> {
    let config = DiscoveryConfig::default();

    let mut alpha = Node::new("alpha", &config)?;
    let mut beta = Node::new("beta", &config)?;

    alpha.codec.add_endpoint(Endpoint::new("10.0.0.1", 7001));
    alpha.codec.add_identifier(1);

    beta.codec.add_endpoint(Endpoint::new("10.0.0.2", 7002));
    beta.codec.add_identifier(2);

    // Beta starts later and asks the grid for a full resync.
    beta.codec.request_bootstrap();

    let beta_addr = beta.addr;
    let alpha_addr = alpha.addr;
    for _ in 0..50 {
        alpha.cycle(beta_addr)?;
        beta.cycle(alpha_addr)?;

        let converged = alpha.codec.registry().endpoint_count() == 2
            && beta.codec.registry().endpoint_count() == 2
            && alpha.codec.registry().bits().get(2)
            && beta.codec.registry().bits().get(1);
        if converged {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    alpha.print_view();
    beta.print_view();
    println!(
        "accepted frames: alpha={} beta={}",
        alpha.reader.stats().count(),
        beta.reader.stats().count()
    );
    Ok(())
}
