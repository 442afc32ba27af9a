// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Randomized codec properties: encode/decode round trips and merge
//! idempotence over arbitrary registries.

use gridmap::core::{Endpoint, NodeRegistry};
use gridmap::discovery::{GossipCodec, ModificationNotifier};
use gridmap::wire::{Cursor, CursorMut, StatePayload};
use std::collections::BTreeSet;
use std::sync::Arc;

struct NullNotifier;

impl ModificationNotifier for NullNotifier {
    fn on_change(&self) {}
}

fn fresh_codec(capacity: usize) -> GossipCodec {
    GossipCodec::new(Arc::new(NodeRegistry::new(capacity)), Arc::new(NullNotifier))
}

fn encode_to_vec(codec: &GossipCodec) -> Vec<u8> {
    let mut buf = vec![0u8; 8192];
    let len = {
        let mut cursor = CursorMut::new(&mut buf);
        codec.encode(&mut cursor).expect("encode fits buffer");
        cursor.offset()
    };
    buf.truncate(len);
    buf
}

fn endpoint_set(registry: &NodeRegistry) -> BTreeSet<(String, u16)> {
    registry
        .endpoints()
        .into_iter()
        .map(|e| (e.host().to_owned(), e.port()))
        .collect()
}

#[test]
fn test_random_round_trips() {
    fastrand::seed(0x5EED);

    for _ in 0..100 {
        let capacity = 8 * fastrand::usize(1..=32);
        let sender = fresh_codec(capacity);

        for _ in 0..fastrand::usize(0..20) {
            let host = format!("host-{}.grid", fastrand::u16(..));
            sender.add_endpoint(Endpoint::new(host, fastrand::u16(..)));
        }
        for _ in 0..fastrand::usize(0..capacity) {
            sender.add_identifier(fastrand::usize(0..capacity));
        }

        let bytes = encode_to_vec(&sender);
        let receiver = fresh_codec(capacity);
        receiver
            .decode(&mut Cursor::new(&bytes))
            .expect("own encoding must decode");

        assert_eq!(
            endpoint_set(sender.registry()),
            endpoint_set(receiver.registry())
        );
        assert_eq!(
            sender.registry().bits().snapshot_bytes(),
            receiver.registry().bits().snapshot_bytes()
        );
    }
}

#[test]
fn test_merge_is_idempotent_for_random_patterns() {
    fastrand::seed(0xB175);

    for _ in 0..100 {
        let registry = NodeRegistry::new(256);
        for _ in 0..fastrand::usize(0..64) {
            registry.bits().set(fastrand::usize(0..256));
        }

        let source: Vec<u8> = (0..fastrand::usize(0..=32)).map(|_| fastrand::u8(..)).collect();

        registry.merge_bits(&source);
        let once = registry.bits().snapshot_bytes();
        registry.merge_bits(&source);
        let twice = registry.bits().snapshot_bytes();

        assert_eq!(once, twice);
    }
}

#[test]
fn test_merge_is_monotonic() {
    fastrand::seed(0xCAFE);

    let registry = NodeRegistry::new(128);
    let mut previous = 0;
    for _ in 0..50 {
        let source: Vec<u8> = (0..16).map(|_| fastrand::u8(..)).collect();
        registry.merge_bits(&source);
        let cardinality = registry.bits().cardinality();
        assert!(cardinality >= previous, "merge must never clear bits");
        previous = cardinality;
    }
}
