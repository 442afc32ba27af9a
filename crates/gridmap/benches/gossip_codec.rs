// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Encode/decode throughput for the gossip codec.

use criterion::{criterion_group, criterion_main, Criterion};
use gridmap::core::{Endpoint, NodeRegistry};
use gridmap::discovery::{GossipCodec, ModificationNotifier};
use gridmap::wire::{Cursor, CursorMut, StatePayload};
use std::sync::Arc;

struct NullNotifier;

impl ModificationNotifier for NullNotifier {
    fn on_change(&self) {}
}

fn populated_codec() -> GossipCodec {
    let codec = GossipCodec::new(Arc::new(NodeRegistry::new(128)), Arc::new(NullNotifier));
    for i in 0..16u16 {
        codec.add_endpoint(Endpoint::new(format!("10.0.0.{}", i), 7000 + i));
        codec.add_identifier(usize::from(i) * 8);
    }
    codec
}

fn bench_encode(c: &mut Criterion) {
    let codec = populated_codec();
    let mut buf = vec![0u8; 2048];

    c.bench_function("encode_16_endpoints", |b| {
        b.iter(|| {
            let mut cursor = CursorMut::new(&mut buf);
            codec.encode(&mut cursor).expect("encode fits buffer");
            cursor.offset()
        });
    });
}

fn bench_decode(c: &mut Criterion) {
    let sender = populated_codec();
    let mut buf = vec![0u8; 2048];
    let len = {
        let mut cursor = CursorMut::new(&mut buf);
        sender.encode(&mut cursor).expect("encode fits buffer");
        cursor.offset()
    };
    let frame = &buf[..len];

    let receiver = GossipCodec::new(Arc::new(NodeRegistry::new(128)), Arc::new(NullNotifier));

    c.bench_function("decode_16_endpoints", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(frame);
            receiver.decode(&mut cursor).expect("valid frame");
        });
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
