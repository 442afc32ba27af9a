// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Length-prefixed framing over a datagram socket.
//!
//! One reader and one writer per node, each owning a private cycle-scoped
//! buffer, driven by an external scheduler - this layer owns no threads and
//! never blocks. Both are generic over [`StatePayload`] and know nothing
//! about what rides inside a frame.
//!
//! The writer disarms itself after every successful send. Re-arming is an
//! explicit caller action, which bounds the broadcast rate to one datagram
//! per scheduler decision no matter how often local state changes.

use crate::config::RX_HEADROOM_FACTOR;
use crate::telemetry::Histogram;
use crate::wire::{
    parse_frame_header, write_frame_header, Cursor, CursorMut, StatePayload, FRAME_HEADER_SIZE,
};
use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives at most one frame per cycle and hands validated payloads to the
/// codec.
pub struct DatagramReader<P> {
    payload: Arc<P>,
    /// Private receive buffer, sized with headroom so oversized datagrams
    /// are captured whole and fail the length check instead of aliasing as
    /// a shorter valid frame.
    buf: Vec<u8>,
    frame_sizes: Histogram,
}

impl<P: StatePayload> DatagramReader<P> {
    #[must_use]
    pub fn new(payload: Arc<P>, max_entry_size: usize) -> Self {
        Self {
            payload,
            buf: vec![0u8; max_entry_size * RX_HEADROOM_FACTOR],
            frame_sizes: Histogram::new(),
        }
    }

    /// One non-blocking receive-validate-decode cycle.
    ///
    /// Returns the number of bytes consumed: 0 means nothing arrived or the
    /// frame was dropped (truncated, corrupted, or malformed payload - all
    /// silent local recovery, never an error). `Err` is reserved for real
    /// socket faults.
    pub fn read_cycle(&mut self, socket: &UdpSocket) -> io::Result<usize> {
        let received = match socket.recv_from(&mut self.buf) {
            Ok((n, _peer)) => n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(0),
            Err(e) => return Err(e),
        };

        if received < FRAME_HEADER_SIZE {
            // Not even a header yet; periodic re-broadcast covers us.
            return Ok(0);
        }

        let Some(declared) = parse_frame_header(&self.buf[..received]) else {
            log::debug!("[udp] dropping frame: header complement mismatch");
            return Ok(0);
        };

        if received - FRAME_HEADER_SIZE != declared {
            log::debug!(
                "[udp] dropping frame: declared {} bytes, received {}",
                declared,
                received - FRAME_HEADER_SIZE
            );
            return Ok(0);
        }

        let mut cursor = Cursor::new(&self.buf[FRAME_HEADER_SIZE..received]);
        if let Err(err) = self.payload.decode(&mut cursor) {
            log::debug!("[udp] dropping frame: {}", err);
            return Ok(0);
        }

        self.frame_sizes.sample(received as u64);
        Ok(received)
    }

    /// Size distribution of accepted frames.
    #[must_use]
    pub fn stats(&self) -> &Histogram {
        &self.frame_sizes
    }
}

/// Sends at most one frame per cycle, then disarms itself.
pub struct DatagramWriter<P> {
    payload: Arc<P>,
    /// Private send buffer: 4-byte header followed by the encoded payload.
    buf: Vec<u8>,
    armed: AtomicBool,
}

impl<P: StatePayload> DatagramWriter<P> {
    /// Writer starts armed so the first cycle announces local state.
    #[must_use]
    pub fn new(payload: Arc<P>, max_entry_size: usize) -> Self {
        Self {
            payload,
            buf: vec![0u8; FRAME_HEADER_SIZE + max_entry_size],
            armed: AtomicBool::new(true),
        }
    }

    /// Allow the next cycle to send. Called by the scheduler when the codec
    /// reports pending changes.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    /// Suppress sends until re-armed.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// One encode-frame-send cycle.
    ///
    /// Disarmed writers are a no-op returning 0. After a successful send the
    /// writer disarms itself; a failed send leaves it armed so the scheduler
    /// may retry the cycle. Returns bytes accepted by the transport.
    pub fn write_cycle(&mut self, socket: &UdpSocket, dest: SocketAddr) -> io::Result<usize> {
        if !self.armed.load(Ordering::Acquire) {
            return Ok(0);
        }

        let payload_len = {
            let mut cursor = CursorMut::new(&mut self.buf[FRAME_HEADER_SIZE..]);
            self.payload
                .encode(&mut cursor)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
            cursor.offset()
        };

        write_frame_header(&mut self.buf[..FRAME_HEADER_SIZE], payload_len)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

        let total = FRAME_HEADER_SIZE + payload_len;
        let sent = socket.send_to(&self.buf[..total], dest)?;
        self.armed.store(false, Ordering::Release);

        log::debug!("[udp] sent {} byte frame to {}", sent, dest);
        Ok(sent)
    }
}
