// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire encoding for discovery datagrams.
//!
//! Three layers, strictly separated:
//!
//! - [`cursor`] - bounds-checked big-endian read/write cursors over byte
//!   buffers
//! - [`frame`] - the 4-byte integrity header that delimits one payload per
//!   datagram
//! - [`StatePayload`] - the contract a stateful payload implements to ride
//!   inside a frame; the framing layer never looks past the header, the
//!   payload never sees the header
//!
//! The framing layer hands `decode` a buffer already known to contain exactly
//! one complete, integrity-checked payload.

pub mod cursor;
pub mod frame;

pub use cursor::{Cursor, CursorMut};
pub use frame::{parse_frame_header, write_frame_header, FRAME_HEADER_SIZE};

use std::fmt;

/// Result type for wire encoding/decoding operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised by cursors and payload codecs.
///
/// The datagram reader treats every decode-side variant as "drop the frame";
/// these are surfaced to callers only on the encode path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    WriteFailed { offset: usize, reason: String },
    ReadFailed { offset: usize, reason: String },
    InvalidData { reason: String },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::WriteFailed { offset, reason } => {
                write!(f, "write failed at offset {}: {}", offset, reason)
            }
            WireError::ReadFailed { offset, reason } => {
                write!(f, "read failed at offset {}: {}", offset, reason)
            }
            WireError::InvalidData { reason } => write!(f, "invalid data: {}", reason),
        }
    }
}

impl std::error::Error for WireError {}

/// Contract between the framing layer and any stateful payload.
///
/// `encode` appends the implementer's current state at the cursor position;
/// `decode` consumes a buffer holding exactly one validated payload and
/// merges it into the implementer's state. Both take `&self`: payload types
/// are mutated concurrently by encode cycles and application threads, so
/// they rely on interior mutability (atomics, concurrent sets) rather than
/// exclusive borrows.
///
/// Implemented by [`crate::discovery::GossipCodec`]; any other stateful type
/// can implement it to be gossiped through the same reader/writer.
pub trait StatePayload {
    /// Serialize current state into `dst`.
    fn encode(&self, dst: &mut CursorMut<'_>) -> WireResult<()>;

    /// Deserialize one complete payload from `src` and merge it.
    fn decode(&self, src: &mut Cursor<'_>) -> WireResult<()>;
}
