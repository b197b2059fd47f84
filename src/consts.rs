//! Constants used across the DGUS protocol implementation.
//!
//! This module defines the wire-level framing bytes, default buffer sizes and
//! timing values, and the handful of magic values the display firmware
//! expects in specific registers.
//!
//! ## Key Concepts
//!
//! - **Header**: Every frame starts with two sync bytes, a length byte and a
//!   command byte. The length counts the command byte plus the payload.
//! - **ACK**: With ACK mode enabled on the display, every write is answered
//!   with a frame whose payload is the ASCII text `OK`.
//! - **Buffer Sizing**: The payload capacities below are the defaults for the
//!   const generics on [`Dgus`](crate::driver::Dgus); larger displays or
//!   longer text fields can raise them.

use core::time::Duration;

/// First sync byte of every frame.
pub const FRAME_SYNC0: u8 = 0x5A;

/// Second sync byte of every frame.
pub const FRAME_SYNC1: u8 = 0xA5;

/// Alternative second sync byte some firmware revisions emit.
///
/// Only accepted when [`Sync1Policy::AcceptZero`](crate::receiver::Sync1Policy::AcceptZero)
/// is configured.
pub const FRAME_SYNC1_ZERO: u8 = 0x00;

/// Length (in bytes) of the frame header: sync0, sync1, length, command.
pub const FRAME_HEADER_LEN: usize = 4;

/// Payload of the acknowledgement frame sent in reply to a write.
pub const ACK_PAYLOAD: [u8; 2] = *b"OK";

/// Default payload capacity (in bytes) of the send packet.
pub const SEND_BUFFER_SIZE: usize = 32;

/// Default capacity of the send packet including its header.
pub const SEND_FRAME_SIZE: usize = FRAME_HEADER_LEN + SEND_BUFFER_SIZE;

/// Default payload capacity (in bytes) of the receive buffer.
pub const RECV_BUFFER_SIZE: usize = 32;

/// Largest payload a frame can describe: the length byte counts the command
/// byte too.
pub const MAX_FRAME_PAYLOAD: usize = u8::MAX as usize - 1;

/// How long a write waits for its `OK`, or a read for its reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(200);

/// Sleep between two polls of the transport that produced nothing.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);
