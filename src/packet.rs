//! Outgoing frame construction.
//!
//! A [`Packet`] is a fixed-size buffer holding one frame: the 4-byte header
//! followed by the payload. Typed fields are appended in the display's wire
//! order (big-endian) and [`Packet::finalize`] stamps the header just before
//! transmission.
//!
//! ## Layout
//!
//! ```text
//! [0x5A][0xA5][len][cmd][payload ...]
//!                 |
//!                 +-- payload length + 1
//! ```
//!
//! All appends are all-or-nothing: capacity is checked before the first byte
//! is written, so a failed append leaves the packet exactly as it was.

use crate::command::Command;
use crate::consts::{FRAME_HEADER_LEN, FRAME_SYNC0, FRAME_SYNC1, MAX_FRAME_PAYLOAD, SEND_FRAME_SIZE};
use crate::error::CapacityExceeded;

/// A frame under construction.
///
/// `Packet` owns a fixed `[u8; N]` buffer laid out exactly as the frame goes
/// on the wire. The first four bytes are reserved for the header and stay
/// untouched until [`finalize`](Packet::finalize); everything after them is
/// payload, filled from the front by the `append_*` methods.
///
/// ## Type Parameters
///
/// - `N`: total capacity including the 4-byte header, so the payload holds
///   `N - 4` bytes. The default leaves 32 payload bytes. A packet smaller
///   than the header has no payload room at all: every append fails with
///   [`CapacityExceeded`] and it can never be finalized.
///
/// ## Usage
///
/// ```rust
/// use dgus::{Command, Packet};
///
/// let mut p: Packet = Packet::new();
/// p.append_words16(&[0x1000]).unwrap();
/// p.append_word_compact(5).unwrap();
/// assert_eq!(
///     p.finalize(Command::VariableWrite).unwrap(),
///     &[0x5A, 0xA5, 0x05, 0x82, 0x10, 0x00, 0x00, 0x05]
/// );
/// ```
///
/// ## Notes
///
/// - Appends are all-or-nothing, so a failed append can be retried into a
///   fresh packet without cleanup.
/// - [`finalize`](Packet::finalize) can be called repeatedly; it only rewrites
///   the header.
/// - The driver keeps one packet per connection and hands it out through
///   [`Dgus::packet`](crate::driver::Dgus::packet), already reset.
#[derive(Clone, Debug)]
pub struct Packet<const N: usize = SEND_FRAME_SIZE> {
    buf: [u8; N],
    /// Write cursor, relative to the start of the payload.
    len: usize,
}

impl<const N: usize> Default for Packet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Packet<N> {
    /// Creates an empty, zero-filled packet.
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            len: 0,
        }
    }

    /// Wipes the payload and rewinds the cursor.
    pub fn reset(&mut self) {
        self.buf = [0; N];
        self.len = 0;
    }

    /// Number of payload bytes written so far.
    ///
    /// This is the write cursor, not the frame length: the header's length
    /// byte is `len() + 1` to account for the command byte.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no payload has been written.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// How many payload bytes fit in this packet.
    pub const fn capacity(&self) -> usize {
        N.saturating_sub(FRAME_HEADER_LEN)
    }

    /// Payload bytes still free.
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// The payload written so far.
    pub fn payload(&self) -> &[u8] {
        self.buf
            .get(FRAME_HEADER_LEN..FRAME_HEADER_LEN + self.len)
            .unwrap_or(&[])
    }

    fn reserve(&mut self, count: usize) -> Result<&mut [u8], CapacityExceeded> {
        if count > self.remaining() {
            return Err(CapacityExceeded);
        }
        let start = FRAME_HEADER_LEN + self.len;
        let out = self.buf.get_mut(start..start + count).ok_or(CapacityExceeded)?;
        self.len += count;
        Ok(out)
    }

    /// Appends raw bytes.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Appends each word as 2 big-endian bytes.
    pub fn append_words16(&mut self, words: &[u16]) -> Result<(), CapacityExceeded> {
        let out = self.reserve(words.len() * 2)?;
        for (chunk, word) in out.chunks_exact_mut(2).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Ok(())
    }

    /// Appends each word as 4 big-endian bytes.
    pub fn append_words32(&mut self, words: &[u32]) -> Result<(), CapacityExceeded> {
        let out = self.reserve(words.len() * 4)?;
        for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Ok(())
    }

    /// Appends `value` as a single VAR word when it fits in 16 bits, and as a
    /// double word otherwise.
    ///
    /// The display accepts either width for a VAR write; values above `0xFFFF`
    /// (page changes, reset magic) spill into the following word.
    pub fn append_word_compact(&mut self, value: u32) -> Result<(), CapacityExceeded> {
        match u16::try_from(value) {
            Ok(word) => self.append_words16(&[word]),
            Err(_) => self.append_words32(&[value]),
        }
    }

    /// Overwrites payload bytes at `offset` without moving the cursor.
    ///
    /// Used to patch a field written earlier, e.g. a count that is only known
    /// once the rest of the payload has been laid out.
    pub fn set_bytes_at(&mut self, offset: usize, bytes: &[u8]) -> Result<(), CapacityExceeded> {
        let end = offset.checked_add(bytes.len()).ok_or(CapacityExceeded)?;
        if end > self.capacity() {
            return Err(CapacityExceeded);
        }
        self.buf
            .get_mut(FRAME_HEADER_LEN + offset..FRAME_HEADER_LEN + end)
            .ok_or(CapacityExceeded)?
            .copy_from_slice(bytes);
        Ok(())
    }

    /// Moves the cursor to `len`, e.g. to send trailing bytes that were
    /// patched in with [`set_bytes_at`](Packet::set_bytes_at).
    pub fn set_len(&mut self, len: usize) -> Result<(), CapacityExceeded> {
        if len > self.capacity() {
            return Err(CapacityExceeded);
        }
        self.len = len;
        Ok(())
    }

    /// Stamps the header for `command` and returns the bytes to put on the wire.
    pub fn finalize(&mut self, command: Command) -> Result<&[u8], CapacityExceeded> {
        if self.len > MAX_FRAME_PAYLOAD || N < FRAME_HEADER_LEN {
            return Err(CapacityExceeded);
        }
        self.buf[0] = FRAME_SYNC0;
        self.buf[1] = FRAME_SYNC1;
        self.buf[2] = (self.len + 1) as u8;
        self.buf[3] = command.code();
        Ok(&self.buf[..FRAME_HEADER_LEN + self.len])
    }
}
