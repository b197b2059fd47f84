//! Byte-at-a-time frame reassembly.
//!
//! The [`Receiver`] is fed one byte at a time from whatever the transport has
//! buffered, and reassembles complete frames regardless of how the bytes were
//! chunked on the way in. Garbage never wedges it: any byte that cannot start
//! or continue a header sends it back to [`RecvState::AwaitSync0`], and the
//! next byte is evaluated as a fresh potential frame start.
//!
//! ```text
//!  AwaitSync0 --0x5A--> AwaitSync1 --0xA5--> AwaitLength --len--> AwaitCommand --cmd--> AwaitPayload
//!      ^                    |                                                              |
//!      +------ other -------+<------------------- len - 1 bytes received ------------------+
//! ```
//!
//! A finished frame is decoded in place (see [`crate::decode`]) and stays in
//! the buffer until the next sync byte arrives.

use heapless::Vec;

use crate::consts::{FRAME_SYNC0, FRAME_SYNC1, FRAME_SYNC1_ZERO, RECV_BUFFER_SIZE};
use crate::decode::{DecodedFrame, FrameInfo, decode};

/// Where the receiver is within a frame.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RecvState {
    /// Hunting for the first sync byte.
    #[default]
    AwaitSync0,
    /// Got `0x5A`, expecting the second sync byte.
    AwaitSync1,
    /// Expecting the length byte.
    AwaitLength,
    /// Expecting the command byte.
    AwaitCommand,
    /// Collecting `length - 1` payload bytes.
    AwaitPayload,
}

/// Which bytes are accepted in the second sync position.
///
/// Some display firmware sends `0x00` instead of `0xA5` there (observed on
/// `OK` acknowledgements). Accepting it is the default since those displays
/// would otherwise time out on every write.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Sync1Policy {
    /// Only `0xA5`.
    Strict,
    /// `0xA5` or `0x00`.
    #[default]
    AcceptZero,
}

impl Sync1Policy {
    fn accepts(self, byte: u8) -> bool {
        byte == FRAME_SYNC1 || (self == Sync1Policy::AcceptZero && byte == FRAME_SYNC1_ZERO)
    }
}

/// Frame reassembly state plus the receive buffer.
///
/// `Receiver` turns an arbitrarily chunked byte stream from the display back
/// into frames. It holds no I/O of its own: whoever owns the transport drains
/// it a byte at a time into [`feed`](Receiver::feed), which reports each frame
/// as it completes. [`Dgus::pump`](crate::driver::Dgus::pump) is the usual
/// caller, but a receiver can be driven directly, e.g. from a UART interrupt.
///
/// ## Type Parameters
///
/// - `N`: payload capacity in bytes. Frames announcing a longer payload are
///   dropped at the length byte and counted in [`dropped`](Receiver::dropped).
///   Their payload is then scanned for the next sync byte like any noise.
///
/// ## Resynchronisation
///
/// Only a `0x5A` can start a frame. A wrong second sync byte, a zero length
/// or an oversized length all send the receiver back to hunting for `0x5A`,
/// so line noise or a frame cut short by a reset costs at most that frame.
/// Which second sync bytes are valid is set by the [`Sync1Policy`].
///
/// ## Usage
///
/// ```rust
/// use dgus::{Receiver, Sync1Policy};
///
/// let mut rx: Receiver = Receiver::new(Sync1Policy::Strict);
/// let mut done = None;
/// for &b in &[0xFF, 0x5A, 0xA5, 0x06, 0x83, 0x10, 0x00, 0x01, 0x00, 0x2A] {
///     done = rx.feed(b).or(done);
/// }
/// assert!(done.is_some());
/// assert_eq!(rx.last_frame().unwrap().first_word(), Some(42));
/// ```
///
/// ## Notes
///
/// - The decoded data of the last frame lives in the receiver's buffer and is
///   cleared when the next frame's first sync byte arrives.
/// - [`reset`](Receiver::reset) only abandons a partial frame; the drop
///   counter is kept.
#[derive(Debug)]
pub struct Receiver<const N: usize = RECV_BUFFER_SIZE> {
    state: RecvState,
    policy: Sync1Policy,
    length: u8,
    command: u8,
    payload: Vec<u8, N>,
    last: Option<FrameInfo>,
    /// Frames dropped for announcing a length of zero or one larger than `N`.
    pub dropped: u16,
}

impl<const N: usize> Default for Receiver<N> {
    fn default() -> Self {
        Self::new(Sync1Policy::default())
    }
}

impl<const N: usize> Receiver<N> {
    /// Creates a receiver waiting for the first sync byte.
    pub const fn new(policy: Sync1Policy) -> Self {
        Self {
            state: RecvState::AwaitSync0,
            policy,
            length: 0,
            command: 0,
            payload: Vec::new(),
            last: None,
            dropped: 0,
        }
    }

    /// The current parser state.
    pub fn state(&self) -> RecvState {
        self.state
    }

    /// Abandons any partial frame.
    pub fn reset(&mut self) {
        self.state = RecvState::AwaitSync0;
    }

    /// The most recently completed frame, if the buffer still holds it.
    pub fn last_frame(&self) -> Option<DecodedFrame<'_>> {
        self.last.map(|info| info.view(&self.payload))
    }

    fn complete(&mut self) -> FrameInfo {
        self.state = RecvState::AwaitSync0;
        let info = decode(&mut self.payload, self.command);
        self.last = Some(info);
        info
    }

    /// Feeds one byte into the state machine.
    ///
    /// Returns the decoded frame metadata when this byte completed a frame.
    pub fn feed(&mut self, byte: u8) -> Option<FrameInfo> {
        match self.state {
            RecvState::AwaitSync0 => {
                if byte == FRAME_SYNC0 {
                    self.payload.clear();
                    self.length = 0;
                    self.command = 0;
                    self.last = None;
                    self.state = RecvState::AwaitSync1;
                } else {
                    trace!("dgus: dropping byte {} while hunting for sync", byte);
                }
                None
            }
            RecvState::AwaitSync1 => {
                if self.policy.accepts(byte) {
                    self.state = RecvState::AwaitLength;
                } else {
                    trace!("dgus: bad second sync byte {}", byte);
                    self.reset();
                }
                None
            }
            RecvState::AwaitLength => {
                let payload_len = (byte as usize).saturating_sub(1);
                if byte == 0 || payload_len > N {
                    warn!("dgus: dropping frame with length {} (capacity {})", byte, N);
                    self.dropped = self.dropped.wrapping_add(1);
                    self.reset();
                } else {
                    self.length = byte;
                    self.state = RecvState::AwaitCommand;
                }
                None
            }
            RecvState::AwaitCommand => {
                self.command = byte;
                if self.length == 1 {
                    return Some(self.complete());
                }
                self.state = RecvState::AwaitPayload;
                None
            }
            RecvState::AwaitPayload => {
                // Capacity was checked against the length byte.
                let _ = self.payload.push(byte);
                if self.payload.len() >= self.length as usize - 1 {
                    return Some(self.complete());
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::FrameKind;

    fn feed_all<const N: usize>(rx: &mut Receiver<N>, bytes: &[u8]) -> Vec<FrameInfo, 8> {
        let mut frames = Vec::new();
        for &b in bytes {
            if let Some(info) = rx.feed(b) {
                frames.push(info).unwrap();
            }
        }
        frames
    }

    const VAR_REPLY: [u8; 9] = [0x5A, 0xA5, 0x06, 0x83, 0x10, 0x00, 0x02, 0x00, 0x05];

    #[test]
    fn test_receiver_initial_state() {
        let rx: Receiver = Receiver::default();
        assert_eq!(rx.state(), RecvState::AwaitSync0);
        assert!(rx.last_frame().is_none());
    }

    #[test]
    fn test_single_frame_then_back_to_sync() {
        let mut rx: Receiver = Receiver::default();
        let frames = feed_all(&mut rx, &VAR_REPLY);
        assert_eq!(frames.len(), 1);
        assert_eq!(rx.state(), RecvState::AwaitSync0);

        let frame = rx.last_frame().unwrap();
        assert_eq!(frame.kind, FrameKind::VariableReply);
        assert_eq!(frame.address, 0x1000);
        assert_eq!(frame.data, &[0x05, 0x00]);

        let frames = feed_all(&mut rx, &VAR_REPLY);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].address, 0x1000);
    }

    #[test]
    fn test_garbage_before_sync_is_skipped() {
        let mut rx: Receiver = Receiver::default();
        let mut stream: Vec<u8, 32> = Vec::new();
        stream.extend_from_slice(&[0x00, 0xFF, 0x5A, 0x13, 0xA5, 0x5A, 0x5A]).unwrap();
        stream.extend_from_slice(&VAR_REPLY).unwrap();

        let frames = feed_all(&mut rx, &stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind, FrameKind::VariableReply);
        assert_eq!(frames[0].byte_len, 2);
    }

    #[test]
    fn test_bad_second_sync_resets() {
        let mut rx: Receiver = Receiver::default();
        assert!(rx.feed(0x5A).is_none());
        assert_eq!(rx.state(), RecvState::AwaitSync1);
        assert!(rx.feed(0x12).is_none());
        assert_eq!(rx.state(), RecvState::AwaitSync0);
    }

    #[test]
    fn test_zero_second_sync_is_a_policy() {
        let ack = [0x5A, 0x00, 0x03, 0x82, b'O', b'K'];

        let mut lenient: Receiver = Receiver::new(Sync1Policy::AcceptZero);
        let frames = feed_all(&mut lenient, &ack);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind, FrameKind::Ack);

        let mut strict: Receiver = Receiver::new(Sync1Policy::Strict);
        assert!(feed_all(&mut strict, &ack).is_empty());
    }

    #[test]
    fn test_length_one_frame_has_empty_payload() {
        let mut rx: Receiver = Receiver::default();
        let frames = feed_all(&mut rx, &[0x5A, 0xA5, 0x01, 0x84]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].frame_len, 0);
        assert_eq!(frames[0].kind, FrameKind::Other);
    }

    #[test]
    fn test_oversized_and_zero_length_frames_are_dropped() {
        let mut rx: Receiver<4> = Receiver::default();
        let mut stream: Vec<u8, 32> = Vec::new();
        stream.extend_from_slice(&[0x5A, 0xA5, 0x07, 0x82, 1, 2, 3, 4, 5, 6]).unwrap();
        stream.extend_from_slice(&[0x5A, 0xA5, 0x00]).unwrap();
        stream.extend_from_slice(&[0x5A, 0xA5, 0x03, 0x82, b'O', b'K']).unwrap();

        let frames = feed_all(&mut rx, &stream);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].kind, FrameKind::Ack);
        assert_eq!(rx.dropped, 2);
    }

    #[test]
    fn test_new_sync_invalidates_last_frame() {
        let mut rx: Receiver = Receiver::default();
        let _ = feed_all(&mut rx, &VAR_REPLY);
        assert!(rx.last_frame().is_some());
        assert!(rx.feed(0x5A).is_none());
        assert!(rx.last_frame().is_none());
    }
}
