//! Classification and in-place decoding of received frames.
//!
//! Once the [`Receiver`](crate::receiver::Receiver) has assembled a frame, the
//! payload is run through [`decode`], which works out what kind of frame it
//! is and rewrites the payload so that callers see a dense, host-order data
//! region:
//!
//! | Frame            | Wire payload                      | Data view                    |
//! |------------------|-----------------------------------|------------------------------|
//! | ACK              | `O K`                             | `O K`                        |
//! | VAR read reply   | `addr_hi addr_lo len w0_hi w0_lo…`| `w0_lo w0_hi …` (swapped)    |
//! | REG read reply   | `addr len d0 d1 …`                | `d0 d1 …`                    |
//! | anything else    | untouched                         | untouched                    |
//!
//! The length field of a read reply is passed through as `byte_len`, but the
//! data view is clipped to the bytes that actually arrived, so a short frame
//! never exposes stale buffer contents.

use crate::command::Command;
use crate::consts::ACK_PAYLOAD;

/// What a received frame turned out to be.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum FrameKind {
    /// The `OK` sentinel acknowledging a write.
    Ack,
    /// Reply to a [`Command::VariableRead`], or a VAR auto-upload from a touch
    /// control.
    VariableReply,
    /// Reply to a [`Command::RegisterRead`].
    RegisterReply,
    /// Any other frame, forwarded as-is.
    Other,
}

/// Metadata of a decoded frame, without the borrow of its data.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct FrameInfo {
    /// Classification.
    pub kind: FrameKind,
    /// Raw command byte from the header.
    pub command: u8,
    /// Payload length as received (the header length minus the command byte).
    pub frame_len: u8,
    /// Source address for read replies, `0` otherwise.
    pub address: u16,
    /// Length field of a read reply, `0` otherwise.
    pub byte_len: u8,
    /// Number of bytes in the dense data view.
    pub data_len: usize,
}

impl FrameInfo {
    /// Attaches the decoded payload buffer to this metadata.
    ///
    /// A buffer shorter than `data_len` is taken whole.
    pub fn view<'a>(&self, payload: &'a [u8]) -> DecodedFrame<'a> {
        DecodedFrame {
            kind: self.kind,
            command: self.command,
            frame_len: self.frame_len,
            address: self.address,
            byte_len: self.byte_len,
            data: payload.get(..self.data_len).unwrap_or(payload),
        }
    }
}

/// A decoded frame as handed to a [`FrameHandler`](crate::driver::FrameHandler)
/// or returned from a synchronous read.
///
/// The data borrows the driver's receive buffer, which is overwritten by the
/// next frame.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct DecodedFrame<'a> {
    /// Classification.
    pub kind: FrameKind,
    /// Raw command byte from the header.
    pub command: u8,
    /// Payload length as received.
    pub frame_len: u8,
    /// Source address for read replies, `0` otherwise.
    pub address: u16,
    /// Length field of a read reply, `0` otherwise.
    pub byte_len: u8,
    /// Dense, host-order data.
    pub data: &'a [u8],
}

impl DecodedFrame<'_> {
    /// The header command, if it is one the driver knows.
    pub fn command(&self) -> Option<Command> {
        Command::try_from(self.command).ok()
    }

    /// Iterates the data as host-order words (little-endian pairs).
    ///
    /// Only meaningful for VAR replies; a trailing odd byte is ignored.
    pub fn words(&self) -> impl Iterator<Item = u16> + '_ {
        self.data
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
    }

    /// The first data word, which is all a button or slider auto-upload carries.
    pub fn first_word(&self) -> Option<u16> {
        self.words().next()
    }
}

/// Classifies `payload` and rewrites it in place.
///
/// `payload` must be exactly the received payload: its length is the frame
/// length minus the command byte.
pub fn decode(payload: &mut [u8], command: u8) -> FrameInfo {
    let frame_len = payload.len() as u8;
    let mut info = FrameInfo {
        kind: FrameKind::Other,
        command,
        frame_len,
        address: 0,
        byte_len: 0,
        data_len: payload.len(),
    };

    let command = Command::try_from(command).ok();
    if payload[..] == ACK_PAYLOAD[..] && command.is_some_and(Command::acknowledges) {
        info.kind = FrameKind::Ack;
        return info;
    }

    match command {
        Some(Command::VariableRead) if payload.len() >= 3 => {
            info.kind = FrameKind::VariableReply;
            info.address = u16::from_be_bytes([payload[0], payload[1]]);
            info.byte_len = payload[2];

            let received = (payload.len() - 3) & !1;
            let data_len = received.min(info.byte_len as usize * 2);
            payload.copy_within(3..3 + data_len, 0);
            for pair in payload[..data_len].chunks_exact_mut(2) {
                pair.swap(0, 1);
            }
            info.data_len = data_len;
        }
        Some(Command::RegisterRead) if payload.len() >= 2 => {
            info.kind = FrameKind::RegisterReply;
            info.address = payload[0] as u16;
            info.byte_len = payload[1];

            let data_len = (payload.len() - 2).min(info.byte_len as usize);
            payload.copy_within(2..2 + data_len, 0);
            info.data_len = data_len;
        }
        _ => {}
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_var_reply_is_swapped_and_compacted() {
        let mut payload = [0x10, 0x00, 0x02, 0x00, 0x05];
        let info = decode(&mut payload, 0x83);

        assert_eq!(info.kind, FrameKind::VariableReply);
        assert_eq!(info.address, 0x1000);
        assert_eq!(info.byte_len, 2);
        assert_eq!(info.frame_len, 5);

        let frame = info.view(&payload);
        assert_eq!(frame.data, &[0x05, 0x00]);
        assert_eq!(frame.first_word(), Some(5));
    }

    #[test]
    fn test_var_reply_with_several_words() {
        let mut payload = [0x50, 0x02, 0x02, 0x00, 0x01, 0x12, 0x34];
        let info = decode(&mut payload, 0x83);
        let frame = info.view(&payload);

        assert_eq!(frame.address, 0x5002);
        assert_eq!(frame.data, &[0x01, 0x00, 0x34, 0x12]);
        assert_eq!(frame.words().collect::<Vec<_>>(), vec![0x0001, 0x1234]);
    }

    #[test]
    fn test_var_reply_is_clipped_to_the_requested_words() {
        let mut payload = [0x00, 0x14, 0x01, 0x00, 0x03, 0xAA, 0xBB];
        let info = decode(&mut payload, 0x83);
        assert_eq!(info.view(&payload).data, &[0x03, 0x00]);
    }

    #[test]
    fn test_reg_reply_strips_header() {
        let mut payload = [0x03, 0x02, 0x00, 0x02];
        let info = decode(&mut payload, 0x81);
        let frame = info.view(&payload);

        assert_eq!(frame.kind, FrameKind::RegisterReply);
        assert_eq!(frame.address, 0x03);
        assert_eq!(frame.byte_len, 2);
        assert_eq!(frame.data, &[0x00, 0x02]);
    }

    #[test]
    fn test_ack_only_for_write_commands() {
        let mut ok = *b"OK";
        assert_eq!(decode(&mut ok, 0x82).kind, FrameKind::Ack);
        assert_eq!(decode(&mut ok, 0x80).kind, FrameKind::Ack);
        assert_eq!(decode(&mut ok, 0x84).kind, FrameKind::Other);
        assert_eq!(decode(&mut ok, 0x42).kind, FrameKind::Other);

        let mut not_ok = *b"OX";
        assert_eq!(decode(&mut not_ok, 0x82).kind, FrameKind::Other);
    }

    #[test]
    fn test_other_frames_pass_through() {
        let mut payload = [0x01, 0x02, 0x03];
        let info = decode(&mut payload, 0x82);
        assert_eq!(info.kind, FrameKind::Other);
        assert_eq!(info.address, 0);
        assert_eq!(info.byte_len, 0);
        assert_eq!(info.view(&payload).data, &[0x01, 0x02, 0x03]);
        assert_eq!(info.view(&payload).command(), Some(Command::VariableWrite));
    }

    #[test]
    fn test_view_of_a_short_buffer_is_clipped() {
        let mut payload = [0x10, 0x00, 0x02, 0x00, 0x05, 0x00, 0x06];
        let info = decode(&mut payload, 0x83);
        assert_eq!(info.data_len, 4);

        let frame = info.view(&payload[..1]);
        assert_eq!(frame.data, &[0x05]);
        assert_eq!(frame.first_word(), None);
        assert!(info.view(&[]).data.is_empty());
    }

    #[test]
    fn test_truncated_read_reply_is_other() {
        let mut payload = [0x10, 0x00];
        assert_eq!(decode(&mut payload, 0x83).kind, FrameKind::Other);
    }
}
