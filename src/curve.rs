//! Batched writes to the display's real-time curve buffer.
//!
//! Trend-chart controls on the display draw from up to eight curve channels.
//! Points are collected per channel in a [`CurveBuffer`] and pushed to the
//! display in a single frame with [`CurveBuffer::send`]:
//!
//! ```text
//! [0x0310][0x5AA5][count][0x00] { [channel][n][word 0] .. [word n-1] } * count
//! ```
//!
//! Only channels holding at least one point are included, and `count` is the
//! number of channels actually in the frame.

use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::command::Command;
use crate::driver::{Dgus, FrameHandler};
use crate::error::{CapacityExceeded, CurveError, DgusError};
use crate::reg::{CURVE_WRITE_ADDR, CURVE_WRITE_MARKER};
use crate::timer::Clock;
use crate::transport::Transport;

/// Payload offset of the channel count.
const COUNT_OFFSET: usize = 4;

#[derive(Debug)]
struct Channel<const POINTS: usize> {
    id: u8,
    points: Vec<u16, POINTS>,
}

/// Points waiting to be sent, for up to `CHANNELS` channels of `POINTS`
/// points each.
///
/// The send packet must be large enough for the whole batch: 6 bytes of
/// header plus `2 + 2 * points` per non-empty channel.
#[derive(Debug)]
pub struct CurveBuffer<const CHANNELS: usize, const POINTS: usize> {
    channels: Vec<Channel<POINTS>, CHANNELS>,
}

impl<const CHANNELS: usize, const POINTS: usize> Default for CurveBuffer<CHANNELS, POINTS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CHANNELS: usize, const POINTS: usize> CurveBuffer<CHANNELS, POINTS> {
    /// Creates a buffer with no channels.
    pub const fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Starts buffering points for channel `id`.
    ///
    /// Initialising a channel twice is a no-op.
    pub fn init_channel(&mut self, id: u8) -> Result<(), CurveError> {
        if self.channel(id).is_some() {
            return Ok(());
        }
        self.channels
            .push(Channel {
                id,
                points: Vec::new(),
            })
            .map_err(|_| CurveError::BufferFull)
    }

    /// Buffers one point on channel `id`.
    pub fn add_point(&mut self, id: u8, value: u16) -> Result<(), CurveError> {
        let channel = self
            .channels
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(CurveError::ChannelNotFound(id))?;
        channel.points.push(value).map_err(|_| CurveError::BufferFull)
    }

    /// Points buffered on channel `id`, if it was initialised.
    pub fn points(&self, id: u8) -> Option<&[u16]> {
        self.channel(id).map(|c| c.points.as_slice())
    }

    /// Whether no channel has a point to send.
    pub fn is_empty(&self) -> bool {
        self.channels.iter().all(|c| c.points.is_empty())
    }

    /// Drops all buffered points, keeping the channels.
    pub fn clear(&mut self) {
        for channel in self.channels.iter_mut() {
            channel.points.clear();
        }
    }

    fn channel(&self, id: u8) -> Option<&Channel<POINTS>> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Writes every buffered point to the display and clears the buffer.
    ///
    /// Nothing is sent when the buffer is empty. On error the points are kept
    /// so the batch can be retried.
    pub fn send<T, C, D, H, const TX: usize, const RX: usize>(
        &mut self,
        dgus: &mut Dgus<T, C, D, H, TX, RX>,
    ) -> Result<(), DgusError<T::Error>>
    where
        T: Transport,
        C: Clock,
        D: DelayNs,
        H: FrameHandler,
    {
        if self.is_empty() {
            return Ok(());
        }

        let p = dgus.packet();
        p.append_words16(&[CURVE_WRITE_ADDR, CURVE_WRITE_MARKER])?;
        p.append_bytes(&[0, 0])?;

        let mut count: u8 = 0;
        for channel in self.channels.iter().filter(|c| !c.points.is_empty()) {
            let n = u8::try_from(channel.points.len()).map_err(|_| CapacityExceeded)?;
            p.append_bytes(&[channel.id, n])?;
            p.append_words16(&channel.points)?;
            count = count.saturating_add(1);
        }
        p.set_bytes_at(COUNT_OFFSET, &[count])?;

        dgus.send(Command::VariableWrite)?;
        self.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DgusConfig;
    use crate::testutil::{MockSerial, SimClock, ack, frame};

    fn lcd(serial: MockSerial) -> Dgus<MockSerial, SimClock, SimClock> {
        let clock = SimClock::default();
        Dgus::new(DgusConfig::default(), clock.clone(), clock).with_transport(serial)
    }

    #[test]
    fn test_channel_bookkeeping() {
        let mut curves: CurveBuffer<2, 2> = CurveBuffer::new();
        assert_eq!(curves.add_point(0, 1), Err(CurveError::ChannelNotFound(0)));

        curves.init_channel(0).unwrap();
        curves.init_channel(0).unwrap();
        curves.init_channel(3).unwrap();
        assert_eq!(curves.init_channel(5), Err(CurveError::BufferFull));

        curves.add_point(3, 10).unwrap();
        curves.add_point(3, 11).unwrap();
        assert_eq!(curves.add_point(3, 12), Err(CurveError::BufferFull));
        assert_eq!(curves.points(3), Some(&[10, 11][..]));
        assert_eq!(curves.points(0), Some(&[][..]));
        assert_eq!(curves.points(5), None);
    }

    #[test]
    fn test_send_skips_empty_channels() {
        let mut serial = MockSerial::new();
        serial.reply_with(&ack());
        let mut lcd = lcd(serial);

        let mut curves: CurveBuffer<3, 4> = CurveBuffer::new();
        for id in [0, 1, 2] {
            curves.init_channel(id).unwrap();
        }
        curves.add_point(0, 0x0102).unwrap();
        curves.add_point(2, 0x0A0B).unwrap();
        curves.add_point(2, 0x0C0D).unwrap();

        curves.send(&mut lcd).unwrap();
        assert!(curves.is_empty());

        let expected = frame(
            0x82,
            &[
                0x03, 0x10, 0x5A, 0xA5, 0x02, 0x00, // header, 2 channels
                0x00, 0x01, 0x01, 0x02, // channel 0
                0x02, 0x02, 0x0A, 0x0B, 0x0C, 0x0D, // channel 2
            ],
        );
        assert_eq!(lcd.transport_mut().unwrap().written, expected);
    }

    #[test]
    fn test_empty_buffer_sends_nothing() {
        let mut lcd = lcd(MockSerial::new());
        let mut curves: CurveBuffer<1, 1> = CurveBuffer::new();
        curves.init_channel(0).unwrap();
        curves.send(&mut lcd).unwrap();
        assert!(lcd.transport_mut().unwrap().written.is_empty());
    }

    #[test]
    fn test_failed_send_keeps_points() {
        let mut lcd = lcd(MockSerial::new());
        let mut curves: CurveBuffer<1, 2> = CurveBuffer::default();
        curves.init_channel(1).unwrap();
        curves.add_point(1, 7).unwrap();

        assert_eq!(curves.send(&mut lcd), Err(DgusError::Timeout));
        assert_eq!(curves.points(1), Some(&[7][..]));
    }

    #[test]
    fn test_batch_larger_than_packet() {
        let mut lcd = lcd(MockSerial::new());
        let mut curves: CurveBuffer<1, 16> = CurveBuffer::new();
        curves.init_channel(0).unwrap();
        for v in 0..16 {
            curves.add_point(0, v).unwrap();
        }
        assert_eq!(curves.send(&mut lcd), Err(DgusError::CapacityExceeded));
        assert_eq!(curves.points(0).map(<[u16]>::len), Some(16));
    }
}
