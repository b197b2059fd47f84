//! Test doubles: a scripted serial port and a simulated clock.

use core::convert::Infallible;
use core::time::Duration;
use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;

use crate::timer::Clock;
use crate::transport::Transport;

/// Simulated time shared between a [`Clock`] and a [`DelayNs`].
///
/// Clones observe and advance the same instant, so a delay handed to the
/// driver moves the clock the driver reads.
#[derive(Clone, Default, Debug)]
pub(crate) struct SimClock {
    now: Rc<Cell<Duration>>,
}

impl SimClock {
    pub(crate) fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.now.get()
    }
}

impl Clock for SimClock {
    fn now(&mut self) -> Duration {
        self.now.get()
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(Duration::from_nanos(u64::from(ns)));
    }
}

/// A serial port that records writes and answers them from a script.
#[derive(Default, Debug)]
pub(crate) struct MockSerial {
    rx: VecDeque<u8>,
    pub(crate) written: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    /// Time charged to `clock` on every `bytes_available` call.
    poll_cost: Option<(SimClock, Duration)>,
}

impl MockSerial {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bytes that are already waiting to be read.
    pub(crate) fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Bytes that become readable after the next write.
    pub(crate) fn reply_with(&mut self, bytes: &[u8]) {
        self.replies.push_back(bytes.to_vec());
    }

    /// Makes every poll of the port cost `cost` of simulated time.
    pub(crate) fn with_poll_cost(mut self, clock: &SimClock, cost: Duration) -> Self {
        self.poll_cost = Some((clock.clone(), cost));
        self
    }

    pub(crate) fn pending(&self) -> usize {
        self.rx.len()
    }
}

impl Transport for MockSerial {
    type Error = Infallible;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        if let Some((clock, cost)) = &self.poll_cost {
            clock.advance(*cost);
        }
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.written.extend_from_slice(bytes);
        if let Some(reply) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
        Ok(())
    }
}

/// Wraps `payload` in a frame header.
pub(crate) fn frame(command: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0x5A, 0xA5, payload.len() as u8 + 1, command];
    out.extend_from_slice(payload);
    out
}

/// The `OK` acknowledgement for a VAR write.
pub(crate) fn ack() -> Vec<u8> {
    frame(0x82, b"OK")
}
