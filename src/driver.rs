//! DGUS II display driver.
//!
//! This module provides the [`Dgus`] struct, the connection object that ties
//! a [`Transport`] to the frame codec, the receive state machine and the
//! request/acknowledgement correlator. It owns its send [`Packet`] and its
//! [`Receiver`], so several displays can be driven side by side, each through
//! its own `Dgus`.
//!
//! ## Features
//!
//! - Builds frames in the connection's send buffer and writes them out
//! - Waits for the display's `OK` after writes (configurable)
//! - Synchronous VAR/REG reads with a deadline-based timeout
//! - Incoming frames (touch events, auto-uploaded VARs) delivered to a
//!   [`FrameHandler`] from [`Dgus::pump`]
//!
//! ## Example
//!
//! ```rust
//! # use dgus::transport::Transport;
//! # use core::convert::Infallible;
//! # struct Port;
//! # impl Transport for Port {
//! #     type Error = Infallible;
//! #     fn bytes_available(&mut self) -> Result<usize, Infallible> { Ok(0) }
//! #     fn read_byte(&mut self) -> nb::Result<u8, Infallible> { Err(nb::Error::WouldBlock) }
//! #     fn write(&mut self, _: &[u8]) -> Result<(), Infallible> { Ok(()) }
//! # }
//! use dgus::decode::DecodedFrame;
//! use dgus::driver::{AckMode, Dgus, DgusConfig};
//! use dgus::timer::{StdClock, StdDelay};
//!
//! let config = DgusConfig::default().with_ack_mode(AckMode::Disabled);
//! let mut lcd = Dgus::new(config, StdClock::new(), StdDelay)
//!     .with_transport(Port)
//!     .with_handler(|frame: &DecodedFrame<'_>| {
//!         if frame.address == 0x5002 {
//!             // a button on the display was pressed
//!         }
//!     });
//!
//! lcd.set_var(0x500A, 999).unwrap();
//! loop {
//!     lcd.pump().unwrap();
//!     # break;
//! }
//! ```
//!
//! ## Design Notes
//!
//! Only one request can be outstanding per connection: the driver has no
//! request identifiers, so the next frame to arrive after a read is taken as
//! its reply. The handler is called from inside [`Dgus::pump`] and only sees
//! a borrowed view of the receive buffer; it cannot send on the connection.

use core::time::Duration;

use embedded_hal::delay::DelayNs;

use crate::command::Command;
use crate::consts::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, RECV_BUFFER_SIZE, SEND_FRAME_SIZE};
use crate::decode::{DecodedFrame, FrameKind};
use crate::error::DgusError;
use crate::packet::Packet;
use crate::receiver::{Receiver, RecvState, Sync1Policy};
use crate::timer::{Clock, Deadline, interval_us};
use crate::transport::Transport;

/// Whether writes wait for the display's `OK`.
///
/// Must match the display's ACK setting in its `T5L_CFG.CFG`: waiting for an
/// `OK` that never comes makes every write time out.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum AckMode {
    /// Fire and forget.
    Disabled,
    /// Block each write until its `OK` arrives or the timeout expires.
    #[default]
    Wait,
}

/// Connection settings, fixed when the driver is built.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DgusConfig {
    /// Wait for `OK` after writes.
    pub ack_mode: AckMode,
    /// Budget for an `OK` or a read reply.
    pub timeout: Duration,
    /// Sleep between polls that found nothing.
    pub poll_interval: Duration,
    /// Which second sync bytes the receiver accepts.
    pub sync1: Sync1Policy,
}

impl Default for DgusConfig {
    fn default() -> Self {
        Self {
            ack_mode: AckMode::default(),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            sync1: Sync1Policy::default(),
        }
    }
}

impl DgusConfig {
    /// Sets the acknowledgement mode.
    pub fn with_ack_mode(mut self, ack_mode: AckMode) -> Self {
        self.ack_mode = ack_mode;
        self
    }

    /// Sets the timeout budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Sets the second-sync-byte policy.
    pub fn with_sync1_policy(mut self, sync1: Sync1Policy) -> Self {
        self.sync1 = sync1;
        self
    }
}

/// Outcome of a single [`Dgus::pump`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PumpStatus {
    /// The transport ran dry before a frame was complete.
    NoFrame,
    /// An `OK` acknowledgement arrived.
    Ack,
    /// A frame was decoded and dispatched. Carries the read-reply length
    /// field, `0` for frames without one.
    Frame(u8),
}

/// Receives every decoded frame that is not an acknowledgement.
///
/// Implemented for any `FnMut(&DecodedFrame<'_>)`. Annotate the closure
/// argument (`|frame: &DecodedFrame<'_>|`) so it accepts any lifetime.
pub trait FrameHandler {
    /// Called from [`Dgus::pump`] for each dispatched frame.
    fn on_frame(&mut self, frame: &DecodedFrame<'_>);
}

impl<F> FrameHandler for F
where
    F: FnMut(&DecodedFrame<'_>),
{
    fn on_frame(&mut self, frame: &DecodedFrame<'_>) {
        self(frame)
    }
}

/// The handler used until one is attached: drops every frame.
#[derive(Clone, Copy, Default, Debug)]
pub struct NoHandler;

impl FrameHandler for NoHandler {
    fn on_frame(&mut self, _frame: &DecodedFrame<'_>) {}
}

/// A connection to one DGUS display.
///
/// `Dgus` owns everything one display link needs: the transport, a send
/// [`Packet`], a [`Receiver`] and the handler for frames the display sends on
/// its own. Nothing is global, so two displays on two UARTs are simply two
/// `Dgus` values.
///
/// ## Sending
///
/// Every command is built in the connection's packet and written in one
/// [`Transport::write`]. With [`AckMode::Wait`] a write then pumps the
/// receiver until the display's `OK` arrives, sleeping
/// [`DgusConfig::poll_interval`] between empty polls and giving up with
/// [`DgusError::Timeout`] once [`DgusConfig::timeout`] has passed on the
/// [`Clock`]. Read commands never wait for `OK`.
///
/// ## Receiving
///
/// Frames are only read when the driver is pumped: explicitly through
/// [`pump`](Dgus::pump), or implicitly while a write or a read is waiting.
/// Each non-`OK` frame is handed to the [`FrameHandler`], so touch events that
/// arrive during a wait are not lost.
///
/// ## Type Parameters
///
/// - `T`: the [`Transport`] carrying the bytes
/// - `C`: a monotonic [`Clock`] for timeouts
/// - `D`: an [`embedded_hal::delay::DelayNs`] used between polls
/// - `H`: the [`FrameHandler`] for unsolicited frames, [`NoHandler`] until
///   [`with_handler`](Dgus::with_handler) is called
/// - `TX`: send packet capacity, header included
/// - `RX`: receive payload capacity
///
/// ## Notes
///
/// - Until a transport is attached every operation returns
///   [`DgusError::NotConfigured`].
/// - `acks` and `timeouts` are plain counters for diagnostics; they wrap
///   instead of saturating.
/// - The display and the driver must agree on the ACK setting, see
///   [`AckMode`].
#[derive(Debug)]
pub struct Dgus<T, C, D, H = NoHandler, const TX: usize = SEND_FRAME_SIZE, const RX: usize = RECV_BUFFER_SIZE>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
    H: FrameHandler,
{
    /// Settings this connection was built with.
    pub config: DgusConfig,
    transport: Option<T>,
    clock: C,
    delay: D,
    handler: H,
    packet: Packet<TX>,
    receiver: Receiver<RX>,

    /// Acknowledgements received.
    pub acks: u32,

    /// Waits that ran out of time.
    pub timeouts: u32,
}

impl<T, C, D> Dgus<T, C, D>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
{
    /// Creates a driver with the default buffer sizes and no transport.
    ///
    /// Attach a transport with [`with_transport`](Dgus::with_transport) or
    /// [`attach`](Dgus::attach) before talking to the display; until then
    /// every operation fails with [`DgusError::NotConfigured`].
    pub fn new(config: DgusConfig, clock: C, delay: D) -> Self {
        Self::with_buffers(config, clock, delay)
    }
}

impl<T, C, D, const TX: usize, const RX: usize> Dgus<T, C, D, NoHandler, TX, RX>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
{
    /// Creates a driver with custom buffer sizes, e.g.
    /// `Dgus::<_, _, _, _, 132, 128>::with_buffers(..)` for long text fields.
    pub fn with_buffers(config: DgusConfig, clock: C, delay: D) -> Self {
        Self {
            config,
            transport: None,
            clock,
            delay,
            handler: NoHandler,
            packet: Packet::new(),
            receiver: Receiver::new(config.sync1),
            acks: 0,
            timeouts: 0,
        }
    }
}

impl<T, C, D, H, const TX: usize, const RX: usize> Dgus<T, C, D, H, TX, RX>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
    H: FrameHandler,
{
    /// Attaches `transport`, consuming and returning the driver.
    pub fn with_transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Replaces the frame handler.
    pub fn with_handler<H2: FrameHandler>(self, handler: H2) -> Dgus<T, C, D, H2, TX, RX> {
        Dgus {
            config: self.config,
            transport: self.transport,
            clock: self.clock,
            delay: self.delay,
            handler,
            packet: self.packet,
            receiver: self.receiver,
            acks: self.acks,
            timeouts: self.timeouts,
        }
    }

    /// Attaches `transport`, returning the previous one.
    ///
    /// Any partial frame from the old transport is abandoned.
    pub fn attach(&mut self, transport: T) -> Option<T> {
        self.receiver.reset();
        self.transport.replace(transport)
    }

    /// Detaches and returns the transport.
    pub fn detach(&mut self) -> Option<T> {
        self.transport.take()
    }

    /// The attached transport.
    pub fn transport_mut(&mut self) -> Option<&mut T> {
        self.transport.as_mut()
    }

    /// The frame handler.
    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Clears the send packet and returns it for a new command.
    ///
    /// Whatever was built before is discarded.
    pub fn packet(&mut self) -> &mut Packet<TX> {
        self.packet.reset();
        &mut self.packet
    }

    /// The frame most recently assembled, until the next one starts.
    pub fn last_frame(&self) -> Option<DecodedFrame<'_>> {
        self.receiver.last_frame()
    }

    /// Where the receiver is within a frame.
    pub fn receiver_state(&self) -> RecvState {
        self.receiver.state()
    }

    /// Frames the receiver dropped for an impossible length.
    pub fn dropped_frames(&self) -> u16 {
        self.receiver.dropped
    }

    /// Sends the packet built with [`packet`](Dgus::packet) as `command`.
    ///
    /// Read commands return as soon as the frame is written. Writes wait for
    /// the display's `OK` when [`AckMode::Wait`] is configured; frames that
    /// arrive in the meantime are handed to the handler as usual.
    pub fn send(&mut self, command: Command) -> Result<(), DgusError<T::Error>> {
        let transport = self.transport.as_mut().ok_or(DgusError::NotConfigured)?;
        let wire = self.packet.finalize(command)?;
        debug!("dgus: send {:?} {:?}", command, wire);
        transport.write(wire).map_err(DgusError::Transport)?;

        if command.is_read() || self.config.ack_mode == AckMode::Disabled {
            return Ok(());
        }
        self.wait_for(|status| status == PumpStatus::Ack)
    }

    /// Sends a read command and blocks until the next frame arrives.
    ///
    /// The returned frame borrows the receive buffer. Any frame counts as the
    /// reply; there is no way to tell a reply from an unsolicited upload, so
    /// nothing else may be in flight on this connection.
    pub fn request_and_wait(
        &mut self,
        command: Command,
    ) -> Result<DecodedFrame<'_>, DgusError<T::Error>> {
        self.send(command)?;
        self.wait_for(|status| matches!(status, PumpStatus::Frame(_)))?;
        self.receiver.last_frame().ok_or(DgusError::Timeout)
    }

    /// Pumps until `done` accepts a status or the timeout expires.
    fn wait_for(&mut self, done: impl Fn(PumpStatus) -> bool) -> Result<(), DgusError<T::Error>> {
        let deadline = Deadline::after(&mut self.clock, self.config.timeout);
        loop {
            let status = self.pump()?;
            if done(status) {
                return Ok(());
            }
            if deadline.expired(&mut self.clock) {
                warn!("dgus: timed out after {} ms", self.config.timeout.as_millis());
                self.timeouts = self.timeouts.wrapping_add(1);
                return Err(DgusError::Timeout);
            }
            if status == PumpStatus::NoFrame {
                self.delay.delay_us(interval_us(self.config.poll_interval));
            }
        }
    }

    /// Reads whatever the transport has buffered, up to the end of the first
    /// complete frame.
    ///
    /// Call this from the main loop to receive touch events and VAR uploads.
    /// Acknowledgements are reported but not passed to the handler; any
    /// other frame is decoded and handed to the handler before this returns.
    /// Bytes after the completed frame stay in the transport for the next
    /// call.
    pub fn pump(&mut self) -> Result<PumpStatus, DgusError<T::Error>> {
        let transport = self.transport.as_mut().ok_or(DgusError::NotConfigured)?;

        while transport.bytes_available().map_err(DgusError::Transport)? > 0 {
            let byte = match transport.read_byte() {
                Ok(byte) => byte,
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(err)) => return Err(DgusError::Transport(err)),
            };

            let Some(info) = self.receiver.feed(byte) else {
                continue;
            };
            if info.kind == FrameKind::Ack {
                debug!("dgus: OK");
                self.acks = self.acks.wrapping_add(1);
                return Ok(PumpStatus::Ack);
            }
            if let Some(frame) = self.receiver.last_frame() {
                debug!(
                    "dgus: recv cmd {} len {} addr {} bytes {} data {:?}",
                    frame.command,
                    frame.frame_len,
                    frame.address,
                    frame.byte_len,
                    frame.data
                );
                self.handler.on_frame(&frame);
            }
            return Ok(PumpStatus::Frame(info.byte_len));
        }
        Ok(PumpStatus::NoFrame)
    }

    /// Writes `value` to the VAR at `addr`.
    ///
    /// Values up to `0xFFFF` are sent as one word; larger ones as two words
    /// starting at `addr`.
    pub fn set_var(&mut self, addr: u16, value: u32) -> Result<(), DgusError<T::Error>> {
        let p = self.packet();
        p.append_words16(&[addr])?;
        p.append_word_compact(value)?;
        self.send(Command::VariableWrite)
    }

    /// Writes raw bytes, in wire order, starting at the VAR at `addr`.
    pub fn set_var8(&mut self, addr: u16, bytes: &[u8]) -> Result<(), DgusError<T::Error>> {
        let p = self.packet();
        p.append_words16(&[addr])?;
        p.append_bytes(bytes)?;
        self.send(Command::VariableWrite)
    }

    /// Writes consecutive VAR words starting at `addr`.
    pub fn set_var16(&mut self, addr: u16, words: &[u16]) -> Result<(), DgusError<T::Error>> {
        let p = self.packet();
        p.append_words16(&[addr])?;
        p.append_words16(words)?;
        self.send(Command::VariableWrite)
    }

    /// Asks for `words` VAR words starting at `addr` without waiting.
    ///
    /// The reply is delivered to the handler by a later [`pump`](Dgus::pump).
    pub fn request_var(&mut self, addr: u16, words: u8) -> Result<(), DgusError<T::Error>> {
        let p = self.packet();
        p.append_words16(&[addr])?;
        p.append_bytes(&[words])?;
        self.send(Command::VariableRead)
    }

    /// Reads `buf.len()` VAR words starting at `addr`.
    ///
    /// Words missing from a short reply leave `buf` untouched.
    pub fn get_var(&mut self, addr: u16, buf: &mut [u16]) -> Result<(), DgusError<T::Error>> {
        let words = u8::try_from(buf.len()).map_err(|_| DgusError::CapacityExceeded)?;
        let reply = self.read_var(addr, words)?;
        for (dst, word) in buf.iter_mut().zip(reply.words()) {
            *dst = word;
        }
        Ok(())
    }

    /// Reads `buf.len()` bytes, in wire order, starting at the VAR at `addr`.
    ///
    /// An odd length reads the whole last word and drops its low byte.
    pub fn get_var8(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), DgusError<T::Error>> {
        let words = u8::try_from(buf.len().div_ceil(2)).map_err(|_| DgusError::CapacityExceeded)?;
        let reply = self.read_var(addr, words)?;
        for (dst, pair) in buf.chunks_mut(2).zip(reply.data.chunks_exact(2)) {
            let wire = [pair[1], pair[0]];
            dst.copy_from_slice(&wire[..dst.len()]);
        }
        Ok(())
    }

    fn read_var(&mut self, addr: u16, words: u8) -> Result<DecodedFrame<'_>, DgusError<T::Error>> {
        let p = self.packet();
        p.append_words16(&[addr])?;
        p.append_bytes(&[words])?;
        self.request_and_wait(Command::VariableRead)
    }

    /// Writes bytes to the control registers starting at `addr`.
    pub fn set_reg(&mut self, addr: u8, bytes: &[u8]) -> Result<(), DgusError<T::Error>> {
        let p = self.packet();
        p.append_bytes(&[addr])?;
        p.append_bytes(bytes)?;
        self.send(Command::RegisterWrite)
    }

    /// Reads `buf.len()` control register bytes starting at `addr`.
    pub fn get_reg(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), DgusError<T::Error>> {
        let len = u8::try_from(buf.len()).map_err(|_| DgusError::CapacityExceeded)?;
        let p = self.packet();
        p.append_bytes(&[addr, len])?;
        let reply = self.request_and_wait(Command::RegisterRead)?;
        let n = buf.len().min(reply.data.len());
        buf[..n].copy_from_slice(&reply.data[..n]);
        Ok(())
    }
}
