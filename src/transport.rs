//! The byte pipe between the driver and the display.
//!
//! The driver owns no I/O. Anything that can report how many bytes are
//! waiting, hand them over one at a time, and write a buffer can carry DGUS
//! frames: a UART peripheral, a USB CDC port, a `serialport` handle on a host,
//! or a scripted mock in a test.
//!
//! ## Example
//!
//! ```rust
//! use dgus::transport::Transport;
//! use core::convert::Infallible;
//! use std::collections::VecDeque;
//!
//! struct Loopback(VecDeque<u8>);
//!
//! impl Transport for Loopback {
//!     type Error = Infallible;
//!
//!     fn bytes_available(&mut self) -> Result<usize, Self::Error> {
//!         Ok(self.0.len())
//!     }
//!
//!     fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
//!         self.0.pop_front().ok_or(nb::Error::WouldBlock)
//!     }
//!
//!     fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
//!         self.0.extend(bytes);
//!         Ok(())
//!     }
//! }
//! ```

use core::fmt::Debug;

/// Serial transport used by [`Dgus`](crate::driver::Dgus).
pub trait Transport {
    /// Error reported by the underlying port.
    type Error: Debug;

    /// Number of received bytes ready to be read.
    ///
    /// Ports that cannot tell may return `1` while data is pending and rely on
    /// [`read_byte`](Transport::read_byte) returning `WouldBlock` once it runs
    /// dry.
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Reads one byte.
    ///
    /// `WouldBlock` means nothing is left; the driver stops pumping and tries
    /// again on the next poll.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Writes the whole buffer.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn bytes_available(&mut self) -> Result<usize, Self::Error> {
        (**self).bytes_available()
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }
}
