//! Error types returned by the driver.

use core::fmt::Debug;

/// A write would run past the end of a fixed-size buffer.
///
/// Returned by the [`Packet`](crate::packet::Packet) encoders. Nothing is
/// written when this is returned.
#[derive(PartialEq, Eq, Clone, Copy, Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[error("buffer capacity exceeded")]
pub struct CapacityExceeded;

/// Errors raised by the [`CurveBuffer`](crate::curve::CurveBuffer).
#[derive(PartialEq, Eq, Clone, Copy, Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum CurveError {
    /// The channel was never initialised on this buffer.
    #[error("curve channel {0} was not initialised")]
    ChannelNotFound(u8),
    /// The channel (or the channel table) has no room left.
    #[error("curve buffer is full")]
    BufferFull,
}

/// Everything that can go wrong talking to the display.
///
/// `E` is the error type of the [`Transport`](crate::transport::Transport).
#[derive(PartialEq, Eq, Clone, Copy, Debug, thiserror::Error)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DgusError<E: Debug> {
    /// No acknowledgement or reply arrived within the configured timeout.
    #[error("timed out waiting for the display")]
    Timeout,
    /// Encoding the command would overflow the send packet.
    #[error("buffer capacity exceeded")]
    CapacityExceeded,
    /// The curve channel was never initialised.
    #[error("curve channel {0} was not initialised")]
    ChannelNotFound(u8),
    /// A curve channel has no room for more points.
    #[error("curve buffer is full")]
    BufferFull,
    /// No transport is attached to the driver.
    #[error("no transport attached")]
    NotConfigured,
    /// The transport itself failed.
    #[error("transport error: {0:?}")]
    Transport(E),
}

impl<E: Debug> From<CapacityExceeded> for DgusError<E> {
    fn from(_: CapacityExceeded) -> Self {
        DgusError::CapacityExceeded
    }
}

impl<E: Debug> From<CurveError> for DgusError<E> {
    fn from(err: CurveError) -> Self {
        match err {
            CurveError::ChannelNotFound(id) => DgusError::ChannelNotFound(id),
            CurveError::BufferFull => DgusError::BufferFull,
        }
    }
}
