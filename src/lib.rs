//! # dgus
//!
//! A portable, no_std Rust driver for DWIN DGUS II serial smart displays
//! (T5L based HMI panels), talking the display's `5A A5` framed UART protocol.
//!
//! This driver implements the host side of the protocol using:
//! - a [`Transport`] trait for whatever carries the bytes (UART, USB CDC, a mock)
//! - `embedded-hal` `DelayNs` and a monotonic [`Clock`] for bounded waits
//! - fixed-size, const-generic send and receive buffers, no allocation
//! - a connection object ([`Dgus`]) instead of global state, so several
//!   displays can be driven at once
//!
//! ## Crate features
//! | Feature     | Description |
//! |-------------|-------------|
//! | `std`       | Host [`timer::StdClock`]/[`timer::StdDelay`] and `std::error::Error` impls |
//! | `log`       | Uses `log` logging |
//! | `defmt-0-3` | Uses `defmt` logging |
//!
//! ## Protocol Features
//!
//! - **Frame codec**: big-endian typed appends into a bounded [`Packet`]
//! - **Receiver**: byte-at-a-time state machine that resynchronises on garbage
//! - **ACK correlation**: writes wait for the display's `OK`, bounded by a
//!   wall-clock timeout
//! - **Synchronous reads** of VAR words and REG bytes
//! - **Helpers** for pages, icons, sound, backlight, reset, trend curves and
//!   text controls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dgus::decode::DecodedFrame;
//! use dgus::driver::{Dgus, DgusConfig};
//! use dgus::timer::{StdClock, StdDelay};
//!
//! let mut lcd = Dgus::new(DgusConfig::default(), StdClock::new(), StdDelay)
//!     .with_transport(uart)
//!     .with_handler(|frame: &DecodedFrame<'_>| {
//!         // touch events and VAR auto-uploads
//!     });
//!
//! lcd.set_page(1)?;
//! let page = lcd.page()?;
//! loop {
//!     lcd.pump()?;
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - The display's ACK setting must match [`driver::AckMode`]; a mismatch
//!   makes every write time out
//! - One request may be outstanding per connection; the next frame is taken
//!   as its reply
//! - The default buffers hold 32 payload bytes each; raise the const generics
//!   on [`Dgus`] for longer text or curve batches

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
mod fmt;

pub use heapless;

pub mod command;
pub mod consts;
pub mod curve;
pub mod decode;
pub mod driver;
pub mod error;
pub mod packet;
pub mod receiver;
pub mod reg;
pub mod system;
pub mod text;
pub mod timer;
pub mod transport;

#[cfg(test)]
mod testutil;

pub use command::Command;
pub use decode::{DecodedFrame, FrameKind};
pub use driver::{AckMode, Dgus, DgusConfig, FrameHandler, PumpStatus};
pub use error::DgusError;
pub use packet::Packet;
pub use receiver::{Receiver, Sync1Policy};
pub use timer::Clock;
pub use transport::Transport;
