//! Ping many hosts in parallel over a single raw ICMP socket.
//!
//! A [`Pinger`] sends one echo request per host and reports the round trip time, or a timeout,
//! through a callback. At most [`PingerConfig::window_limit`] requests are in flight at any time.
#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub use config::PingerConfig;
pub use icmp::v4::{PacketId, RawSocket, SequenceNumber, TSocket};
pub use ping_error::{PingError, PingErrorKind, PingResult};
pub use pinger::Pinger;
pub use round_summary::RoundSummary;

pub mod icmp;

mod config;
mod ping_error;
mod pinger;
mod records;
mod round_summary;
mod utils;
