use crate::icmp::v4::packet::{MAX_PACKET_SIZE, MIN_PACKET_SIZE};
use crate::ping_error::{PingError, PingErrorKind, PingResult};
use std::time::Duration;

/// Number of distinct ICMP identifiers; more packets in flight would reuse an id.
const MAX_WINDOW_LIMIT: usize = 1 << 16;

/// Longest accepted reply timeout, one day.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingerConfig {
    /// How long to wait for a reply before reporting a host as timed out.
    pub timeout: Duration,
    /// Maximum number of echo requests in flight at once.
    pub window_limit: usize,
    /// Total ICMP packet size in bytes, header included.
    pub packet_size: usize,
}

impl Default for PingerConfig {
    fn default() -> Self {
        PingerConfig {
            timeout: Duration::from_secs(1),
            window_limit: 1000,
            packet_size: 64,
        }
    }
}

impl PingerConfig {
    pub fn validate(&self) -> PingResult<()> {
        if self.timeout.is_zero() || self.timeout > MAX_TIMEOUT {
            return Err(PingError::new(
                PingErrorKind::InvalidConfig,
                format!("timeout {:?} is outside of (0s, {MAX_TIMEOUT:?}]", self.timeout),
            ));
        }
        if !(1..=MAX_WINDOW_LIMIT).contains(&self.window_limit) {
            return Err(PingError::new(
                PingErrorKind::InvalidConfig,
                format!(
                    "window limit {} is outside of 1..={MAX_WINDOW_LIMIT}",
                    self.window_limit
                ),
            ));
        }
        if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&self.packet_size) {
            return Err(PingError::new(
                PingErrorKind::InvalidConfig,
                format!(
                    "packet size {} is outside of {MIN_PACKET_SIZE}..={MAX_PACKET_SIZE}",
                    self.packet_size
                ),
            ));
        }
        Ok(())
    }
}
