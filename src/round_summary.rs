use crate::icmp::v4::SequenceNumber;

/// Counters describing one completed call to [`Pinger::ping`](crate::Pinger::ping).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub sequence_number: SequenceNumber,
    pub sent: usize,
    pub replied: usize,
    pub timed_out: usize,
    /// Highest number of echo requests that were in flight at the same time.
    pub peak_outstanding: usize,
}
