//! Encoding of ICMP echo requests and decoding of echo replies.
//!
//! Layout of the ICMP message (RFC 792), all header fields big-endian:
//!
//! ```text
//! 0       1       2               4               6               8
//! +-------+-------+---------------+---------------+---------------+
//! | type  | code  |   checksum    |  identifier   |   sequence    |
//! +-------+-------+---------------+---------------+---------------+
//! |   timestamp (f64, 8 bytes)    |   filler ...                  |
//! +-------------------------------+-------------------------------+
//! ```

use super::checksum::checksum;
use super::{PacketId, SequenceNumber};
use std::fmt;

pub const ICMP_HEADER_SIZE: usize = 8;
pub const TIMESTAMP_SIZE: usize = 8;
/// Raw IPv4 sockets deliver the IP header in front of the ICMP message.
pub const IPV4_HEADER_SIZE: usize = 20;
pub const MIN_PACKET_SIZE: usize = ICMP_HEADER_SIZE + TIMESTAMP_SIZE;
pub const MAX_PACKET_SIZE: usize = u16::MAX as usize - IPV4_HEADER_SIZE;

pub const ECHO_REPLY: u8 = 0;
pub const ECHO_REQUEST: u8 = 8;

const FILLER: u8 = b'Q';

/// The requested packet size cannot hold the ICMP header and the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketSizeError {
    pub size: usize,
}

impl fmt::Display for PacketSizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "packet size {} is outside of {MIN_PACKET_SIZE}..={MAX_PACKET_SIZE}", self.size)
    }
}

impl std::error::Error for PacketSizeError {}

/// Reasons an incoming datagram is not a usable echo reply.
///
/// Both are recoverable: the datagram is dropped and processing continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Truncated { len: usize },
    InvalidPacketType(u8),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated { len } => {
                write!(f, "datagram of {len} bytes is too short for an echo reply")
            }
            DecodeError::InvalidPacketType(icmp_type) => {
                write!(f, "ICMP type {icmp_type} is not an echo reply")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EchoReply {
    pub id: PacketId,
    pub sequence: SequenceNumber,
    /// Seconds since the Unix epoch, as written by the sender.
    pub timestamp: f64,
}

/// Builds an echo request of exactly `size` bytes, header included.
pub fn encode_echo_request(
    id: PacketId,
    sequence: SequenceNumber,
    timestamp: f64,
    size: usize,
) -> Result<Vec<u8>, PacketSizeError> {
    if !(MIN_PACKET_SIZE..=MAX_PACKET_SIZE).contains(&size) {
        return Err(PacketSizeError { size });
    }

    let mut packet = Vec::with_capacity(size);
    packet.extend_from_slice(&[ECHO_REQUEST, 0, 0, 0]);
    packet.extend_from_slice(&u16::from(id).to_be_bytes());
    packet.extend_from_slice(&u16::from(sequence).to_be_bytes());
    packet.extend_from_slice(&timestamp.to_ne_bytes());
    packet.resize(size, FILLER);

    let sum = checksum(&packet);
    packet[2..4].copy_from_slice(&sum.to_be_bytes());
    Ok(packet)
}

/// Parses an echo reply out of a datagram received on a raw IPv4 socket.
pub fn decode_echo_reply(datagram: &[u8]) -> Result<EchoReply, DecodeError> {
    let icmp = datagram
        .get(IPV4_HEADER_SIZE..)
        .filter(|icmp| icmp.len() >= ICMP_HEADER_SIZE)
        .ok_or(DecodeError::Truncated { len: datagram.len() })?;

    if icmp[0] != ECHO_REPLY {
        return Err(DecodeError::InvalidPacketType(icmp[0]));
    }
    let id = u16::from_be_bytes([icmp[4], icmp[5]]).into();
    let sequence = u16::from_be_bytes([icmp[6], icmp[7]]).into();

    let timestamp: [u8; TIMESTAMP_SIZE] = icmp
        .get(ICMP_HEADER_SIZE..MIN_PACKET_SIZE)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(DecodeError::Truncated { len: datagram.len() })?;

    Ok(EchoReply { id, sequence, timestamp: f64::from_ne_bytes(timestamp) })
}
