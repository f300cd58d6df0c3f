pub mod checksum;
pub mod packet;

mod packet_id;
pub use packet_id::PacketId;

mod sequence_number;
pub use sequence_number::SequenceNumber;

mod socket;
pub use socket::raw_socket::RawSocket;
pub use socket::TSocket;

#[cfg(test)]
pub(crate) use socket::tests;
