use std::io;
use std::net::IpAddr;
use std::time::Duration;

pub(crate) mod raw_socket;

pub trait TSocket: Send + Sync {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize>;

    /// Receives one datagram, IPv4 header included. Returns `WouldBlock` if nothing is queued.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)>;

    /// Waits up to `timeout` for the socket to become readable. A zero timeout only polls.
    fn wait_readable(&self, timeout: Duration) -> io::Result<bool>;
}
