use super::TSocket;
use nix::sys::select::{select, FdSet};
use nix::sys::time::{TimeVal, TimeValLike};
use socket2::{Domain, Protocol, Type};
use std::io;
use std::mem::MaybeUninit;
use std::net::IpAddr;
use std::os::fd::AsFd;
use std::time::Duration;

/// Longest single `select` wait; callers loop and wait again.
const MAX_SELECT_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Non-blocking raw IPv4 socket for ICMP. Opening it needs CAP_NET_RAW or root.
pub struct RawSocket {
    socket: socket2::Socket,
}

impl RawSocket {
    pub fn new() -> Result<Self, io::Error> {
        tracing::trace!("creating RawSocket");
        let socket = socket2::Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4))?;
        socket.set_nonblocking(true)?;
        Ok(RawSocket { socket })
    }
}

impl TSocket for RawSocket {
    fn send_to(&self, buf: &[u8], addr: &socket2::SockAddr) -> io::Result<usize> {
        self.socket.send_to(buf, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, IpAddr)> {
        // Socket2 guarantees it never writes uninitialised bytes into the buffer, so viewing
        // the initialised `&mut [u8]` as `&mut [MaybeUninit<u8>]` is sound.
        // https://docs.rs/socket2/0.5/socket2/struct.Socket.html#method.recv
        let uninit = unsafe { &mut *(buf as *mut [u8] as *mut [MaybeUninit<u8>]) };
        let (n_bytes, socket_addr) = self.socket.recv_from(uninit)?;
        let ip = socket_addr.as_socket().map(|addr| addr.ip()).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "received from non-IP address")
        })?;
        Ok((n_bytes, ip))
    }

    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let mut read = FdSet::new();
        read.insert(self.socket.as_fd());
        let mut timeout = select_timeout(timeout);
        match select(None, Some(&mut read), None, None, Some(&mut timeout)) {
            Ok(readable) => Ok(readable == 1),
            Err(nix::Error::EINTR) => Ok(false),
            Err(err) => Err(io::Error::from(err)),
        }
    }
}

/// Rounds `timeout` up to whole microseconds, capped at [`MAX_SELECT_TIMEOUT`].
fn select_timeout(timeout: Duration) -> TimeVal {
    let micros = timeout.min(MAX_SELECT_TIMEOUT).as_nanos().div_ceil(1000);
    TimeVal::microseconds(i64::try_from(micros).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_timeout_rounds_up_to_microseconds() {
        assert_eq!(TimeVal::microseconds(0), select_timeout(Duration::ZERO));
        assert_eq!(TimeVal::microseconds(1), select_timeout(Duration::from_nanos(1)));
        assert_eq!(TimeVal::microseconds(1_500), select_timeout(Duration::from_micros(1_500)));
    }

    #[test]
    fn select_timeout_is_capped() {
        let capped = TimeVal::seconds(24 * 60 * 60);
        assert_eq!(capped, select_timeout(Duration::MAX));
        assert_eq!(capped, select_timeout(MAX_SELECT_TIMEOUT + Duration::from_secs(1)));
    }
}
