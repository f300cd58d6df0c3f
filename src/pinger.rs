use crate::config::PingerConfig;
use crate::icmp::v4::packet::{decode_echo_reply, encode_echo_request, IPV4_HEADER_SIZE};
use crate::icmp::v4::{PacketId, RawSocket, SequenceNumber, TSocket};
use crate::ping_error::{PingError, PingErrorKind, PingResult};
use crate::records::{OutstandingRecord, OutstandingTable};
use crate::round_summary::RoundSummary;
use crate::utils::{lookup_host_v4, unix_timestamp};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

/// Room for an IPv4 header carrying the maximum 40 bytes of options.
const IPV4_OPTIONS_SIZE: usize = 40;

/// Datagrams received back to back before sends and timeouts get a turn.
const MAX_RECEIVE_BURST: usize = 64;

type Callback = Box<dyn FnMut(&str, Option<Duration>) + Send>;

/// Pings a list of hosts in parallel over one socket.
///
/// Every call to [`Pinger::ping`] reports each host exactly once to the callback: with the
/// round trip time if a reply arrived, or with `None` after `timeout`. At most `window_limit`
/// echo requests are in flight at any time.
///
/// ```no_run
/// use pingem::{Pinger, PingerConfig};
///
/// let mut pinger = Pinger::new(PingerConfig::default())?;
/// pinger.set_callback(|host, rtt| println!("{host} {rtt:?}"));
/// pinger.add_host("127.0.0.1");
/// pinger.ping()?;
/// # Ok::<(), pingem::PingError>(())
/// ```
pub struct Pinger<S> {
    config: PingerConfig,
    socket: S,
    callback: Callback,
    hosts: Vec<String>,
    sequence_number: SequenceNumber,
    next_packet_id: PacketId,
    recv_buf: Vec<u8>,
}

/// State of the round in progress.
struct Round {
    pending: Vec<String>,
    outstanding: OutstandingTable,
    last_send_time: Option<Instant>,
    summary: RoundSummary,
}

enum Idle {
    Busy,
    Wait(Duration),
    Done,
}

impl Pinger<RawSocket> {
    /// Opens a raw ICMP socket. Fails without CAP_NET_RAW or root.
    pub fn new(config: PingerConfig) -> PingResult<Self> {
        config.validate()?;
        let socket = RawSocket::new().map_err(|e| {
            PingError::io(PingErrorKind::SocketCreate, "could not open raw ICMP socket", e)
        })?;
        Self::with_socket(config, socket)
    }
}

impl<S> Pinger<S>
where
    S: TSocket,
{
    pub fn with_socket(config: PingerConfig, socket: S) -> PingResult<Self> {
        config.validate()?;
        Ok(Pinger {
            config,
            socket,
            callback: Box::new(|_, _| {}),
            hosts: Vec::new(),
            sequence_number: SequenceNumber::default(),
            // A random start keeps ids apart from other pingers on the host.
            next_packet_id: PacketId::from(rand::random::<u16>()),
            recv_buf: vec![0u8; IPV4_HEADER_SIZE + IPV4_OPTIONS_SIZE + config.packet_size],
        })
    }

    /// Sets the function receiving `(host, rtt)`; `rtt` is `None` on timeout.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&str, Option<Duration>) + Send + 'static,
    {
        self.callback = Box::new(callback);
    }

    pub fn config(&self) -> &PingerConfig {
        &self.config
    }

    /// Adds a host name or IPv4 address. Duplicates are pinged once per occurrence.
    pub fn add_host(&mut self, host: impl Into<String>) {
        self.hosts.push(host.into());
    }

    /// Removes all hosts. Takes effect with the next call to [`Pinger::ping`].
    pub fn clear_hosts(&mut self) {
        self.hosts.clear();
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Pings every host once and blocks until each one has been reported to the callback.
    ///
    /// Send, receive and name resolution failures abort the round.
    pub fn ping(&mut self) -> PingResult<RoundSummary> {
        self.sequence_number = self.sequence_number.next();
        let mut round = Round {
            pending: self.hosts.clone(),
            outstanding: OutstandingTable::new(),
            last_send_time: None,
            summary: RoundSummary {
                sequence_number: self.sequence_number,
                ..RoundSummary::default()
            },
        };
        tracing::debug!(
            "round {} started with {} hosts",
            self.sequence_number,
            round.pending.len()
        );

        let mut burst = 0;
        loop {
            // Replies take precedence over idle work, up to a burst limit so that a flood of
            // unrelated ICMP cannot stall sends and timeouts.
            if burst < MAX_RECEIVE_BURST && self.wait_readable(Duration::ZERO)? {
                self.receive(&mut round)?;
                burst += 1;
                continue;
            }
            burst = 0;
            match self.on_idle(&mut round)? {
                Idle::Busy => {}
                Idle::Wait(duration) => {
                    self.wait_readable(duration)?;
                }
                Idle::Done => break,
            }
        }

        for record in round.outstanding.drain() {
            tracing::trace!("packet {} to {} timed out at end of round", record.id, record.host);
            round.summary.timed_out += 1;
            (self.callback)(&record.host, None);
        }
        tracing::debug!("round finished: {:?}", round.summary);
        Ok(round.summary)
    }

    fn on_idle(&mut self, round: &mut Round) -> PingResult<Idle> {
        let timeout = self.config.timeout;
        let now = Instant::now();

        if !round.pending.is_empty() {
            if round.outstanding.len() < self.config.window_limit {
                self.send_next(round)?;
                return Ok(Idle::Busy);
            }
            // The window is full: a timed out packet has to make room.
            if let Some(record) = round.outstanding.pop_oldest_expired(now, timeout) {
                tracing::debug!(
                    "packet {} to {} timed out, freeing a window slot",
                    record.id,
                    record.host
                );
                round.summary.timed_out += 1;
                (self.callback)(&record.host, None);
                return Ok(Idle::Busy);
            }
            return Ok(match round.outstanding.oldest_send_time() {
                Some(send_time) => Idle::Wait(
                    send_time
                        .checked_add(timeout)
                        .map_or(timeout, |deadline| deadline.saturating_duration_since(now)),
                ),
                None => Idle::Busy,
            });
        }

        let Some(last_send_time) = round.last_send_time else {
            return Ok(Idle::Done);
        };
        if round.outstanding.is_empty() {
            return Ok(Idle::Done);
        }
        let since_last_send = now.saturating_duration_since(last_send_time);
        if since_last_send > timeout {
            return Ok(Idle::Done);
        }
        Ok(Idle::Wait(timeout - since_last_send))
    }

    fn send_next(&mut self, round: &mut Round) -> PingResult<()> {
        let Some(host) = round.pending.pop() else {
            return Ok(());
        };
        let ip = lookup_host_v4(&host)?;

        let id = self.next_packet_id;
        self.next_packet_id = id.next();
        let timestamp = unix_timestamp();
        let packet =
            encode_echo_request(id, self.sequence_number, timestamp, self.config.packet_size)
                .map_err(|e| PingError::new(PingErrorKind::InvalidConfig, e.to_string()))?;

        let addr: socket2::SockAddr = SocketAddr::new(IpAddr::V4(ip), 0).into();
        let send_time = Instant::now();
        self.socket.send_to(&packet, &addr).map_err(|e| {
            let message = format!("could not send echo request to {host}");
            PingError::io(PingErrorKind::Send, message, e)
        })?;
        tracing::trace!("sent packet {} to {} ({})", id, host, ip);

        round.outstanding.insert(OutstandingRecord { id, host, send_time });
        round.last_send_time = Some(send_time);
        round.summary.sent += 1;
        round.summary.peak_outstanding =
            round.summary.peak_outstanding.max(round.outstanding.len());
        Ok(())
    }

    fn receive(&mut self, round: &mut Round) -> PingResult<()> {
        let (n_bytes, from) = match self.socket.recv_from(&mut self.recv_buf) {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
            Err(e) => {
                let message = "could not receive from socket";
                return Err(PingError::io(PingErrorKind::Receive, message, e));
            }
            Ok(received) => received,
        };
        let receive_time = Instant::now();

        let reply = match decode_echo_reply(&self.recv_buf[..n_bytes]) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::trace!("ignoring datagram from {}: {}", from, e);
                return Ok(());
            }
        };
        if reply.sequence != self.sequence_number {
            tracing::trace!(
                "ignoring reply from {} with stale sequence number {}",
                from,
                reply.sequence
            );
            return Ok(());
        }
        let Some(record) = round.outstanding.remove(reply.id) else {
            tracing::trace!("ignoring reply from {} for unknown packet {}", from, reply.id);
            return Ok(());
        };

        let rtt = receive_time.saturating_duration_since(record.send_time);
        tracing::trace!(
            "reply for packet {} from {} after {:?} (wire timestamp {:.6})",
            record.id,
            from,
            rtt,
            reply.timestamp
        );
        round.summary.replied += 1;
        (self.callback)(&record.host, Some(rtt));
        Ok(())
    }

    fn wait_readable(&self, timeout: Duration) -> PingResult<bool> {
        Ok(self.socket.wait_readable(timeout)?)
    }
}
