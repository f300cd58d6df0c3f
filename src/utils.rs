use crate::ping_error::{PingError, PingErrorKind};
use std::net::{IpAddr, Ipv4Addr};
use std::result::Result;
use std::time::{SystemTime, UNIX_EPOCH};

/// Resolves `host` to an IPv4 address. Dotted-quad literals skip the resolver.
pub(crate) fn lookup_host_v4(host: &str) -> Result<Ipv4Addr, PingError> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    let ips: Vec<IpAddr> = dns_lookup::lookup_host(host).map_err(|e| {
        PingError::io(PingErrorKind::Resolve, format!("could not resolve {host}"), e)
    })?;
    ips.into_iter()
        .find_map(|ip| match ip {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| {
            PingError::new(PingErrorKind::Resolve, format!("could not resolve {host} to IPv4"))
        })
}

/// Wall-clock time in seconds since the Unix epoch, as carried in echo request payloads.
pub(crate) fn unix_timestamp() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0.0, |elapsed| elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ipv4_literal() {
        assert_eq!(Ipv4Addr::new(192, 0, 2, 7), lookup_host_v4("192.0.2.7").unwrap());
    }

    #[test]
    fn test_lookup_host() {
        let ip = lookup_host_v4("localhost").unwrap();

        assert_eq!(ip, Ipv4Addr::new(127, 0, 0, 1));
    }

    #[test]
    fn test_unix_timestamp_is_after_2020() {
        more_asserts::assert_gt!(unix_timestamp(), 1_577_836_800.0);
    }
}
