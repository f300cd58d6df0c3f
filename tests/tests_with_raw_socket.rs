use pingem::{PingErrorKind, Pinger, PingerConfig};
use std::sync::{Arc, Mutex, Once};
use std::time::{Duration, Instant};

use more_asserts as ma;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/*
* Note: Raw sockets work only with root privileges or CAP_NET_RAW. Without them every test
* returns early.
*/

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::ERROR).finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("setting default subscriber failed");
    });
}

type Replies = Arc<Mutex<Vec<(String, Option<Duration>)>>>;

fn create_pinger(timeout: Duration) -> Option<(Pinger<pingem::RawSocket>, Replies)> {
    setup();
    let config = PingerConfig { timeout, ..PingerConfig::default() };
    let mut pinger = match Pinger::new(config) {
        Ok(pinger) => pinger,
        Err(e) if e.kind == PingErrorKind::SocketCreate => {
            eprintln!("skipping: {e}");
            return None;
        }
        Err(e) => panic!("unexpected error: {e}"),
    };
    let replies: Replies = Arc::new(Mutex::new(Vec::new()));
    let sink = replies.clone();
    pinger.set_callback(move |host, rtt| sink.lock().unwrap().push((host.to_owned(), rtt)));
    Some((pinger, replies))
}

#[test]
fn ping_localhost_reports_rtt() {
    let Some((mut pinger, replies)) = create_pinger(Duration::from_secs(1)) else {
        return;
    };
    pinger.add_host("127.0.0.1");

    pinger.ping().unwrap();

    let replies = replies.lock().unwrap();
    assert_eq!(1, replies.len());
    assert_eq!("127.0.0.1", replies[0].0);
    ma::assert_ge!(replies[0].1.expect("no reply from localhost"), Duration::ZERO);
}

#[test]
fn ping_unroutable_address_times_out() {
    let Some((mut pinger, replies)) = create_pinger(Duration::from_millis(100)) else {
        return;
    };
    // TEST-NET-1, reserved for documentation.
    pinger.add_host("192.0.2.1");

    let start = Instant::now();
    let result = pinger.ping();

    // Hosts without a route may refuse the send outright.
    if let Err(e) = result {
        assert_eq!(PingErrorKind::Send, e.kind);
        return;
    }
    ma::assert_ge!(start.elapsed(), Duration::from_millis(100));
    assert_eq!(vec![("192.0.2.1".to_owned(), None)], *replies.lock().unwrap());
}

#[test]
fn ping_many_loopback_addresses() {
    let Some((mut pinger, replies)) = create_pinger(Duration::from_secs(1)) else {
        return;
    };
    for i in 1..=200 {
        pinger.add_host(format!("127.0.{}.{}", i / 250, i % 250 + 1));
    }

    let summary = pinger.ping().unwrap();

    assert_eq!(200, summary.sent);
    assert_eq!(200, replies.lock().unwrap().len());
    assert!(replies.lock().unwrap().iter().all(|(_, rtt)| rtt.is_some()));
}

#[test]
fn second_round_reuses_hosts() {
    let Some((mut pinger, replies)) = create_pinger(Duration::from_secs(1)) else {
        return;
    };
    pinger.add_host("127.0.0.1");
    pinger.ping().unwrap();
    replies.lock().unwrap().clear();

    pinger.ping().unwrap();

    assert_eq!(1, replies.lock().unwrap().len());
    assert!(replies.lock().unwrap()[0].1.is_some());
}

#[test]
fn cleared_hosts_are_not_pinged() {
    let Some((mut pinger, replies)) = create_pinger(Duration::from_millis(100)) else {
        return;
    };
    pinger.add_host("127.0.0.1");
    pinger.clear_hosts();

    pinger.ping().unwrap();

    assert!(replies.lock().unwrap().is_empty());
}
