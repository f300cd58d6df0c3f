use pingem::{Pinger, PingerConfig};
use std::time::Duration;

type GenericError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(argh::FromArgs)]
/// pingem - ping many hosts in parallel (needs CAP_NET_RAW or root)
struct Args {
    #[argh(option, short = 't', default = "1000")]
    /// milliseconds to wait for a reply
    timeout: u64,

    #[argh(option, short = 'w', default = "1000")]
    /// maximum number of echo requests in flight
    window: usize,

    #[argh(option, short = 's', default = "64")]
    /// ICMP packet size in bytes, header included
    size: usize,

    #[argh(option, short = 'c', default = "1")]
    /// number of rounds
    count: u16,

    #[argh(switch, short = 'v')]
    /// log every packet
    verbose: bool,

    #[argh(positional)]
    /// host names or IPv4 addresses
    hosts: Vec<String>,
}

fn main() -> Result<(), GenericError> {
    let args: Args = argh::from_env();

    let level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = PingerConfig {
        timeout: Duration::from_millis(args.timeout),
        window_limit: args.window,
        packet_size: args.size,
    };
    let mut pinger = Pinger::new(config)?;
    pinger.set_callback(|host, rtt| match rtt {
        Some(rtt) => println!("{host} {:.3} ms", rtt.as_secs_f64() * 1000.0),
        None => println!("{host} timeout"),
    });
    for host in args.hosts {
        pinger.add_host(host);
    }

    for _ in 0..args.count {
        let summary = pinger.ping()?;
        println!(
            "--- round {}: {} sent, {} replied, {} timed out",
            summary.sequence_number, summary.sent, summary.replied, summary.timed_out
        );
    }

    Ok(())
}
