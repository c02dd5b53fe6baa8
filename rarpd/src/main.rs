mod channel;
mod config;
mod dispatcher;
mod errors;
mod interface;
mod mapping;

use channel::PacketChannel;
use config::Config;
use dispatcher::{Dispatcher, ServerIdentity};
use errors::Error;
use mapping::MappingTable;
use std::process;
use tracing::{debug, error, info, span, warn, Level};

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
}

/// Starts the server and runs it until the socket fails. Any startup problem ends the run before
/// a single frame is read.
fn run(config: &Config) -> Result<(), Error> {
    let iface = interface::resolve(&config.interface)?;
    let server_ip = interface::first_ipv4(&config.interface)?;
    let table = MappingTable::parse(&config.mapping)?;
    let mut channel = PacketChannel::open(&iface)?;

    info!(
        "RARP server on {} (MAC {}, IP {}) listening for requests...",
        iface.name, iface.mac, server_ip
    );
    if table.is_empty() {
        warn!("no mappings configured, requests will go unanswered");
    } else {
        info!("{} mapping(s) loaded", table.len());
    }
    for (mac, ip) in table.iter() {
        debug!("mapping {} -> {}", mac, ip);
    }

    let dispatcher = Dispatcher::new(
        ServerIdentity {
            mac: iface.mac,
            ip: server_ip,
        },
        table,
    );

    span!(Level::INFO, "rarpd", interface = %iface.name)
        .in_scope(|| Err(dispatcher.serve(&mut channel).into()))
}

fn main() {
    let config = Config::from_args();
    init_logging(config.verbose);

    if let Err(e) = run(&config) {
        error!("{}", e);
        process::exit(1);
    }
}
