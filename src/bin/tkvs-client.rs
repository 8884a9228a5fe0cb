//! The tkvs-client executable sends one request to a running server and
//! prints the raw reply line.
//!
//! `tkvs-client "CREATE STR g hello;STR GET g" [--addr IP-PORT]`
//!
//! The positional argument is the request batch: statements separated by
//! `;`, without the trailing `|` (the client appends the terminator).
//! `--addr` accepts an IP address and port in the format IP:PORT; if not
//! specified the client connects to 127.0.0.1:1234. Prints an error and
//! returns a non-zero exit code on a connection or server failure.

use anyhow::Context;
use clap::{crate_version, App, Arg};
use std::net::SocketAddr;
use std::process::exit;
use tkvs::TkvsClient;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const DEFAULT_ADDRESS: &str = "127.0.0.1:1234";

fn main() {
    // configure a subscriber that will log messages to STDERR
    subscriber_config();

    let matches = App::new("tkvs-client")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("sends one request to a running tkvs server")
        .arg(
            Arg::with_name("REQUEST")
                .help("the request batch: statements separated by ';', no trailing '|'")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("addr")
                .long("addr")
                .value_name("IP_ADDR:PORT")
                .help("sets the IP_ADDR:PORT of the server to connect to")
                .default_value(DEFAULT_ADDRESS),
        )
        .get_matches();

    let addr = matches.value_of("addr").unwrap();
    let request = matches.value_of("REQUEST").unwrap();
    if let Err(e) = run(addr, request) {
        eprintln!("{:?}", e);
        exit(1);
    }
}

fn run(addr: &str, request: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = addr
        .parse()
        .with_context(|| format!("could not parse {} into an IP address and port", addr))?;

    let client = TkvsClient::connect(addr)
        .with_context(|| format!("could not connect to {}", addr))?;
    let reply = client.request(request).context("request failed")?;
    println!("{}", reply);
    Ok(())
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
