//! this binary starts the tkvs server
//!
//! `tkvs-server <CONFIG>`
//!
//! The single positional argument is the path to a `key=value` configuration
//! file. The server restores the snapshot named there (if one exists), starts
//! the periodic dump schedule, and serves until killed. Exit code is 0 on a
//! clean shutdown and non-zero on a startup or fatal runtime error.

use anyhow::Context;
use clap::{crate_version, App, Arg};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use std::process::exit;
use std::sync::Arc;
use std::time::Duration;
use tkvs::thread_pool::{SharedQueueThreadPool, ThreadPool};
use tkvs::{snapshot, Config, Stores, TkvsServer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // set up a tracing subscriber to log to STDERR
    subscriber_config();

    // parse command line args
    let matches = App::new("tkvs-server")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("a multi-threaded, multi-datatype key-value store")
        .arg(
            Arg::with_name("CONFIG")
                .help("path to the key=value configuration file")
                .required(true)
                .index(1),
        )
        .get_matches();

    let config_path = matches.value_of("CONFIG").unwrap();
    if let Err(e) = run(Path::new(config_path)) {
        eprintln!("{:?}", e);
        exit(1);
    }
}

fn run(config_path: &Path) -> anyhow::Result<()> {
    info!("tkvs-server {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load(config_path)
        .with_context(|| format!("could not load configuration from {:?}", config_path))?;
    info!(
        "port={} thread_count={} persistence_file={:?} dump_period={}s",
        config.port, config.thread_count, config.persistence_file, config.dump_period_secs
    );
    if config.persistence_file == config_path {
        warn!(
            "persistence_file {:?} is the configuration file itself; dumps will overwrite it",
            config.persistence_file
        );
    }

    let stores = Arc::new(Stores::new());
    snapshot::load(&stores, &config.persistence_file).context("could not restore the snapshot")?;

    tkvs::spawn_dump_schedule(
        Arc::clone(&stores),
        config.persistence_file.clone(),
        Duration::from_secs(config.dump_period_secs),
    );

    let pool = SharedQueueThreadPool::new(config.thread_count)
        .context("could not start the worker pool")?;
    let server = TkvsServer::new(stores, pool);
    let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port);
    server.run(addr).context("server stopped")?;
    Ok(())
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config() {
    let subscriber = FmtSubscriber::builder()
        // all spans/events with a level higher than DEBUG (e.g, info, warn, etc.)
        // will be logged
        .with_max_level(Level::DEBUG)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        // completes the builder.
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting tracing default subscriber failed");
}
