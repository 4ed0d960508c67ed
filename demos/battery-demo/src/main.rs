//! Battery demo binary: a standalone consumer for `hub::fanout`'s TCP
//! bridge. Accepts the bridge's connection, stores every item, and prints
//! a periodic per-id summary. See SPEC_FULL.md §16 and `python_poc/tcp_demo.py`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use procem_store::Store;
use tokio::sync::watch;
use tracing::info;

/// Per-id history cap. The original's `VALUE_LIMIT = 86400` keeps a full
/// day of one-second samples; kept as-is since the demo has the same
/// purpose.
const VALUE_LIMIT: usize = 86_400;

/// Interval between printed summaries, matching the original's
/// `TIME_INTERVAL = 900.0` (15 minutes).
const SUMMARY_INTERVAL: Duration = Duration::from_secs(900);

#[derive(Parser, Debug)]
#[command(about = "Standalone TCP fan-out consumer demo for the Procem telemetry hub")]
struct Args {
    /// Address to listen for the fan-out bridge's connection on.
    #[arg(long, default_value = "127.0.0.1:7777")]
    listen_addr: SocketAddr,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let store = Arc::new(Store::new(VALUE_LIMIT));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let stats_task = tokio::spawn(battery_demo::stats::run(Arc::clone(&store), SUMMARY_INTERVAL));
    let server_task = tokio::spawn(battery_demo::server::run(args.listen_addr, store, shutdown_rx));

    tokio::signal::ctrl_c().await.ok();
    info!("received interrupt, shutting down");
    let _ = shutdown_tx.send(true);

    let _ = server_task.await;
    stats_task.abort();
}
