//! Thin demo binary: reads newline-delimited datagrams from stdin and feeds
//! them through [`procem_sender::SenderHandle`], so the spill/resend
//! machinery can be exercised without the rest of the hub.

use std::io::IsTerminal;
use std::net::SocketAddr;
use std::path::PathBuf;

use bytes::Bytes;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use procem_sender::{SenderConfig, SenderHandle};

#[derive(Parser, Debug)]
#[command(about = "Feeds stdin lines to the reliable UDP sender")]
struct Args {
    /// Destination address, e.g. 127.0.0.1:6666
    #[arg(long, default_value = "127.0.0.1:6666")]
    dst: SocketAddr,

    /// Directory for the write-side and read-side spill files.
    #[arg(long, default_value = "./spill")]
    spill_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    std::fs::create_dir_all(&args.spill_dir).expect("cannot create spill directory");

    let config = SenderConfig::new(args.dst, args.spill_dir);
    let handle = SenderHandle::spawn(config);

    if std::io::stdin().is_terminal() {
        tracing::info!("reading datagrams from stdin, one per line; Ctrl-D to stop");
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if line.is_empty() {
            continue;
        }
        let mut payload = line.into_bytes();
        payload.push(b'\n');
        if handle.enqueue(Bytes::from(payload)).await.is_err() {
            break;
        }
    }

    handle.shutdown().await;
}
