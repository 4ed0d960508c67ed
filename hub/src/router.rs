//! UDP ingress: binds the listener socket and demultiplexes incoming
//! datagrams into the main queue (measurement data) and the query queue
//! (`get_value:` lookups). See spec §4.4.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::types::QueryItem;

const GET_VALUE_PREFIX: &[u8] = b"get_value:";
const RECV_BUF_SIZE: usize = 32 * 1024;
const QUEUE_PUSH_TIMEOUT: Duration = Duration::from_millis(50);
const OK_MESSAGE: &[u8] = b"OK";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot bind udp listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Binds the ingress socket. Split out from [`run`] so callers (e.g. the
/// query responder, which replies from the same socket) can share it.
pub async fn bind(addr: SocketAddr) -> Result<Arc<UdpSocket>, Error> {
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr, source })?;
    info!(%addr, "router ingress listening");
    Ok(Arc::new(socket))
}

/// Runs the ingress demux loop until `shutdown` fires. Pushes are
/// best-effort within [`QUEUE_PUSH_TIMEOUT`]; a full queue causes the
/// datagram to be dropped and logged rather than block the listener.
pub async fn run(
    socket: Arc<UdpSocket>,
    main_tx: mpsc::Sender<Option<Bytes>>,
    query_tx: mpsc::Sender<QueryItem>,
    use_confirmation: bool,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut buf = vec![0u8; RECV_BUF_SIZE];
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    info!("router ingress stopping");
                    return;
                }
            }
            recv = socket.recv_from(&mut buf) => {
                match recv {
                    Ok((n, from)) => {
                        handle_datagram(&socket, &buf[..n], from, &main_tx, &query_tx, use_confirmation).await;
                    }
                    Err(err) => {
                        warn!(%err, "error receiving on ingress socket");
                    }
                }
            }
        }
    }
}

async fn handle_datagram(
    socket: &UdpSocket,
    datagram: &[u8],
    from: SocketAddr,
    main_tx: &mpsc::Sender<Option<Bytes>>,
    query_tx: &mpsc::Sender<QueryItem>,
    use_confirmation: bool,
) {
    if let Some(id_bytes) = datagram.strip_prefix(GET_VALUE_PREFIX) {
        let item = QueryItem {
            id_bytes: Bytes::copy_from_slice(id_bytes),
            client_addr: from,
        };
        if tokio::time::timeout(QUEUE_PUSH_TIMEOUT, query_tx.send(item))
            .await
            .is_err()
        {
            warn!("query queue full, dropping value query");
        }
        return;
    }

    let payload = Bytes::copy_from_slice(datagram);
    let pushed = tokio::time::timeout(QUEUE_PUSH_TIMEOUT, main_tx.send(Some(payload)))
        .await
        .is_ok();

    if !pushed {
        warn!("main queue full, dropping datagram");
        return;
    }

    if use_confirmation {
        if let Err(err) = socket.send_to(OK_MESSAGE, from).await {
            debug!(%err, "failed to send ack");
        }
    }
}
