//! Latest-value query responder. Consumes the query queue populated by
//! the router ingress and answers each with up to the configured number
//! of most recent `(value, timestamp)` pairs for one id. See spec §4.9.

use std::sync::Arc;

use procem_store::Store;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::QueryItem;

/// Separator joining `id`, then `v1;ts1;v2;ts2;...` in the reply datagram.
const SEPARATOR: &str = ";";

/// Formats the reply for one lookup. A `None` history (unknown id) or a
/// malformed id yields an empty string, per spec §4.9 "Malformed queries
/// get an empty reply."
#[must_use]
fn format_reply(id: i64, store: &Store, present_value_count: usize) -> String {
    let Some(values) = store.get_values(id, Some(present_value_count)) else {
        return String::new();
    };

    let mut parts = vec![id.to_string()];
    for entry in values {
        parts.push(entry.v.to_string());
        parts.push(entry.ts.to_string());
    }
    parts.join(SEPARATOR)
}

/// Runs the query responder until `query_rx` closes. Each item carries the
/// reply destination; malformed id bytes get an empty reply rather than
/// being dropped silently, matching spec §4.9.
pub async fn run(
    socket: Arc<UdpSocket>,
    store: Arc<Store>,
    present_value_count: usize,
    mut query_rx: mpsc::Receiver<QueryItem>,
) {
    while let Some(item) = query_rx.recv().await {
        let reply = match std::str::from_utf8(&item.id_bytes).ok().and_then(|s| s.parse::<i64>().ok()) {
            Some(id) => format_reply(id, &store, present_value_count),
            None => {
                debug!("malformed value query id");
                String::new()
            }
        };

        if let Err(err) = socket.send_to(reply.as_bytes(), item.client_addr).await {
            warn!(%err, addr = %item.client_addr, "failed to send value query reply");
        }
    }
}
