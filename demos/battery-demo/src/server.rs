//! TCP accept loop and per-connection line handler. Mirrors
//! `tcp_utils.ThreadedTCPRequestHandler`: one task per connection, reading
//! newline-delimited JSON items, storing each, and replying `"OK"` per
//! successful line; an `"END"` line closes the connection from the peer's
//! side.

use std::net::SocketAddr;
use std::sync::Arc;

use procem_store::Store;
use procem_wire::Value;
use serde::Deserialize;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const OK_MESSAGE: &[u8] = b"OK";
const END_LINE: &str = "END";

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot bind tcp listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Deserialize)]
struct WireItem {
    id: i64,
    v: serde_json::Value,
    ts: i64,
}

/// Converts the JSON scalar `hub::fanout::WireItem::v` carries into a
/// [`procem_wire::Value`]. Integers map to `Long`, everything else
/// numeric to `Double`, matching the wire encoding in `procem_wire::codec`.
fn to_wire_value(v: &serde_json::Value) -> Option<Value> {
    match v {
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Value::Long(i))
            } else {
                n.as_f64().map(Value::Double)
            }
        }
        _ => None,
    }
}

async fn handle_connection(stream: TcpStream, peer: SocketAddr, store: Arc<Store>) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!(%peer, "connection closed by peer");
                break;
            }
            Err(err) => {
                warn!(%peer, %err, "error reading from connection");
                break;
            }
        };

        if line.is_empty() {
            continue;
        }
        if line == END_LINE {
            info!(%peer, "closing connection on END");
            break;
        }

        let item: WireItem = match serde_json::from_str(&line) {
            Ok(item) => item,
            Err(err) => {
                warn!(%peer, %err, "malformed fan-out item, dropping");
                continue;
            }
        };
        let Some(value) = to_wire_value(&item.v) else {
            warn!(%peer, id = item.id, "fan-out item has unsupported value type, dropping");
            continue;
        };
        store.add_value(item.id, value, item.ts);

        if writer.write_all(OK_MESSAGE).await.is_err() {
            warn!(%peer, "failed to send acknowledgement, closing connection");
            break;
        }
    }
}

/// Binds `addr` and accepts connections until `shutdown` fires, spawning
/// one handler task per connection.
pub async fn run(addr: SocketAddr, store: Arc<Store>, mut shutdown: watch::Receiver<bool>) -> Result<(), Error> {
    let listener = TcpListener::bind(addr).await.map_err(|source| Error::Bind { addr, source })?;
    info!(%addr, "battery demo tcp server listening");

    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "accepted connection");
                        let store = Arc::clone(&store);
                        connections.spawn(handle_connection(stream, peer, store));
                    }
                    Err(err) => warn!(%err, "failed to accept connection"),
                }
            }
        }
    }

    while connections.join_next().await.is_some() {}
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpStream as ClientStream;

    #[test]
    fn converts_scalars() {
        assert_eq!(to_wire_value(&serde_json::json!(true)), Some(Value::Bool(true)));
        assert_eq!(to_wire_value(&serde_json::json!(42)), Some(Value::Long(42)));
        assert_eq!(to_wire_value(&serde_json::json!(1.5)), Some(Value::Double(1.5)));
        assert_eq!(to_wire_value(&serde_json::json!("text")), None);
    }

    #[tokio::test]
    async fn stores_items_and_acks_then_closes_on_end() {
        let store = Arc::new(Store::new(10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let store_clone = Arc::clone(&store);
        let server = tokio::spawn(run(addr, store_clone, shutdown_rx));
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let mut client = ClientStream::connect(addr).await.unwrap();
        client.write_all(b"{\"id\":7,\"v\":1.5,\"ts\":100}\n").await.unwrap();
        let mut buf = [0u8; 2];
        client.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, OK_MESSAGE);

        client.write_all(b"END\n").await.unwrap();
        drop(client);

        assert_eq!(store.get_values(7, None).unwrap()[0].v, Value::Double(1.5));

        let _ = shutdown_tx.send(true);
        server.await.unwrap().unwrap();
    }
}
