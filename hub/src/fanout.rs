//! Fan-out TCP bridge client: a single persistent connection to a
//! downstream consumer, with reconnect-and-resend on failure and a
//! temporary ignore window after sustained failure. See spec §4.8 and
//! SPEC_FULL.md §16.
//!
//! Ported from `python_poc/tcp_utils.py`'s `robustSend`/`connect` pair.
//! The server half (`ThreadedTCPServer`) lives in `demos/battery-demo`, not
//! here -- spec §1 frames the fan-out consumer as an external downstream
//! program; only the client side is core.

use std::time::Duration;

use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};

use crate::types::FanoutItem;

const OK_MESSAGE: &[u8] = b"OK";
const END_LINE: &[u8] = b"END\n";

/// Bounded connection retries during [`connect`], matching the original's
/// `CONNECTION_TRIES = 10`.
const CONNECTION_TRIES: u32 = 10;
const CONNECTION_BACKOFF: Duration = Duration::from_millis(200);

/// Consecutive `robustSend` failures after which the bridge opens an
/// ignore window (spec §4.8, property 10: "M consecutive failed
/// robust-sends (M>10)").
const SUSTAINED_FAILURE_THRESHOLD: u32 = 10;
const IGNORE_WINDOW: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Serialize)]
struct WireItem {
    id: i64,
    v: serde_json::Value,
    ts: i64,
}

impl From<&FanoutItem> for WireItem {
    fn from(item: &FanoutItem) -> Self {
        let v = match item.v {
            procem_wire::Value::Double(f) => serde_json::json!(f),
            procem_wire::Value::Long(l) => serde_json::json!(l),
            procem_wire::Value::Bool(b) => serde_json::json!(b),
        };
        WireItem {
            id: item.id,
            v,
            ts: item.ts,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FanoutConfig {
    pub endpoint: std::net::SocketAddr,
    /// Socket timeout for both the connect attempt and the per-line "OK"
    /// acknowledgement wait.
    pub op_timeout: Duration,
    /// Number of `robustSend` attempts before an item is given up on.
    pub max_send_retries: u32,
}

impl FanoutConfig {
    #[must_use]
    pub fn new(endpoint: std::net::SocketAddr) -> Self {
        FanoutConfig {
            endpoint,
            op_timeout: Duration::from_millis(500),
            max_send_retries: 3,
        }
    }
}

struct Bridge {
    config: FanoutConfig,
    stream: Option<TcpStream>,
    consecutive_failures: u32,
    ignoring_until: Option<Instant>,
}

impl Bridge {
    fn new(config: FanoutConfig) -> Self {
        Bridge {
            config,
            stream: None,
            consecutive_failures: 0,
            ignoring_until: None,
        }
    }

    /// Bounded-retry connect. Leaves `self.stream` as `None` on exhaustion
    /// rather than panicking; the next `robust_send` will try again.
    async fn connect(&mut self) {
        for attempt in 1..=CONNECTION_TRIES {
            match timeout(self.config.op_timeout, TcpStream::connect(self.config.endpoint)).await {
                Ok(Ok(stream)) => {
                    self.stream = Some(stream);
                    return;
                }
                Ok(Err(err)) => {
                    debug!(attempt, %err, "fan-out connect attempt failed");
                }
                Err(_) => {
                    debug!(attempt, "fan-out connect attempt timed out");
                }
            }
            tokio::time::sleep(CONNECTION_BACKOFF).await;
        }
        warn!("fan-out bridge exhausted connection retries");
    }

    async fn send_line_and_await_ok(&mut self, line: &[u8]) -> bool {
        let Some(mut stream) = self.stream.take() else {
            return false;
        };

        let write_result = timeout(self.config.op_timeout, stream.write_all(line)).await;
        let wrote_ok = match write_result {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(%err, "fan-out write failed");
                false
            }
            Err(_) => {
                warn!("fan-out write timed out");
                false
            }
        };
        if !wrote_ok {
            return false;
        }

        let mut buf = [0u8; OK_MESSAGE.len()];
        let confirmed = match timeout(self.config.op_timeout, stream.read_exact(&mut buf)).await {
            Ok(Ok(_)) if buf == OK_MESSAGE => true,
            Ok(Ok(_)) => {
                warn!("fan-out peer replied with unexpected bytes");
                false
            }
            Ok(Err(err)) => {
                warn!(%err, "fan-out read failed");
                false
            }
            Err(_) => {
                warn!("fan-out acknowledgement timed out");
                false
            }
        };

        if confirmed {
            self.stream = Some(stream);
        }
        confirmed
    }

    /// Sends one line, reconnecting between attempts, up to
    /// `max_send_retries` times.
    async fn robust_send(&mut self, line: &[u8]) -> bool {
        for _ in 0..self.config.max_send_retries.max(1) {
            if self.stream.is_none() {
                self.connect().await;
            }
            if self.stream.is_some() && self.send_line_and_await_ok(line).await {
                self.consecutive_failures = 0;
                return true;
            }
        }
        self.consecutive_failures += 1;
        false
    }

    fn is_ignoring(&self, now: Instant) -> bool {
        self.ignoring_until.is_some_and(|until| now < until)
    }

    fn note_failure(&mut self, now: Instant) {
        if self.consecutive_failures > SUSTAINED_FAILURE_THRESHOLD {
            warn!(
                consecutive_failures = self.consecutive_failures,
                "fan-out bridge entering ignore window"
            );
            self.ignoring_until = Some(now + IGNORE_WINDOW);
        }
    }
}

/// Runs the fan-out bridge until a `None` (shutdown) sentinel arrives on
/// `fanout_rx`, at which point it sends `END` to the peer (if connected)
/// and returns.
pub async fn run(config: FanoutConfig, mut fanout_rx: mpsc::Receiver<Option<FanoutItem>>) {
    let mut bridge = Bridge::new(config);
    let mut dropped_while_ignoring = 0u64;
    let mut sent = 0u64;

    while let Some(item) = fanout_rx.recv().await {
        let Some(item) = item else { break };

        let now = Instant::now();
        if bridge.is_ignoring(now) {
            dropped_while_ignoring += 1;
            continue;
        }

        let wire = WireItem::from(&item);
        let mut line = serde_json::to_vec(&wire).expect("WireItem always serializes");
        line.push(b'\n');

        if bridge.robust_send(&line).await {
            sent += 1;
        } else {
            bridge.note_failure(Instant::now());
        }
    }

    if let Some(stream) = bridge.stream.as_mut() {
        let _ = timeout(config.op_timeout, stream.write_all(END_LINE)).await;
    }

    info!(sent, dropped_while_ignoring, "fan-out bridge shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ignore_window_opens_after_sustained_failure_and_later_resumes() {
        let mut bridge = Bridge::new(FanoutConfig::new("127.0.0.1:1".parse().unwrap()));
        bridge.consecutive_failures = SUSTAINED_FAILURE_THRESHOLD + 1;

        let start = Instant::now();
        bridge.note_failure(start);
        assert!(bridge.is_ignoring(start));

        tokio::time::advance(IGNORE_WINDOW + Duration::from_secs(1)).await;
        assert!(!bridge.is_ignoring(Instant::now()));
    }

    #[tokio::test]
    async fn ignore_window_does_not_open_below_threshold() {
        let mut bridge = Bridge::new(FanoutConfig::new("127.0.0.1:1".parse().unwrap()));
        bridge.consecutive_failures = SUSTAINED_FAILURE_THRESHOLD;
        bridge.note_failure(Instant::now());
        assert!(!bridge.is_ignoring(Instant::now()));
    }

    #[tokio::test]
    async fn robust_send_round_trip_over_loopback() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64];
            let n = stream.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"{\"id\":1}\n");
            stream.write_all(b"OK").await.unwrap();
        });

        let mut bridge = Bridge::new(FanoutConfig::new(addr));
        let ok = bridge.robust_send(b"{\"id\":1}\n").await;
        assert!(ok);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn end_to_end_shutdown_sends_end_line() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64];
            let n = stream.read(&mut buf).await.unwrap();
            assert_eq!(&buf[..n], b"{\"id\":1,\"v\":1.5,\"ts\":10}\n");
            stream.write_all(b"OK").await.unwrap();

            let mut buf2 = vec![0u8; 16];
            let n2 = stream.read(&mut buf2).await.unwrap();
            assert_eq!(&buf2[..n2], END_LINE);
        });

        let (tx, rx) = mpsc::channel(4);
        let config = FanoutConfig::new(addr);
        let task = tokio::spawn(run(config, rx));

        tx.send(Some(FanoutItem {
            id: 1,
            v: procem_wire::Value::Double(1.5),
            ts: 10,
        }))
        .await
        .unwrap();
        tx.send(None).await.unwrap();

        task.await.unwrap();
        server.await.unwrap();
    }
}
