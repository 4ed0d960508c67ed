use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use procem_throttle::Throttle;
use procem_wire::MAX_DATAGRAM_BYTES;
use tokio::sync::mpsc;

use crate::config::SenderConfig;
use crate::send::send_udp_msg;
use crate::spill::SpillFiles;

/// The batching worker loop. Mirrors `procemSendWorker` in
/// `python_poc/adapters/common_utils.py`: `Some(empty)` is the "flush now"
/// sentinel (`clear_item=bytes()` in the original), `None` is shutdown.
pub(crate) async fn batching_worker(
    config: SenderConfig,
    spill: Arc<SpillFiles>,
    mut rx: mpsc::Receiver<Option<Bytes>>,
) {
    let mut buffer = BytesMut::new();
    let mut throttle = Throttle::new(config.min_send_interval);

    while let Some(item) = rx.recv().await {
        let Some(packet) = item else {
            if !buffer.is_empty() {
                send_udp_msg(&config, &spill, &buffer).await;
            }
            return;
        };

        if packet.is_empty() {
            if !buffer.is_empty() {
                throttle.wait().await;
                send_udp_msg(&config, &spill, &buffer).await;
                buffer.clear();
            }
            continue;
        }

        if buffer.len() + packet.len() > MAX_DATAGRAM_BYTES {
            throttle.wait().await;
            send_udp_msg(&config, &spill, &buffer).await;
            buffer.clear();
            buffer.extend_from_slice(&packet);
        } else {
            buffer.extend_from_slice(&packet);
        }
    }

    if !buffer.is_empty() {
        throttle.wait().await;
        send_udp_msg(&config, &spill, &buffer).await;
    }
}

/// The resend sweep loop. Processes any pre-existing read-side spill file
/// once at startup, then re-sweeps the write-side file every
/// [`SenderConfig::resend_interval`].
pub(crate) async fn resend_loop(
    config: SenderConfig,
    spill: Arc<SpillFiles>,
    tx: mpsc::Sender<Option<Bytes>>,
) {
    let reinjected = spill.resend_sweep(&tx).await;
    if reinjected > 0 {
        tracing::info!(reinjected, "re-injected spilled datagrams at startup");
    }

    loop {
        tokio::time::sleep(config.resend_interval).await;
        let reinjected = spill.resend_sweep(&tx).await;
        if reinjected > 0 {
            tracing::info!(reinjected, "re-injected spilled datagrams");
        }
    }
}
