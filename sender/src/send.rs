use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::warn;

use crate::config::{SenderConfig, CONFIRMATION_MESSAGE};
use crate::spill::SpillFiles;

/// Sends one already-encoded datagram, optionally waiting for the literal
/// `"OK"` acknowledgement and retrying on timeout.
///
/// Mirrors `sendUDPmsg` in `python_poc/adapters/common_utils.py`: a fresh
/// ephemeral socket per send, a short recv timeout, up to
/// [`SenderConfig::max_resends`] retries, and a best-effort spill of the
/// payload once every try is exhausted.
pub async fn send_udp_msg(config: &SenderConfig, spill: &SpillFiles, message: &[u8]) {
    let socket = match bind_ephemeral(config).await {
        Ok(socket) => socket,
        Err(err) => {
            warn!(%err, "cannot open udp send socket");
            spill.write_data(message).await;
            return;
        }
    };

    if let Err(err) = socket.send_to(message, config.dst_addr).await {
        warn!(%err, "udp send failed");
        if config.use_confirmation {
            spill.write_data(message).await;
        }
        return;
    }

    if !config.use_confirmation {
        return;
    }

    let mut confirmed = wait_for_confirmation(&socket, config.ack_timeout).await;
    let mut tries = 1u32;
    while !confirmed && tries <= config.max_resends {
        if let Err(err) = socket.send_to(message, config.dst_addr).await {
            warn!(%err, "udp resend failed");
            break;
        }
        confirmed = wait_for_confirmation(&socket, config.ack_timeout).await;
        tries += 1;
    }

    if !confirmed {
        warn!(tries, "udp send failed after retries, spilling to disk");
        spill.write_data(message).await;
    }
}

async fn bind_ephemeral(config: &SenderConfig) -> std::io::Result<UdpSocket> {
    let bind_addr = config
        .src_addr
        .map(|a| a.to_string())
        .unwrap_or_else(|| "0.0.0.0:0".to_string());
    UdpSocket::bind(bind_addr).await
}

async fn wait_for_confirmation(socket: &UdpSocket, ack_timeout: std::time::Duration) -> bool {
    let mut buf = [0u8; CONFIRMATION_MESSAGE.len()];
    match timeout(ack_timeout, socket.recv(&mut buf)).await {
        Ok(Ok(n)) => &buf[..n] == CONFIRMATION_MESSAGE,
        Ok(Err(err)) => {
            warn!(%err, "error receiving udp confirmation");
            false
        }
        Err(_) => false,
    }
}
