//! End-to-end loopback tests for the batching worker, ack/retry, and spill
//! path (spec §4.2).

use std::time::Duration;

use bytes::Bytes;
use tokio::net::UdpSocket;

use procem_sender::{SenderConfig, SenderHandle};

#[tokio::test]
async fn confirmed_send_leaves_nothing_spilled() {
    let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let server_addr = server.local_addr().unwrap();

    let spill_dir = tempfile::tempdir().unwrap();
    let mut config = SenderConfig::new(server_addr, spill_dir.path().to_path_buf());
    config.resend_interval = Duration::from_secs(3600);
    let handle = SenderHandle::spawn(config);

    let responder = tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let (n, from) = server.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"hello\n");
        server.send_to(b"OK", from).await.unwrap();
    });

    handle.enqueue(Bytes::from_static(b"hello\n")).await.unwrap();
    handle.flush().await.unwrap();
    responder.await.unwrap();
    handle.shutdown().await;

    let spilled = spill_dir.path().join("failed_udp_data_sends.txt");
    assert!(!spilled.exists());
}

#[tokio::test]
async fn unconfirmed_send_is_spilled_after_retries() {
    // nothing is listening on this address, so every ack wait times out.
    let dead_socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead_socket.local_addr().unwrap();
    drop(dead_socket);

    let spill_dir = tempfile::tempdir().unwrap();
    let mut config = SenderConfig::new(dead_addr, spill_dir.path().to_path_buf());
    config.ack_timeout = Duration::from_millis(20);
    config.max_resends = 1;
    config.resend_interval = Duration::from_secs(3600);
    let handle = SenderHandle::spawn(config);

    handle.enqueue(Bytes::from_static(b"nobody-home\n")).await.unwrap();
    handle.flush().await.unwrap();
    handle.shutdown().await;

    let spilled = spill_dir.path().join("failed_udp_data_sends.txt");
    let contents = tokio::fs::read_to_string(&spilled).await.unwrap();
    assert!(contents.contains("nobody-home"));
}
