use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one [`crate::SenderHandle`].
///
/// Grounded on the constants at the top of
/// `python_poc/adapters/common_utils.py`: `SOCKET_TIMEOUT`,
/// `MAX_UDP_RESENDS`, `MIN_UDP_INTERVAL`, `USE_UDP_CONFIRMATION`,
/// `USE_FILE_BACKUP`.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Destination address for both the datagrams and the ack wait.
    pub dst_addr: SocketAddr,
    /// Source address to bind the ephemeral send socket to. `None` lets the
    /// OS pick one, matching the original's `src_ip=""` default.
    pub src_addr: Option<SocketAddr>,
    /// Whether to wait for a literal `"OK"` acknowledgement after each send.
    pub use_confirmation: bool,
    /// Timeout for the acknowledgement wait, and for the per-attempt recv.
    pub ack_timeout: Duration,
    /// Number of resend attempts after the first send fails to confirm.
    pub max_resends: u32,
    /// Minimum spacing enforced between datagrams leaving the batching
    /// worker (spec §4.2's "~10 ms").
    pub min_send_interval: Duration,
    /// Directory holding the write-side and read-side spill files.
    pub spill_dir: PathBuf,
    /// Interval between resend-loop sweeps of the spill directory.
    pub resend_interval: Duration,
    /// Bound on the batching worker's input queue.
    pub queue_capacity: usize,
}

impl SenderConfig {
    #[must_use]
    pub fn new(dst_addr: SocketAddr, spill_dir: PathBuf) -> Self {
        SenderConfig {
            dst_addr,
            src_addr: None,
            use_confirmation: true,
            ack_timeout: Duration::from_millis(500),
            max_resends: 4,
            min_send_interval: Duration::from_millis(10),
            spill_dir,
            resend_interval: Duration::from_secs(60),
            queue_capacity: 4096,
        }
    }
}

pub(crate) const CONFIRMATION_MESSAGE: &[u8] = b"OK";
