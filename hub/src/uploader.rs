//! IoT-Ticket uploader: adaptive batching scheduler, bounded worker pool,
//! packet chunking, retry with jitter, and cycling of records that survive
//! an exhausted retry. See spec §4.7 and SPEC_FULL.md §15.
//!
//! The upstream cloud service's wire contract is abstracted behind
//! [`IotTicketClient`] so the scheduler and worker can be exercised against
//! a mock in tests -- the shape of the service itself is out of scope
//! (spec §1). [`ReqwestIotTicketClient`] is the production implementation,
//! grounded on `lading`'s choice of `reqwest` for outbound HTTP
//! (`lading/Cargo.toml`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use procem_wire::{Record, TicketRecord};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{Config, UploadProtocol};
use crate::types::UploadItem;

/// Records re-enqueued after an exhausted retry are sent back onto the
/// upload queue in small groups rather than all at once, so cycling one
/// large failed batch does not monopolise the queue (spec §4.7 step 6).
const CYCLE_BATCH_SIZE: usize = 10;

/// Classification of one chunk's outcome from a single upload attempt.
/// Every chunk in a session gets exactly one outcome, even when the
/// underlying transport failed outright (that case collapses to
/// [`ChunkOutcome::Failure`]) -- this keeps the worker's retry loop
/// protocol-agnostic: the "old" (per-packet-index) vs "new"
/// (per-device-path) accounting split (spec §9) happens inside the
/// concrete [`IotTicketClient`], which maps whatever the cloud actually
/// returned onto this uniform shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// HTTP 200/201 and the written count matches the chunk size.
    Success { written: usize },
    /// Written count is positive but short of the chunk size.
    Partial { written: usize },
    /// Authorisation-kind failure (e.g. IoT-Ticket code 8001).
    AuthFailure,
    /// Any other failure, or no response at all.
    Failure,
}

/// The uploader's seam onto the cloud time-series service.
#[async_trait]
pub trait IotTicketClient: Send + Sync {
    /// Sends one session containing every chunk in `chunks`, in order, and
    /// returns exactly one [`ChunkOutcome`] per chunk in the same order.
    async fn write_chunks(
        &self,
        device_id: &str,
        protocol: UploadProtocol,
        chunks: &[Vec<TicketRecord>],
    ) -> Vec<ChunkOutcome>;
}

/// `reqwest`-backed [`IotTicketClient`] for production use.
pub struct ReqwestIotTicketClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl ReqwestIotTicketClient {
    #[must_use]
    pub fn new(base_url: String, username: String, password: String) -> Self {
        ReqwestIotTicketClient {
            http: reqwest::Client::new(),
            base_url,
            username,
            password,
        }
    }
}

#[derive(serde::Deserialize)]
struct WriteResult {
    path: String,
    written: usize,
    expected: usize,
    #[serde(default)]
    code: Option<u32>,
}

/// IoT-Ticket's documented authorisation-failure code.
const AUTH_FAILURE_CODE: u32 = 8001;

#[async_trait]
impl IotTicketClient for ReqwestIotTicketClient {
    async fn write_chunks(
        &self,
        device_id: &str,
        protocol: UploadProtocol,
        chunks: &[Vec<TicketRecord>],
    ) -> Vec<ChunkOutcome> {
        let url = format!("{}/{}/data", self.base_url.trim_end_matches('/'), device_id);
        let body = serde_json::json!({ "data": chunks });

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&body)
            .send()
            .await;

        let response = match response {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!(status = %r.status(), "iot-ticket upload rejected");
                return vec![ChunkOutcome::Failure; chunks.len()];
            }
            Err(err) => {
                warn!(%err, "iot-ticket upload request failed");
                return vec![ChunkOutcome::Failure; chunks.len()];
            }
        };

        let results: Vec<WriteResult> = match response.json().await {
            Ok(results) => results,
            Err(err) => {
                warn!(%err, "iot-ticket upload response did not parse");
                return vec![ChunkOutcome::Failure; chunks.len()];
            }
        };

        match protocol {
            UploadProtocol::Old => outcomes_by_index(chunks, &results),
            UploadProtocol::New => outcomes_by_path(chunks, &results),
        }
    }
}

fn outcome_for(written: usize, expected: usize, code: Option<u32>) -> ChunkOutcome {
    if code == Some(AUTH_FAILURE_CODE) {
        ChunkOutcome::AuthFailure
    } else if written >= expected && expected > 0 {
        ChunkOutcome::Success { written }
    } else if written > 0 {
        ChunkOutcome::Partial { written }
    } else {
        ChunkOutcome::Failure
    }
}

/// "Old" protocol: the cloud's response is positional, one result per
/// packet index, mirroring `iotticket_utils.py::getResponceInfo`.
fn outcomes_by_index(chunks: &[Vec<TicketRecord>], results: &[WriteResult]) -> Vec<ChunkOutcome> {
    chunks
        .iter()
        .enumerate()
        .map(|(idx, chunk)| match results.get(idx) {
            Some(r) => outcome_for(r.written, chunk.len(), r.code),
            None => ChunkOutcome::Failure,
        })
        .collect()
}

/// "New" protocol: the cloud's response is keyed by target device path,
/// mirroring `procem_rtl.py::cycleBadPacketsNew`. A chunk's outcome is the
/// worst outcome among the paths its records touch.
fn outcomes_by_path(chunks: &[Vec<TicketRecord>], results: &[WriteResult]) -> Vec<ChunkOutcome> {
    use std::collections::HashMap;
    let by_path: HashMap<&str, &WriteResult> =
        results.iter().map(|r| (r.path.as_str(), r)).collect();

    chunks
        .iter()
        .map(|chunk| {
            let mut worst = ChunkOutcome::Success { written: chunk.len() };
            for record in chunk {
                let outcome = match by_path.get(record.path.as_str()) {
                    Some(r) => outcome_for(r.written, r.expected, r.code),
                    None => ChunkOutcome::Failure,
                };
                worst = worse_of(worst, outcome);
            }
            worst
        })
        .collect()
}

fn worse_of(a: ChunkOutcome, b: ChunkOutcome) -> ChunkOutcome {
    fn rank(o: ChunkOutcome) -> u8 {
        match o {
            ChunkOutcome::Success { .. } => 0,
            ChunkOutcome::Partial { .. } => 1,
            ChunkOutcome::AuthFailure => 2,
            ChunkOutcome::Failure => 3,
        }
    }
    if rank(b) >= rank(a) {
        b
    } else {
        a
    }
}

/// Configuration the scheduler and worker need, distilled from
/// [`crate::config::Config`].
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    pub device_id: String,
    pub protocol: UploadProtocol,
    pub buffer_size_min: usize,
    pub max_packet_size: usize,
    pub min_delay: Duration,
    pub max_retries: u32,
    pub max_cycles: u32,
    pub permitted_workers: usize,
    /// Minimum spacing enforced between worker dispatches.
    pub dispatch_min_interval: Duration,
    /// Idle time on the upload queue before the scheduler flushes a
    /// non-empty buffer below target (spec §4.7 "~30 s idle").
    pub queue_idle_timeout: Duration,
}

impl UploaderConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        UploaderConfig {
            device_id: config.deviceid.clone(),
            protocol: config.iotticket_version,
            buffer_size_min: config.iotticket_buffer_size.max(1),
            max_packet_size: config.iotticket_max_packet_size.max(1),
            min_delay: Duration::from_secs_f64(config.iotticket_minimum_delay_s.max(0.0)),
            max_retries: config.iotticket_maximum_retries.max(1),
            max_cycles: config.iotticket_max_data_cycles,
            permitted_workers: config.procem_iotticket_workers.max(1),
            dispatch_min_interval: Duration::from_millis(100),
            queue_idle_timeout: Duration::from_secs(30),
        }
    }

    fn max_buffer(&self) -> usize {
        self.max_packet_size.saturating_mul(1000).max(self.buffer_size_min)
    }
}

/// What the scheduler should do after appending an item to the buffer.
/// Pure and deterministic so the adaptive batching state machine (spec §9
/// "keep it deterministic under mocked time for testing") is unit-testable
/// without driving real timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppendAction {
    KeepBuffering,
    Dispatch,
    GrowTarget(usize),
}

fn decide_on_append(
    buffer_len: usize,
    target: usize,
    active_workers: usize,
    permitted_workers: usize,
    buffer_min: usize,
    max_buffer: usize,
) -> AppendAction {
    if buffer_len < target {
        return AppendAction::KeepBuffering;
    }
    if active_workers >= permitted_workers {
        let grown = (target + buffer_min).min(max_buffer);
        if grown == target {
            AppendAction::KeepBuffering
        } else {
            AppendAction::GrowTarget(grown)
        }
    } else {
        AppendAction::Dispatch
    }
}

/// Periodic re-evaluation: halve the target when fewer than half the
/// permitted workers are active. Returns `None` when the target is
/// unchanged.
fn decide_shrink(active_workers: usize, permitted_workers: usize, target: usize) -> Option<usize> {
    if active_workers * 2 < permitted_workers {
        let shrunk = (target / 2).max(1);
        (shrunk != target).then_some(shrunk)
    } else {
        None
    }
}

/// The wall delay before retry attempt `try_idx` (1-based; only called for
/// `try_idx >= 2`), per spec §4.7 step 3: `try × min_delay × uniform(1,2) +
/// extra_wait`. `jitter` is the caller-supplied `uniform(1,2)` sample so the
/// formula itself stays pure and testable.
fn retry_delay(try_idx: u32, min_delay: Duration, jitter: f64, extra_wait: Duration) -> Duration {
    min_delay.mul_f64(f64::from(try_idx) * jitter) + extra_wait
}

/// Runs the uploader scheduler until a `None` (shutdown) sentinel arrives
/// on `upload_rx`. Dispatches workers onto an internal [`JoinSet`] and,
/// before returning, waits for every in-flight worker to finish (spec §5
/// "The uploader scheduler explicitly waits for all in-flight workers
/// before returning").
pub async fn run(
    config: UploaderConfig,
    client: Arc<dyn IotTicketClient>,
    mut upload_rx: mpsc::Receiver<Option<UploadItem>>,
    recycle_tx: mpsc::Sender<Option<UploadItem>>,
) {
    let permitted = config.permitted_workers;
    let buffer_min = config.buffer_size_min;
    let max_buffer = config.max_buffer();
    let mut target = buffer_min;

    let mut buffer: Vec<UploadItem> = Vec::new();
    let active = Arc::new(AtomicUsize::new(0));
    let mut workers: JoinSet<usize> = JoinSet::new();
    let mut dispatch_throttle = procem_throttle::Throttle::new(config.dispatch_min_interval);

    let resize_period = (config.dispatch_min_interval.mul_f64(0.9)).max(Duration::from_millis(1));
    let mut resize_timer = tokio::time::interval(resize_period);
    resize_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut shutting_down = false;
    let mut total_dispatched = 0u64;

    loop {
        if shutting_down && workers.is_empty() && buffer.is_empty() {
            break;
        }

        tokio::select! {
            biased;

            Some(joined) = workers.join_next(), if !workers.is_empty() => {
                active.fetch_sub(1, Ordering::SeqCst);
                match joined {
                    Ok(written) => debug!(written, "uploader worker finished"),
                    Err(err) => warn!(%err, "uploader worker task panicked"),
                }
            }

            _ = resize_timer.tick() => {
                if let Some(new_target) = decide_shrink(active.load(Ordering::SeqCst), permitted, target) {
                    debug!(old = target, new = new_target, "uploader shrinking batch target");
                    target = new_target;
                }
            }

            received = tokio::time::timeout(config.queue_idle_timeout, upload_rx.recv()), if !shutting_down => {
                match received {
                    Ok(Some(Some(item))) => {
                        buffer.push(item);
                        let active_now = active.load(Ordering::SeqCst);
                        match decide_on_append(buffer.len(), target, active_now, permitted, buffer_min, max_buffer) {
                            AppendAction::KeepBuffering => {}
                            AppendAction::GrowTarget(new_target) => {
                                debug!(old = target, new = new_target, "uploader growing batch target");
                                target = new_target;
                            }
                            AppendAction::Dispatch => {
                                dispatch_throttle.wait().await;
                                total_dispatched += buffer.len() as u64;
                                dispatch_worker(&mut buffer, &mut workers, &active, &config, &client, &recycle_tx);
                            }
                        }
                    }
                    Ok(Some(None)) => {
                        shutting_down = true;
                    }
                    Ok(None) => {
                        shutting_down = true;
                    }
                    Err(_elapsed) => {
                        if !buffer.is_empty() {
                            total_dispatched += buffer.len() as u64;
                            dispatch_worker(&mut buffer, &mut workers, &active, &config, &client, &recycle_tx);
                        }
                    }
                }
            }
        }

        if shutting_down && !buffer.is_empty() {
            total_dispatched += buffer.len() as u64;
            dispatch_worker(&mut buffer, &mut workers, &active, &config, &client, &recycle_tx);
        }
    }

    info!(total_dispatched, "uploader scheduler shutting down, all workers joined");
}

fn dispatch_worker(
    buffer: &mut Vec<UploadItem>,
    workers: &mut JoinSet<usize>,
    active: &Arc<AtomicUsize>,
    config: &UploaderConfig,
    client: &Arc<dyn IotTicketClient>,
    recycle_tx: &mpsc::Sender<Option<UploadItem>>,
) {
    let items = std::mem::take(buffer);
    if items.is_empty() {
        return;
    }
    active.fetch_add(1, Ordering::SeqCst);

    let device_id = config.device_id.clone();
    let protocol = config.protocol;
    let client = Arc::clone(client);
    let max_packet_size = config.max_packet_size;
    let min_delay = config.min_delay;
    let max_retries = config.max_retries;
    let max_cycles = config.max_cycles;
    let recycle_tx = recycle_tx.clone();

    workers.spawn(async move {
        run_worker(
            items,
            device_id,
            protocol,
            client,
            max_packet_size,
            min_delay,
            max_retries,
            max_cycles,
            recycle_tx,
        )
        .await
    });
}

/// One upload attempt cycle for a single dispatched buffer. See spec §4.7
/// "Worker".
async fn run_worker(
    mut items: Vec<UploadItem>,
    device_id: String,
    protocol: UploadProtocol,
    client: Arc<dyn IotTicketClient>,
    max_packet_size: usize,
    min_delay: Duration,
    max_retries: u32,
    max_cycles: u32,
    recycle_tx: mpsc::Sender<Option<UploadItem>>,
) -> usize {
    // Records with `secret=true` are filtered out at the uploader's
    // boundary -- they are still persisted to the day log upstream, just
    // never transmitted to the cloud. See spec §4.7 "Secrecy".
    items.retain(|item| {
        if item.record.secret {
            debug!(id = item.record.id, "not uploading secret record");
        }
        !item.record.secret
    });
    if items.is_empty() {
        return 0;
    }

    items.sort_by(|a, b| sort_key(&a.record).cmp(&sort_key(&b.record)));

    let chunks: Vec<Vec<UploadItem>> = items
        .chunks(max_packet_size)
        .map(<[UploadItem]>::to_vec)
        .collect();
    let mut considered: Vec<usize> = (0..chunks.len()).collect();
    let mut written_total = 0usize;
    let mut extra_wait = Duration::ZERO;
    let mut rng = rand::thread_rng();
    let mut tries_used = 0u32;

    for try_idx in 1..=max_retries {
        tries_used = try_idx;
        if try_idx > 1 {
            let jitter = rng.gen_range(1.0..2.0);
            let delay = retry_delay(try_idx - 1, min_delay, jitter, extra_wait);
            tokio::time::sleep(delay).await;
        }

        let ticket_chunks: Vec<Vec<TicketRecord>> = considered
            .iter()
            .map(|&idx| chunks[idx].iter().map(|it| TicketRecord::from(&it.record)).collect())
            .collect();

        let outcomes = client.write_chunks(&device_id, protocol, &ticket_chunks).await;

        let mut still_considered = Vec::new();
        for (pos, &chunk_idx) in considered.iter().enumerate() {
            match outcomes.get(pos).copied().unwrap_or(ChunkOutcome::Failure) {
                ChunkOutcome::Success { written } => {
                    written_total += written;
                }
                ChunkOutcome::Partial { written } => {
                    warn!(
                        chunk = chunk_idx,
                        written,
                        expected = chunks[chunk_idx].len(),
                        "iot-ticket upload partially written"
                    );
                    written_total += written;
                }
                ChunkOutcome::AuthFailure => {
                    extra_wait = Duration::from_secs(2);
                    still_considered.push(chunk_idx);
                }
                ChunkOutcome::Failure => {
                    still_considered.push(chunk_idx);
                }
            }
        }
        considered = still_considered;
        if considered.is_empty() {
            break;
        }
    }

    let mut cycled = 0usize;
    let mut dropped = 0usize;
    if !considered.is_empty() {
        let mut to_cycle = Vec::new();
        for idx in &considered {
            for item in &chunks[*idx] {
                let next_cycle = item.cycle + 1;
                if next_cycle > max_cycles {
                    dropped += 1;
                    debug!(id = item.record.id, cycle = next_cycle, "dropping record past max cycles");
                    continue;
                }
                to_cycle.push(UploadItem {
                    device_id: item.device_id.clone(),
                    record: item.record.clone(),
                    cycle: next_cycle,
                });
            }
        }
        for group in to_cycle.chunks(CYCLE_BATCH_SIZE) {
            for item in group {
                if recycle_tx.send(Some(item.clone())).await.is_err() {
                    break;
                }
                cycled += 1;
            }
            tokio::task::yield_now().await;
        }
    }

    info!(
        written = written_total,
        total = items.len(),
        cycled,
        dropped,
        tries = tries_used,
        "upload batch complete"
    );
    written_total
}

fn sort_key(record: &Record) -> (&str, &str, i64) {
    (record.path.as_str(), record.name.as_str(), record.ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use procem_wire::Value;

    fn record(id: i64, secret: bool) -> Record {
        Record {
            name: "p".into(),
            path: "/a".into(),
            value: Value::Double(1.0),
            ts: id,
            unit: "u".into(),
            id,
            secret,
        }
    }

    #[test]
    fn retry_delay_grows_at_least_linearly_in_try() {
        let min_delay = Duration::from_millis(100);
        let at_k1 = retry_delay(1, min_delay, 1.0, Duration::ZERO);
        let at_k2 = retry_delay(2, min_delay, 1.0, Duration::ZERO);
        assert_eq!(at_k1, Duration::from_millis(100));
        assert_eq!(at_k2, Duration::from_millis(200));
        assert!(at_k2 >= at_k1 * 2 || at_k2 >= Duration::from_millis(200));
    }

    #[test]
    fn retry_delay_includes_extra_wait() {
        let delay = retry_delay(1, Duration::from_millis(100), 1.0, Duration::from_secs(2));
        assert_eq!(delay, Duration::from_millis(2100));
    }

    #[test]
    fn append_keeps_buffering_below_target() {
        assert_eq!(decide_on_append(3, 5, 0, 10, 50, 5000), AppendAction::KeepBuffering);
    }

    #[test]
    fn append_dispatches_when_target_reached_and_slot_free() {
        assert_eq!(decide_on_append(5, 5, 2, 10, 50, 5000), AppendAction::Dispatch);
    }

    #[test]
    fn append_grows_target_when_workers_saturated() {
        assert_eq!(
            decide_on_append(5, 5, 10, 10, 50, 5000),
            AppendAction::GrowTarget(55)
        );
    }

    #[test]
    fn append_grow_is_capped_at_max_buffer() {
        assert_eq!(decide_on_append(5000, 5000, 10, 10, 50, 5000), AppendAction::KeepBuffering);
    }

    #[test]
    fn shrink_halves_target_when_few_workers_active() {
        assert_eq!(decide_shrink(1, 10, 100), Some(50));
    }

    #[test]
    fn shrink_floors_at_one() {
        assert_eq!(decide_shrink(0, 10, 1), None);
    }

    #[test]
    fn shrink_does_nothing_when_enough_workers_active() {
        assert_eq!(decide_shrink(8, 10, 100), None);
    }

    struct StubClient {
        outcomes: Vec<ChunkOutcome>,
    }

    #[async_trait]
    impl IotTicketClient for StubClient {
        async fn write_chunks(
            &self,
            _device_id: &str,
            _protocol: UploadProtocol,
            chunks: &[Vec<TicketRecord>],
        ) -> Vec<ChunkOutcome> {
            self.outcomes.iter().copied().take(chunks.len()).collect()
        }
    }

    #[tokio::test]
    async fn secret_records_are_never_transmitted() {
        let client = Arc::new(StubClient {
            outcomes: vec![ChunkOutcome::Success { written: 1 }],
        });
        let (recycle_tx, _recycle_rx) = mpsc::channel(8);
        let items = vec![UploadItem {
            device_id: "dev".into(),
            record: record(1, true),
            cycle: 0,
        }];
        let written = run_worker(
            items,
            "dev".into(),
            UploadProtocol::New,
            client,
            500,
            Duration::from_millis(1),
            5,
            5,
            recycle_tx,
        )
        .await;
        assert_eq!(written, 0);
    }

    #[tokio::test]
    async fn scenario_s6_cycles_failed_chunks_with_incremented_hop_count() {
        // 7 records, packet size 3 -> chunks of [3, 3, 1]; chunk 0 succeeds,
        // chunks 1 and 2 fail on every retry.
        let client = Arc::new(StubClient {
            outcomes: vec![
                ChunkOutcome::Success { written: 3 },
                ChunkOutcome::Failure,
                ChunkOutcome::Failure,
            ],
        });
        let (recycle_tx, mut recycle_rx) = mpsc::channel(16);
        let items: Vec<UploadItem> = (0..7)
            .map(|id| UploadItem {
                device_id: "dev".into(),
                record: record(id, false),
                cycle: 0,
            })
            .collect();

        let written = run_worker(
            items,
            "dev".into(),
            UploadProtocol::Old,
            client,
            3,
            Duration::from_millis(1),
            2,
            3,
            recycle_tx,
        )
        .await;
        recycle_rx.close();
        assert_eq!(written, 3);

        let mut cycled = Vec::new();
        while let Ok(Some(item)) = recycle_rx.try_recv() {
            cycled.push(item);
        }
        assert_eq!(cycled.len(), 4);
        assert!(cycled.iter().all(|i| i.cycle == 1));
    }

    #[tokio::test]
    async fn records_past_max_cycles_are_dropped_not_cycled() {
        let client = Arc::new(StubClient {
            outcomes: vec![ChunkOutcome::Failure],
        });
        let (recycle_tx, mut recycle_rx) = mpsc::channel(8);
        let items = vec![UploadItem {
            device_id: "dev".into(),
            record: record(1, false),
            cycle: 5,
        }];
        let written = run_worker(
            items,
            "dev".into(),
            UploadProtocol::New,
            client,
            500,
            Duration::from_millis(1),
            1,
            5,
            recycle_tx,
        )
        .await;
        assert_eq!(written, 0);
        recycle_rx.close();
        assert!(recycle_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn accounting_never_exceeds_input_batch_size() {
        let client = Arc::new(StubClient {
            outcomes: vec![ChunkOutcome::Partial { written: 1 }, ChunkOutcome::Failure],
        });
        let (recycle_tx, mut recycle_rx) = mpsc::channel(16);
        let items: Vec<UploadItem> = (0..6)
            .map(|id| UploadItem {
                device_id: "dev".into(),
                record: record(id, false),
                cycle: 0,
            })
            .collect();
        let input_len = items.len();

        let written = run_worker(
            items,
            "dev".into(),
            UploadProtocol::Old,
            client,
            3,
            Duration::from_millis(1),
            1,
            5,
            recycle_tx,
        )
        .await;

        recycle_rx.close();
        let mut cycled = 0usize;
        while let Ok(Some(_item)) = recycle_rx.try_recv() {
            cycled += 1;
        }
        assert!(written + cycled <= input_len);
    }
}
