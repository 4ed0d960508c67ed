//! Shared item types flowing through the router's internal queues.

use std::net::SocketAddr;

use bytes::Bytes;
use procem_wire::Record;

/// One item on the storage-writer queue: every record validated from a
/// single inbound datagram, tagged with the configured IoT-Ticket device
/// id this hub instance uploads under.
#[derive(Debug, Clone)]
pub struct StorageBatch {
    pub device_id: String,
    pub records: Vec<Record>,
}

/// One item on the upload queue. `cycle` is the cycling hop count (spec
/// §4.7/§9 "Cycling"): it starts at 0 and increments each time the record
/// survives an exhausted retry and is re-enqueued.
#[derive(Debug, Clone)]
pub struct UploadItem {
    pub device_id: String,
    pub record: Record,
    pub cycle: u32,
}

/// A value-query arriving on the ingress socket: `get_value:<id>` with the
/// client address to reply to.
#[derive(Debug, Clone)]
pub struct QueryItem {
    pub id_bytes: Bytes,
    pub client_addr: SocketAddr,
}

/// A line destined for the fan-out TCP bridge.
#[derive(Debug, Clone)]
pub struct FanoutItem {
    pub id: i64,
    pub v: procem_wire::Value,
    pub ts: i64,
}
