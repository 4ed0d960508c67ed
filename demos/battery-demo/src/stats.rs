//! Periodic per-id summary printer. Ported from `tcp_demo.py`'s
//! `printHandler`: every `interval`, prints count/average/max/latest for
//! every id currently tracked by the store.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use procem_store::Store;
use procem_wire::Value;
use tracing::info;

fn as_f64(v: Value) -> Option<f64> {
    match v {
        Value::Double(v) => Some(v),
        Value::Long(v) => Some(v as f64),
        Value::Bool(_) => None,
    }
}

/// Runs the summary loop forever, sleeping `interval` between rounds.
/// Pure formatting is pulled out into [`summarize_id`] so it's testable
/// without driving real time.
pub async fn run(store: Arc<Store>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        for id in store.get_ids() {
            let Some(values) = store.get_values(id, None) else { continue };
            if values.is_empty() {
                continue;
            }
            if let Some(summary) = summarize_id(id, &values) {
                info!(
                    id = summary.id,
                    total = summary.total,
                    avg = summary.avg,
                    max = summary.max,
                    latest = summary.latest,
                    latest_time = %summary.latest_time,
                    "battery demo id summary"
                );
            }
        }
    }
}

struct IdSummary {
    id: i64,
    total: usize,
    avg: f64,
    max: f64,
    latest: f64,
    latest_time: String,
}

/// Computes one id's summary line from its stored values. Returns `None`
/// if every value is non-numeric (e.g. all booleans), matching the
/// original's `{:>6.3f}` formatting which assumes a numeric value.
fn summarize_id(id: i64, values: &[procem_store::ValueTs]) -> Option<IdSummary> {
    let numeric: Vec<f64> = values.iter().filter_map(|entry| as_f64(entry.v)).collect();
    if numeric.is_empty() {
        return None;
    }

    let avg = numeric.iter().sum::<f64>() / numeric.len() as f64;
    let max = numeric.iter().cloned().fold(f64::MIN, f64::max);
    let last = values.last()?;
    let latest = as_f64(last.v)?;
    let latest_time = Local
        .timestamp_millis_opt(last.ts)
        .single()
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "??:??:??".to_string());

    Some(IdSummary {
        id,
        total: values.len(),
        avg: (avg * 1000.0).round() / 1000.0,
        max: (max * 1000.0).round() / 1000.0,
        latest: (latest * 1000.0).round() / 1000.0,
        latest_time,
    })
}
