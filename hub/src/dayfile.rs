//! Rolling day-log file writer. See spec §4.6.
//!
//! Appends every validated record as `id\tv\tts\n` to a per-local-day file
//! and rolls over at local midnight, writing the outgoing day's per-id
//! count file on rollover. Owned by exactly one task (spec §5 "Shared
//! resources": "the day-log file handle is owned by exactly one task").
//! Ported from `procemDBWorker` / `writeDataCounterToFile` in
//! `python_poc/procem_rtl.py`.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rustc_hash::FxHashMap;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::types::StorageBatch;

fn day_log_name(date: NaiveDate) -> String {
    format!("{}_procem.csv", date.format("%Y-%m-%d"))
}

fn counter_name(date: NaiveDate) -> String {
    format!("{}_data_counter.csv", date.format("%Y-%m-%d"))
}

async fn open_day_log(dir: &Path, date: NaiveDate) -> std::io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(day_log_name(date)))
        .await
}

/// Appends the sorted `(id, count)` rows for one day to its counter file.
/// Tolerates being called more than once for the same day (spec §4.6: "the
/// counter file format tolerates multiple appends for the same day").
async fn flush_counter_file(dir: &Path, date: NaiveDate, counts: &FxHashMap<i64, u64>) {
    if counts.is_empty() {
        return;
    }

    let mut ids: Vec<i64> = counts.keys().copied().collect();
    ids.sort_unstable();

    let mut buf = String::new();
    for id in ids {
        buf.push_str(&format!("{id}\t{}\n", counts[&id]));
    }

    let path = dir.join(counter_name(date));
    let result = async {
        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
        file.write_all(buf.as_bytes()).await
    }
    .await;

    if let Err(err) = result {
        warn!(path = %path.display(), %err, "cannot write counter file");
    }
}

struct OpenDay {
    date: NaiveDate,
    file: Option<File>,
    counts: FxHashMap<i64, u64>,
}

impl OpenDay {
    async fn open(dir: &Path, date: NaiveDate) -> Self {
        let file = match open_day_log(dir, date).await {
            Ok(file) => Some(file),
            Err(err) => {
                warn!(%err, date = %date, "cannot open day-log file");
                None
            }
        };
        OpenDay {
            date,
            file,
            counts: FxHashMap::default(),
        }
    }
}

/// Runs the rolling file writer until a `None` (shutdown) sentinel arrives
/// on `rx`. `today` returns the current local calendar date and is a plain
/// parameter (rather than a direct `chrono::Local::now()` call) so tests
/// can drive day rollover deterministically (SPEC_FULL.md §19).
pub async fn run(
    dir: PathBuf,
    mut rx: mpsc::Receiver<Option<StorageBatch>>,
    today: impl Fn() -> NaiveDate + Send + Sync + 'static,
) {
    if let Err(err) = fs::create_dir_all(&dir).await {
        warn!(dir = %dir.display(), %err, "cannot create day-log directory");
    }

    let mut open = OpenDay::open(&dir, today()).await;
    let mut total_rows = 0u64;

    while let Some(item) = rx.recv().await {
        let Some(batch) = item else { break };

        for record in &batch.records {
            let now = today();
            if now != open.date {
                flush_counter_file(&dir, open.date, &open.counts).await;
                info!(date = %open.date, "day-log rolled over");
                open = OpenDay::open(&dir, now).await;
            }

            let Some(file) = open.file.as_mut() else {
                continue;
            };

            let row = format!("{}\t{}\t{}\n", record.id, record.value, record.ts);
            if let Err(err) = file.write_all(row.as_bytes()).await {
                warn!(%err, "cannot write day-log row");
                continue;
            }

            *open.counts.entry(record.id).or_insert(0) += 1;
            total_rows += 1;
        }
    }

    flush_counter_file(&dir, open.date, &open.counts).await;
    info!(total_rows, "day-log writer shutting down");
}
