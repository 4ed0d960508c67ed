//! The daily backup state machine. See spec.md §4.10 and
//! `python_poc/backup_procem_data.py`'s `backup_worker` loop, re-expressed
//! as one `run_cycle` call per day rather than an infinite `while True`
//! so the scheduling loop (in `main.rs`) and the state machine itself are
//! independently testable.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use crate::compaction;
use crate::config::Config;
use crate::naming;
use crate::tools::BackupTools;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to list directory {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Compaction(#[from] compaction::Error),
    #[error(transparent)]
    Tools(#[from] crate::tools::Error),
}

/// One dated artifact found on disk, with the path it was found at.
struct Found {
    date: NaiveDate,
    path: PathBuf,
}

async fn list_matching(dir: &Path, matches: impl Fn(&str) -> bool) -> Result<Vec<Found>, Error> {
    let mut out = Vec::new();
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(source) => {
            return Err(Error::ListDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    while let Some(entry) = entries.next_entry().await.map_err(|source| Error::ListDir {
        path: dir.to_path_buf(),
        source,
    })? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if !matches(name) {
            continue;
        }
        if let Some(date) = naming::date_from_name(name) {
            out.push(Found {
                date,
                path: entry.path(),
            });
        }
    }
    Ok(out)
}

fn within_window(date: NaiveDate, today: NaiveDate, days: i64) -> bool {
    let age = (today - date).num_days();
    (0..=days).contains(&age)
}

/// Summary of one cycle, logged by the caller as a single structured
/// line (spec §7 "periodic summary lines ... from the backup pipeline on
/// each transition").
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub compressed: usize,
    pub counters_compacted: usize,
    pub local_copied: usize,
    pub local_failed: usize,
    pub remote_copied: usize,
    pub remote_failed: usize,
    pub purged_cwd: usize,
    pub purged_local: usize,
}

/// Runs one full backup cycle over `config.source_dir`, as of local date
/// `today`. Mirrors `backup_worker`'s single loop body (spec §4.10 steps
/// 1-5); the caller is responsible for step 6 (sleeping until the next
/// scheduled hour).
pub async fn run_cycle(config: &Config, tools: &dyn BackupTools, today: NaiveDate) -> Result<CycleReport, Error> {
    let mut report = CycleReport::default();
    let ext = &config.compressed_file_extension;

    // Step 1: compress every day-log that isn't today's.
    let day_logs = list_matching(&config.source_dir, |name| name.ends_with("_procem.csv")).await?;
    for found in &day_logs {
        if found.date == today {
            continue;
        }
        let compressed_path = config.source_dir.join(naming::compressed_name(found.date, ext));
        match tools.compress(&found.path, &compressed_path).await? {
            true => {
                info!(path = %found.path.display(), "compressed day log");
                report.compressed += 1;
                tools.remove(&found.path).await?;
            }
            false => warn!(path = %found.path.display(), "day log compression failed or unconfirmed"),
        }
    }

    // Step 2: compact every counter file, regardless of date.
    let counters = list_matching(&config.source_dir, |name| name.ends_with("_data_counter.csv")).await?;
    for found in &counters {
        if compaction::compact_counter_file(&found.path, &config.counter_delimiter).await? {
            report.counters_compacted += 1;
        }
    }

    // Step 3: copy compressed day-logs and counter files to the local archive.
    let compressed_files = list_matching(&config.source_dir, |name| name.ends_with(&format!(".{ext}"))).await?;
    let mut local_failed: Vec<PathBuf> = Vec::new();

    for (found, destination_dir) in compressed_files
        .iter()
        .map(|f| (f, &config.local_data_directory))
        .chain(counters.iter().map(|f| (f, &config.local_counter_directory)))
    {
        if found.date == today {
            continue;
        }
        if copy_with_verification(tools, found, destination_dir, config.local_file_permissions.as_deref(), None)
            .await?
        {
            report.local_copied += 1;
        } else {
            local_failed.push(found.path.clone());
        }
    }

    // Remove cwd artifacts outside the local retention window, unless
    // they're today's or failed to copy (spec §4.10 "Failure policy").
    for found in compressed_files.iter().chain(counters.iter()) {
        if found.date == today || local_failed.contains(&found.path) {
            continue;
        }
        if !within_window(found.date, today, config.backup_days_cwd) {
            tools.remove(&found.path).await?;
            report.purged_cwd += 1;
        }
    }

    // Step 4: copy from the local archive to the remote server.
    let local_compressed =
        list_matching(&config.local_data_directory, |name| name.ends_with(&format!(".{ext}"))).await?;
    let local_counters = list_matching(&config.local_counter_directory, |name| name.ends_with("_data_counter.csv"))
        .await?;

    let mut remote_failed: Vec<PathBuf> = Vec::new();
    for (found, destination_dir) in local_compressed
        .iter()
        .map(|f| (f, config.remote_data_directory.as_str()))
        .chain(local_counters.iter().map(|f| (f, config.remote_counter_directory.as_str())))
    {
        if found.date == today {
            continue;
        }
        if copy_with_verification(
            tools,
            found,
            &destination_dir.into(),
            config.remote_file_permissions.as_deref(),
            Some(&config.remote_backup_server),
        )
        .await?
        {
            report.remote_copied += 1;
        } else {
            remote_failed.push(found.path.clone());
        }
    }

    // Purge the local archive outside its retention window.
    for found in local_compressed.iter().chain(local_counters.iter()) {
        if found.date == today || remote_failed.contains(&found.path) {
            continue;
        }
        if !within_window(found.date, today, config.backup_days_local_backup) {
            tools.remove(&found.path).await?;
            report.purged_local += 1;
        }
    }

    Ok(report)
}

/// Compares `source` against `target`, locally by byte compare or (when
/// `remote_server` is set) by MD5 digest taken of the source locally and of
/// the target on the remote host. Used both as the pre-copy idempotence
/// check and, per spec §4.10 steps 3/4, as the mandatory post-copy
/// verification that gates whether a copy is ever counted as done.
async fn verify_match(
    tools: &dyn BackupTools,
    source: &Path,
    target: &Path,
    remote_server: Option<&str>,
) -> Result<bool, Error> {
    match remote_server {
        None => Ok(tools.files_match(source, target).await?),
        Some(server) => {
            let target_str = target.to_string_lossy().into_owned();
            match tools.md5(&target_str, Some(server)).await? {
                Some(target_md5) => {
                    let source_str = source.to_string_lossy().into_owned();
                    Ok(tools.md5(&source_str, None).await?.as_deref() == Some(target_md5.as_str()))
                }
                None => Ok(false),
            }
        }
    }
}

/// Copies one artifact to `destination_dir`, skipping the copy if it's
/// already present and byte/md5-identical (spec's backup idempotence
/// property), and verifying the copy the same way afterwards before
/// setting target permissions and counting it as done (spec §4.10 steps
/// 3/4: "verify via byte compare" / "verify via MD5 digest comparison"). A
/// copy that doesn't verify is not counted as copied and its source stays
/// eligible for a later retry rather than being purged.
async fn copy_with_verification(
    tools: &dyn BackupTools,
    found: &Found,
    destination_dir: &Path,
    permissions: Option<&str>,
    remote_server: Option<&str>,
) -> Result<bool, Error> {
    let file_name = found
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let target = destination_dir.join(&file_name);

    if verify_match(tools, &found.path, &target, remote_server).await? {
        return Ok(true);
    }

    let destination_dir_str = destination_dir.to_string_lossy().into_owned();
    if !tools.copy(&found.path, &destination_dir_str, remote_server).await? {
        return Ok(false);
    }

    if !verify_match(tools, &found.path, &target, remote_server).await? {
        warn!(path = %found.path.display(), target = %target.display(), "copy did not verify, leaving source in place");
        return Ok(false);
    }

    Ok(tools.set_permissions(&target, permissions, remote_server).await?)
}
