//! The backup binary: runs `procem_backup::cycle::run_cycle` once per
//! local day at a configured hour. See spec.md §4.10.

use std::sync::Arc;

use chrono::{Local, NaiveTime};
use clap::Parser;
use tracing::{error, info};

use procem_backup::config::Config;
use procem_backup::cycle;
use procem_backup::tools::{BackupTools, ProcessBackupTools};

#[derive(Parser, Debug)]
#[command(about = "Daily backup/rotation/compression pipeline for Procem day logs")]
struct Args {
    /// Path to the JSON configuration file.
    config_path: std::path::PathBuf,
}

/// Seconds to sleep until the next occurrence of `backup_hour:00:00` local
/// time. Ported from `sleep_until_backup_time` in
/// `python_poc/backup_procem_data.py`, expressed as a pure function of
/// `now` so it is unit-testable without real wall-clock time.
#[must_use]
fn seconds_until_next_run(now: chrono::NaiveDateTime, backup_hour: u32) -> i64 {
    let target_time = NaiveTime::from_hms_opt(backup_hour, 0, 0).expect("backup_hour must be 0-23");
    let today_target = now.date_naive().and_time(target_time);
    let next = if now.time() < target_time {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };
    (next - now).num_seconds().max(0)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = match Config::load(&args.config_path) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "failed to load configuration, exiting");
            std::process::exit(1);
        }
    };

    let tools: Arc<dyn BackupTools> = Arc::new(ProcessBackupTools::new(
        config.compression_command.clone(),
        config.compression_success_message.clone(),
    ));

    info!(
        source_dir = %config.source_dir.display(),
        backup_hour = config.backup_hour,
        "backup pipeline starting"
    );

    loop {
        let now = Local::now().naive_local();
        let wait = seconds_until_next_run(now, config.backup_hour);
        info!(
            hours = wait / 3600,
            minutes = (wait % 3600) / 60,
            "backup pipeline sleeping until next scheduled run"
        );

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(wait.try_into().unwrap_or(0))) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("received interrupt, stopping backup pipeline");
                return;
            }
        }

        let today = Local::now().date_naive();
        match cycle::run_cycle(&config, tools.as_ref(), today).await {
            Ok(report) => info!(
                compressed = report.compressed,
                counters_compacted = report.counters_compacted,
                local_copied = report.local_copied,
                local_failed = report.local_failed,
                remote_copied = report.remote_copied,
                remote_failed = report.remote_failed,
                purged_cwd = report.purged_cwd,
                purged_local = report.purged_local,
                "backup cycle complete"
            ),
            Err(err) => error!(%err, "backup cycle failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn sleeps_until_later_today_when_before_the_target_hour() {
        let seconds = seconds_until_next_run(dt(0, 30), 2);
        assert_eq!(seconds, 3600 + 30 * 60);
    }

    #[test]
    fn sleeps_until_tomorrow_when_past_the_target_hour() {
        let seconds = seconds_until_next_run(dt(5, 0), 2);
        assert_eq!(seconds, 21 * 3600);
    }

    #[test]
    fn zero_wait_would_not_go_negative_at_exact_target() {
        let seconds = seconds_until_next_run(dt(2, 0), 2);
        assert_eq!(seconds, 24 * 3600);
    }
}
