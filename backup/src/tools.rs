//! External tool abstraction for the backup state machine: compressor,
//! permission setter, remote copy, and digest comparison. See
//! SPEC_FULL.md §17 and `python_poc/backup_procem_data.py`'s
//! `compress_data` / `change_file_permission` / `backup_data` /
//! `get_md5sum`, all of which shell out to subprocesses.
//!
//! Abstracted behind [`BackupTools`] so [`crate::cycle::run_cycle`] is
//! unit-testable without invoking real subprocesses, the same seam
//! `hub::uploader::IotTicketClient` provides for the cloud write contract.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::warn;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// The subprocess seam the backup cycle drives. Every method reports
/// success/failure as a `bool` rather than propagating process exit
/// status, mirroring the original's "log and mark failed, never panic"
/// policy (spec §4.10 "Failure policy").
#[async_trait]
pub trait BackupTools: Send + Sync {
    /// Compresses `path` in place, replacing it with a file named
    /// `compressed_path`. Returns `true` only once the tool's stdout
    /// contains the configured success marker (spec §4.10 step 1: "success
    /// is detected by a specific stdout marker").
    async fn compress(&self, path: &Path, compressed_path: &Path) -> Result<bool, Error>;

    /// Sets `permissions` (e.g. `"640"`) on `path`, optionally over ssh to
    /// `remote_server`. A `None` permissions value is a no-op success.
    async fn set_permissions(
        &self,
        path: &Path,
        permissions: Option<&str>,
        remote_server: Option<&str>,
    ) -> Result<bool, Error>;

    /// Byte-compares two local files (`cmp`).
    async fn files_match(&self, a: &Path, b: &Path) -> Result<bool, Error>;

    /// Copies `source` into `destination_dir`, either locally (`cp`) or
    /// over ssh (`scp`) when `remote_server` is set.
    async fn copy(&self, source: &Path, destination_dir: &str, remote_server: Option<&str>) -> Result<bool, Error>;

    /// Computes an md5 digest, locally or over ssh.
    async fn md5(&self, path: &str, remote_server: Option<&str>) -> Result<Option<String>, Error>;

    /// Removes a local file.
    async fn remove(&self, path: &Path) -> Result<bool, Error>;
}

/// `tokio::process::Command`-backed [`BackupTools`] for production use,
/// matching the original's subprocess-based design: `7z`, `chmod`, `cp`/
/// `scp`, `cmp`, `md5sum`, invoked the same way regardless of whether the
/// target is local or reached via `ssh <remote_server> ...`.
pub struct ProcessBackupTools {
    compression_command: String,
    compression_success_message: String,
}

impl ProcessBackupTools {
    #[must_use]
    pub fn new(compression_command: String, compression_success_message: String) -> Self {
        ProcessBackupTools {
            compression_command,
            compression_success_message,
        }
    }

    async fn run(&self, program: &'static str, args: &[&str]) -> Result<(bool, String, String), Error> {
        let output = Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|source| Error::Spawn { program, source })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        Ok((output.status.success(), stdout, stderr))
    }
}

#[async_trait]
impl BackupTools for ProcessBackupTools {
    async fn compress(&self, path: &Path, compressed_path: &Path) -> Result<bool, Error> {
        let mut parts = self.compression_command.split(' ');
        let program = parts.next().unwrap_or("7z");
        let leading_args: Vec<&str> = parts.collect();
        let compressed = compressed_path.to_string_lossy().into_owned();
        let source = path.to_string_lossy().into_owned();

        let mut args: Vec<&str> = leading_args;
        args.push(&compressed);
        args.push(&source);

        let program: &'static str = match program {
            "7z" => "7z",
            other => {
                warn!(%other, "unrecognised compression command, falling back to 7z");
                "7z"
            }
        };

        let (ok, stdout, _stderr) = self.run(program, &args).await?;
        Ok(ok && stdout.contains(&self.compression_success_message))
    }

    async fn set_permissions(
        &self,
        path: &Path,
        permissions: Option<&str>,
        remote_server: Option<&str>,
    ) -> Result<bool, Error> {
        let Some(permissions) = permissions else {
            return Ok(true);
        };
        let target = path.to_string_lossy().into_owned();

        let (ok, stdout, stderr) = match remote_server {
            Some(server) => self.run("ssh", &[server, "chmod", permissions, &target]).await?,
            None => self.run("chmod", &[permissions, &target]).await?,
        };
        Ok(ok && stdout.is_empty() && stderr.is_empty())
    }

    async fn files_match(&self, a: &Path, b: &Path) -> Result<bool, Error> {
        let a = a.to_string_lossy().into_owned();
        let b = b.to_string_lossy().into_owned();
        let (ok, stdout, stderr) = self.run("cmp", &[&a, &b]).await?;
        Ok(ok && stdout.is_empty() && stderr.is_empty())
    }

    async fn copy(&self, source: &Path, destination_dir: &str, remote_server: Option<&str>) -> Result<bool, Error> {
        let source_str = source.to_string_lossy().into_owned();
        let (ok, _stdout, stderr) = match remote_server {
            Some(server) => {
                let destination = format!("{server}:{destination_dir}");
                self.run("scp", &[&source_str, &destination]).await?
            }
            None => self.run("cp", &[&source_str, destination_dir]).await?,
        };
        if !ok {
            warn!(source = %source.display(), %stderr, "copy failed");
        }
        Ok(ok)
    }

    async fn md5(&self, path: &str, remote_server: Option<&str>) -> Result<Option<String>, Error> {
        let (ok, stdout, stderr) = match remote_server {
            Some(server) => self.run("ssh", &[server, "md5sum", path]).await?,
            None => self.run("md5sum", &[path]).await?,
        };
        if !ok || !stderr.is_empty() {
            return Ok(None);
        }
        Ok(stdout.split_whitespace().next().map(str::to_string))
    }

    async fn remove(&self, path: &Path) -> Result<bool, Error> {
        let target = path.to_string_lossy().into_owned();
        let (ok, _stdout, _stderr) = self.run("rm", &[&target]).await?;
        Ok(ok)
    }
}
