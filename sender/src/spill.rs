use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};
use tracing::warn;

const WRITE_FILENAME: &str = "failed_udp_data_sends.txt";
const READ_FILENAME: &str = "failed_udp_data_sends_temp.txt";

/// The on-disk spill pair used to hold UDP sends that failed confirmation.
///
/// Mirrors `BackupFileHandler` in `python_poc/adapters/common_utils.py`: a
/// write-side file that accrues failures as they happen, and a read-side
/// file that the resend sweep renames the write-side file to before
/// re-injecting its contents, so new failures never race with a sweep in
/// progress. The original used two class-level `threading.Lock`s; this is
/// the same pairing with `tokio::sync::Mutex` guarding each side.
pub struct SpillFiles {
    write_path: PathBuf,
    read_path: PathBuf,
    write_lock: Mutex<()>,
    read_lock: Mutex<()>,
}

impl SpillFiles {
    #[must_use]
    pub fn new(directory: &Path) -> Self {
        SpillFiles {
            write_path: directory.join(WRITE_FILENAME),
            read_path: directory.join(READ_FILENAME),
            write_lock: Mutex::new(()),
            read_lock: Mutex::new(()),
        }
    }

    /// Appends one failed-send payload to the write-side spill file.
    /// Best-effort: an I/O failure is logged and the data is dropped, per
    /// spec §4.2.
    pub async fn write_data(&self, data: &[u8]) {
        let _guard = self.write_lock.lock().await;
        let result = async {
            let mut file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.write_path)
                .await?;
            file.write_all(data).await
        }
        .await;

        if let Err(err) = result {
            warn!(path = %self.write_path.display(), %err, "cannot write to spill file");
        }
    }

    /// Runs one resend sweep: re-injects every line of a pre-existing
    /// read-side file (left over from an interrupted prior sweep), then
    /// atomically takes over the write-side file and re-injects that too.
    /// Returns the number of lines re-injected.
    pub async fn resend_sweep(&self, tx: &mpsc::Sender<Option<Bytes>>) -> usize {
        let _read_guard = self.read_lock.lock().await;
        let mut lines = 0usize;

        lines += self.drain_file(&self.read_path, tx).await;

        {
            let _write_guard = self.write_lock.lock().await;
            if fs::metadata(&self.write_path).await.is_ok() {
                if let Err(err) = fs::rename(&self.write_path, &self.read_path).await {
                    warn!(
                        from = %self.write_path.display(),
                        to = %self.read_path.display(),
                        %err,
                        "cannot rename spill file"
                    );
                }
            }
        }

        lines += self.drain_file(&self.read_path, tx).await;

        if fs::metadata(&self.read_path).await.is_ok() {
            if let Err(err) = fs::remove_file(&self.read_path).await {
                warn!(path = %self.read_path.display(), %err, "cannot remove spill read file");
            }
        }

        lines
    }

    async fn drain_file(&self, path: &Path, tx: &mpsc::Sender<Option<Bytes>>) -> usize {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return 0,
            Err(err) => {
                warn!(path = %path.display(), %err, "cannot read spill file");
                return 0;
            }
        };

        let mut count = 0usize;
        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            let mut owned = line.as_bytes().to_vec();
            owned.push(b'\n');
            if tx.send(Some(Bytes::from(owned))).await.is_err() {
                break;
            }
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn write_then_sweep_reinjects_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillFiles::new(dir.path());
        spill.write_data(b"one\n").await;
        spill.write_data(b"two\n").await;

        let (tx, mut rx) = mpsc::channel(8);
        let count = spill.resend_sweep(&tx).await;
        drop(tx);

        assert_eq!(count, 2);
        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item.unwrap());
        }
        assert_eq!(received[0].as_ref(), b"one\n");
        assert_eq!(received[1].as_ref(), b"two\n");
        assert!(fs::metadata(dir.path().join(READ_FILENAME)).await.is_err());
        assert!(fs::metadata(dir.path().join(WRITE_FILENAME)).await.is_err());
    }

    #[tokio::test]
    async fn pre_existing_read_file_is_processed_first() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(READ_FILENAME), "leftover\n")
            .await
            .unwrap();
        let spill = SpillFiles::new(dir.path());
        spill.write_data(b"fresh\n").await;

        let (tx, mut rx) = mpsc::channel(8);
        let count = spill.resend_sweep(&tx).await;
        drop(tx);

        assert_eq!(count, 2);
        let mut received = Vec::new();
        while let Some(item) = rx.recv().await {
            received.push(item.unwrap());
        }
        assert_eq!(received[0].as_ref(), b"leftover\n");
        assert_eq!(received[1].as_ref(), b"fresh\n");
    }

    #[tokio::test]
    async fn empty_spill_sweep_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let spill = SpillFiles::new(dir.path());
        let (tx, _rx) = mpsc::channel(8);
        assert_eq!(spill.resend_sweep(&tx).await, 0);
    }
}
