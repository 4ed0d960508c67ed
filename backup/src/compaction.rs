//! Counter-file compaction. Ported from `combine_counter_values` in
//! `python_poc/backup_procem_data.py`: sums duplicate `(id, count)` rows
//! for the same id into one and rewrites the file sorted by id.
//! `hub::dayfile`'s counter files already tolerate multiple appends for
//! the same day (spec §4.6); this is the periodic cleanup pass over them.

use std::path::Path;

use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to read counter file {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to write counter file {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed counter row in {path}: {row:?}")]
    Malformed { path: std::path::PathBuf, row: String },
}

/// Sums every `(id, count)` row in `path` by id and rewrites the file
/// sorted by id, using `delimiter` to split each row. Returns `true` if
/// the file was rewritten (i.e. it contained more than one row per id, or
/// was out of order) and `false` if it was already in canonical form.
pub async fn compact_counter_file(path: &Path, delimiter: &str) -> Result<bool, Error> {
    let text = fs::read_to_string(path).await.map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut totals: FxHashMap<i64, u64> = FxHashMap::default();
    let mut order: Vec<i64> = Vec::new();
    let mut had_duplicate = false;

    for row in text.lines().filter(|r| !r.is_empty()) {
        let mut parts = row.splitn(2, delimiter);
        let id: i64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Malformed {
                path: path.to_path_buf(),
                row: row.to_string(),
            })?;
        let value: u64 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| Error::Malformed {
                path: path.to_path_buf(),
                row: row.to_string(),
            })?;

        match totals.get_mut(&id) {
            Some(total) => {
                *total += value;
                had_duplicate = true;
            }
            None => {
                totals.insert(id, value);
                order.push(id);
            }
        }
    }

    let canonical_order = order.windows(2).all(|w| w[0] < w[1]);
    order.sort_unstable();
    if !had_duplicate && canonical_order {
        debug!(path = %path.display(), "counter file already compacted");
        return Ok(false);
    }

    let mut buf = String::new();
    for id in &order {
        buf.push_str(&id.to_string());
        buf.push_str(delimiter);
        buf.push_str(&totals[id].to_string());
        buf.push('\n');
    }

    fs::write(path, buf).await.map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sums_duplicate_ids_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.csv");
        tokio::fs::write(&path, "5\t3\n1\t2\n5\t4\n").await.unwrap();

        let rewritten = compact_counter_file(&path, "\t").await.unwrap();
        assert!(rewritten);

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(text, "1\t2\n5\t7\n");
    }

    #[tokio::test]
    async fn out_of_order_unique_ids_are_rewritten_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.csv");
        tokio::fs::write(&path, "5\t3\n1\t2\n").await.unwrap();

        let rewritten = compact_counter_file(&path, "\t").await.unwrap();
        assert!(rewritten);

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(text, "1\t2\n5\t3\n");
    }

    #[tokio::test]
    async fn already_compacted_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.csv");
        tokio::fs::write(&path, "1\t2\n5\t7\n").await.unwrap();

        let rewritten = compact_counter_file(&path, "\t").await.unwrap();
        assert!(!rewritten);
    }

    #[tokio::test]
    async fn malformed_row_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter.csv");
        tokio::fs::write(&path, "not-a-row\n").await.unwrap();

        assert!(compact_counter_file(&path, "\t").await.is_err());
    }
}
