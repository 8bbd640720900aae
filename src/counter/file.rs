//! File-based counter backend.
//!
//! Each counter lives in `{data_dir}/{name}.json`. Increments take an
//! exclusive advisory lock on `{name}.lock`, so several processes on one host
//! can share the same directory without handing out overlapping batches. New
//! state is written to a temporary file and renamed into place.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use tokio::sync::Mutex;

use crate::config::FileCounterConfig;
use crate::counter::traits::CounterClient;
use crate::domain::CounterState;
use crate::error::{CounterError, CounterResult};

/// File-based counter implementation.
pub struct FileCounter {
    /// Directory for counter files.
    data_dir: PathBuf,
    /// Serializes file operations within this process.
    lock: Mutex<()>,
}

impl FileCounter {
    /// Create a file counter backend, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: &FileCounterConfig) -> CounterResult<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(|e| {
            CounterError::Transient(format!(
                "Failed to create directory {}: {e}",
                config.data_dir.display()
            ))
        })?;

        Ok(Self {
            data_dir: config.data_dir.clone(),
            lock: Mutex::new(()),
        })
    }

    /// Get the file path for a counter.
    fn counter_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", sanitize_name(name)))
    }

    /// Get the lock file path for a counter.
    fn lock_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.lock", sanitize_name(name)))
    }

    /// Read the persisted state of a counter, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn state(&self, name: &str) -> CounterResult<Option<CounterState>> {
        let _guard = self.lock.lock().await;
        let path = self.counter_path(name);

        tokio::task::spawn_blocking(move || read_state(&path))
            .await
            .map_err(|e| CounterError::Transient(e.to_string()))?
    }
}

#[async_trait]
impl CounterClient for FileCounter {
    async fn reserve(&self, counter: &str, amount: u64) -> CounterResult<u64> {
        let _guard = self.lock.lock().await;
        let path = self.counter_path(counter);
        let lock_path = self.lock_path(counter);
        let name = counter.to_string();

        tokio::task::spawn_blocking(move || increment_locked(&path, &lock_path, name, amount))
            .await
            .map_err(|e| CounterError::Transient(e.to_string()))?
    }

    async fn health_check(&self) -> CounterResult<()> {
        let metadata = tokio::fs::metadata(&self.data_dir).await?;
        if metadata.is_dir() {
            Ok(())
        } else {
            Err(CounterError::Transient(format!(
                "{} is not a directory",
                self.data_dir.display()
            )))
        }
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Increment the counter stored at `path` while holding an exclusive lock on
/// `lock_path`.
///
/// The state file is replaced by rename, so the lock lives on a separate file
/// whose inode never changes.
fn increment_locked(
    path: &Path,
    lock_path: &Path,
    name: String,
    amount: u64,
) -> CounterResult<u64> {
    let lock = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(lock_path)?;

    FileExt::lock_exclusive(&lock)?;
    let result = rewrite(path, name, amount);
    // Closing the file releases the lock.
    drop(lock);

    result
}

/// Read, increment, and atomically replace the state at `path`.
///
/// Only a missing file starts a new counter. An empty or unparseable file is
/// a protocol error so that a damaged counter never restarts from zero.
fn rewrite(path: &Path, name: String, amount: u64) -> CounterResult<u64> {
    let mut state = read_state(path)?.unwrap_or_else(|| CounterState::new(name));

    let value = state
        .increment(amount)
        .ok_or_else(|| CounterError::Protocol(format!("counter '{}' overflowed", state.name)))?;

    let json = serde_json::to_string_pretty(&state)?;
    let tmp_path = path.with_extension("json.tmp");
    {
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(json.as_bytes())?;
        tmp.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    sync_parent(path)?;

    Ok(value)
}

/// Flush the directory entry created by a rename.
#[cfg(unix)]
fn sync_parent(path: &Path) -> CounterResult<()> {
    if let Some(parent) = path.parent() {
        File::open(parent)?.sync_all()?;
    }
    Ok(())
}

#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
fn sync_parent(_path: &Path) -> CounterResult<()> {
    Ok(())
}

fn read_state(path: &Path) -> CounterResult<Option<CounterState>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if contents.trim().is_empty() {
        return Err(CounterError::Protocol(format!(
            "counter file {} is empty",
            path.display()
        )));
    }

    Ok(Some(serde_json::from_str(&contents)?))
}

/// Sanitize a name for use as a filename.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
