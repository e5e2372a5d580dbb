use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default ceiling on how long a run may hold the lock before a later run
/// treats it as abandoned.
pub const DEFAULT_MAX_RUN: Duration = Duration::from_secs(15 * 60);

const LOCK_FILE: &str = "ingest.lock";

#[derive(Debug, Error)]
pub enum LockError {
    /// A live lock exists — another ingestion run is still executing.
    #[error("Another ingestion run appears to be in progress (lock age {age_secs}s)")]
    Held { age_secs: u64 },

    #[error("Failed to create run lock: {0}")]
    Io(#[from] std::io::Error),
}

/// Single-writer guard for the merge → dedup → archive → persist sequence.
///
/// Acquiring creates `ingest.lock` in the data directory with `create_new`
/// semantics, so two concurrent runs cannot both win. The file records the
/// acquisition time (unix seconds) and pid; a lock older than the maximum
/// run duration is assumed to belong to a crashed run and is broken with a
/// warning. A live lock aborts the new run before any store read or write.
///
/// The lock is released on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Acquires the run lock, breaking a stale one if necessary.
    ///
    /// # Errors
    ///
    /// [`LockError::Held`] when a lock younger than `max_age` exists;
    /// [`LockError::Io`] on filesystem failures.
    pub fn acquire(data_dir: &Path, max_age: Duration) -> Result<Self, LockError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOCK_FILE);

        match Self::try_create(&path) {
            Ok(lock) => Ok(lock),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let age = Self::lock_age(&path);
                match age {
                    Some(age) if age <= max_age => Err(LockError::Held {
                        age_secs: age.as_secs(),
                    }),
                    _ => {
                        // EDGE-002: Stale (or unreadable) lock from a crashed
                        // run — break it and take over.
                        tracing::warn!(
                            path = %path.display(),
                            age_secs = age.map(|a| a.as_secs()),
                            "Breaking stale ingestion lock"
                        );
                        std::fs::remove_file(&path)?;
                        Self::try_create(&path).map_err(LockError::Io)
                    }
                }
            }
            Err(e) => Err(LockError::Io(e)),
        }
    }

    fn try_create(path: &Path) -> std::io::Result<Self> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)?;
        let now = unix_now();
        writeln!(file, "{}", now)?;
        writeln!(file, "pid={}", std::process::id())?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Age of an existing lock, judged by the timestamp it recorded.
    /// `None` when the file is unreadable or malformed — treated as stale.
    fn lock_age(path: &Path) -> Option<Duration> {
        let content = std::fs::read_to_string(path).ok()?;
        let acquired: u64 = content.lines().next()?.trim().parse().ok()?;
        Some(Duration::from_secs(unix_now().saturating_sub(acquired)))
    }
}

fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release run lock");
        }
    }
}
