// ── Advisory file locks ──
//
// Two locks keep lab hosts from stepping on each other:
//
// - the *reservation* lock reserves a whole physical AP for a test run,
//   keyed by brand/model/control-IP under /tmp;
// - the *session* lock serializes browser sessions, keyed by the
//   WebDriver executable path (one chromedriver binary, one session).
//
// Both are flock-style advisory locks via `fs2`, acquired with a 1 s
// backoff loop bounded by a deadline. Dropping a `FileLock` releases it,
// so holding one across an await point is safe on every exit path.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::error::GuiError;

/// Poll interval between lock attempts.
pub const LOCK_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// An exclusive advisory lock on a file path.
///
/// The lock is released when the guard is dropped (or explicitly via
/// [`FileLock::release`]). The OS also releases it if the process dies,
/// so a crashed test run never wedges the AP.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`, retrying until `timeout` elapses.
    ///
    /// The lock file is created if it does not exist. Contenders poll with
    /// a fixed [`LOCK_RETRY_INTERVAL`] backoff; ordering among them is
    /// whatever the OS provides.
    pub async fn acquire(path: &Path, timeout: Duration) -> Result<Self, GuiError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|source| GuiError::LockFile {
                path: path.to_path_buf(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(path = %path.display(), "lock acquired");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(_) if Instant::now() < deadline => {
                    sleep(LOCK_RETRY_INTERVAL).await;
                }
                Err(_) => {
                    return Err(GuiError::LockTimeout {
                        path: path.to_path_buf(),
                        timeout_secs: timeout.as_secs(),
                    });
                }
            }
        }
    }

    /// The path this lock guards.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Explicitly release the lock.
    ///
    /// Equivalent to dropping the guard; provided for call sites where the
    /// release deserves a log line.
    pub fn release(self) {
        info!(path = %self.path.display(), "releasing lock");
        // Drop impl does the unlock.
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock errors are unrecoverable here; closing the fd releases
        // the flock regardless.
        let _ = fs2::FileExt::unlock(&self.file);
    }
}

// ── Lock path conventions ───────────────────────────────────────────

/// Lock path reserving a physical AP: `/tmp/{brand}_{model}_{control_ip}.lock`.
pub fn reservation_lock_path(brand: &str, model: &str, control_ip: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{brand}_{model}_{control_ip}.lock"))
}

/// Lock path for the browser session, derived from the WebDriver
/// executable path so that every consumer of the same binary contends.
pub fn session_lock_path(driver_path: &str) -> PathBuf {
    let sanitized: String = driver_path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    std::env::temp_dir().join(format!("webdriver{sanitized}.lock"))
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn temp_lock_path(name: &str) -> PathBuf {
        tempfile::tempdir()
            .expect("tempdir")
            .keep()
            .join(format!("{name}.lock"))
    }

    #[tokio::test]
    async fn acquire_creates_lock_file() {
        let path = temp_lock_path("create");
        let lock = FileLock::acquire(&path, Duration::from_secs(5))
            .await
            .expect("first acquire");
        assert!(path.exists());
        assert_eq!(lock.path(), path);
    }

    #[tokio::test]
    async fn second_acquire_times_out_while_held() {
        let path = temp_lock_path("contend");
        let _held = FileLock::acquire(&path, Duration::from_secs(5))
            .await
            .expect("first acquire");

        let start = std::time::Instant::now();
        let second = FileLock::acquire(&path, Duration::from_secs(2)).await;
        let elapsed = start.elapsed();

        assert!(matches!(
            second,
            Err(GuiError::LockTimeout { timeout_secs: 2, .. })
        ));
        // Not immediate, not unbounded: roughly the configured timeout.
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn lock_excludes_concurrent_holder_until_release() {
        let path = temp_lock_path("exclusive");
        let first = FileLock::acquire(&path, Duration::from_secs(5))
            .await
            .expect("first acquire");

        let released = Arc::new(AtomicBool::new(false));
        let released_in_task = Arc::clone(&released);
        let contender_path = path.clone();
        let contender = tokio::spawn(async move {
            let lock = FileLock::acquire(&contender_path, Duration::from_secs(10))
                .await
                .expect("second acquire");
            // Must only get here after the first holder released.
            assert!(released_in_task.load(Ordering::SeqCst));
            drop(lock);
        });

        // Give the contender time to start polling against the held lock.
        sleep(Duration::from_millis(1500)).await;
        released.store(true, Ordering::SeqCst);
        first.release();

        contender.await.expect("contender task");
    }

    #[tokio::test]
    async fn drop_releases_lock() {
        let path = temp_lock_path("drop");
        {
            let _lock = FileLock::acquire(&path, Duration::from_secs(5))
                .await
                .expect("first acquire");
        }
        // Immediately re-acquirable once the guard is gone.
        FileLock::acquire(&path, Duration::from_millis(100))
            .await
            .expect("reacquire after drop");
    }

    #[test]
    fn reservation_path_encodes_identity() {
        let path = reservation_lock_path("Netgear", "RAXE500", "192.168.1.1");
        assert!(
            path.to_string_lossy()
                .ends_with("Netgear_RAXE500_192.168.1.1.lock")
        );
    }

    #[test]
    fn session_path_sanitizes_driver_path() {
        let path = session_lock_path("/usr/local/bin/chromedriver");
        let name = path.file_name().expect("file name").to_string_lossy();
        assert!(name.starts_with("webdriver_usr_local_bin_chromedriver"));
        assert!(!name.contains('/'));
    }
}
