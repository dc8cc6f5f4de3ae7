use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use tokio::runtime::Handle;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, error};

/// A built artifact and the bundle it came from.
///
/// Both are removed exactly once, by [`close`](Self::close),
/// [`release`](Self::release) or on drop, whichever comes first. The job's
/// build lock is held until the files are gone.
#[derive(Debug)]
pub struct ArtifactLease {
    artifact: Utf8PathBuf,
    bundle_dir: Utf8PathBuf,
    lock: Option<OwnedMutexGuard<()>>,
}

impl ArtifactLease {
    pub(crate) const fn new(artifact: Utf8PathBuf, bundle_dir: Utf8PathBuf, lock: OwnedMutexGuard<()>) -> Self {
        Self {
            artifact,
            bundle_dir,
            lock: Some(lock),
        }
    }

    /// The signed `.pkpass` file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.artifact
    }

    #[must_use]
    pub fn bundle_dir(&self) -> &Utf8Path {
        &self.bundle_dir
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(&self.artifact).await
    }

    /// Removes the files and waits until they are gone.
    pub async fn close(mut self) {
        let Some(cleanup) = self.take_cleanup() else {
            return;
        };

        if let Err(err) = tokio::task::spawn_blocking(move || cleanup.run()).await {
            error!(%err, "Pass cleanup task failed");
        }
    }

    /// Schedules removal without waiting, for callers that cannot await.
    pub fn release(mut self) {
        self.cleanup_in_background();
    }

    fn take_cleanup(&mut self) -> Option<Cleanup> {
        self.lock.take().map(|lock| Cleanup {
            artifact: self.artifact.clone(),
            bundle_dir: self.bundle_dir.clone(),
            _lock: lock,
        })
    }

    /// Filesystem removal runs on the blocking pool when a runtime is
    /// around, inline otherwise.
    fn cleanup_in_background(&mut self) {
        let Some(cleanup) = self.take_cleanup() else {
            return;
        };

        match Handle::try_current() {
            Ok(handle) => drop(handle.spawn_blocking(move || cleanup.run())),
            Err(_) => cleanup.run(),
        }
    }
}

impl Drop for ArtifactLease {
    fn drop(&mut self) {
        self.cleanup_in_background();
    }
}

/// Owns the job lock until removal has finished.
struct Cleanup {
    artifact: Utf8PathBuf,
    bundle_dir: Utf8PathBuf,
    _lock: OwnedMutexGuard<()>,
}

impl Cleanup {
    fn run(self) {
        if let Err(err) = remove(std::fs::remove_dir_all(&self.bundle_dir)) {
            error!(bundle_dir = %self.bundle_dir, %err, "Failed to remove pass bundle");
        }
        if let Err(err) = remove(std::fs::remove_file(&self.artifact)) {
            error!(artifact = %self.artifact, %err, "Failed to remove pass artifact");
        }

        debug!(artifact = %self.artifact, "Released pass artifact");
    }
}

fn remove(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
