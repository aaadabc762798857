use std::{
    future::Future,
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::{debug, warn};

/// Interface for abstracting the place a report is written to.
pub trait SnapshotWriter: Send + Sync + 'static {
    fn path(&self) -> &Path;

    /// Replaces the whole content of the snapshot with `report`.
    fn write(&self, report: &str) -> impl Future<Output = Result<()>> + Send;

    /// Whether the snapshot is currently visible on the filesystem.
    fn exists(&self) -> impl Future<Output = bool> + Send;
}

/// The main realization of [SnapshotWriter].
pub struct FileSnapshotWriter {
    path: PathBuf,
}

impl FileSnapshotWriter {
    pub fn new(dir: &Path, file_name: &str) -> Self {
        Self {
            path: dir.join(file_name),
        }
    }
}

impl SnapshotWriter for FileSnapshotWriter {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn write(&self, report: &str) -> Result<()> {
        debug!("Writing snapshot to {:?}", self.path);
        let mut file = File::options()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open snapshot {:?}", self.path))?;

        // Truncating only after the lock is taken keeps readers that also lock from seeing an
        // empty file.
        file.lock_exclusive()?;
        let written = async {
            file.set_len(0).await?;
            file.write_all(report.as_bytes()).await?;
            file.flush().await?;
            file.sync_data().await
        }
        .await;
        let unlocked = file.unlock_async().await;

        finish_write(&self.path, written, unlocked)
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

/// The write result decides the outcome. Closing the file releases the lock anyway, so a failed
/// unlock is only logged.
fn finish_write(path: &Path, written: io::Result<()>, unlocked: io::Result<()>) -> Result<()> {
    if let Err(e) = unlocked {
        warn!("Failed to unlock snapshot {path:?} {e:?}");
    }
    written.with_context(|| format!("Failed to write snapshot {path:?}"))
}
