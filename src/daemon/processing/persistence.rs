use std::{
    num::NonZeroU64,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
};

use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::{
    daemon::{counting::KeyTally, storage::snapshot_writer::SnapshotWriter},
    desktop::notifier::Notifier,
    utils::clock::Clock,
};

use super::report::render;

pub const SAVE_FAILED_MESSAGE: &str = "Failed to save key count data to a file!";

/// Decides when the amount of recorded presses warrants a flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushPolicy {
    frequency: NonZeroU64,
}

impl FlushPolicy {
    pub fn every(frequency: NonZeroU64) -> Self {
        Self { frequency }
    }

    pub fn frequency(&self) -> NonZeroU64 {
        self.frequency
    }

    /// `total` is the running total returned by the press that was just recorded. Every total
    /// is returned exactly once, so each multiple of the frequency triggers exactly one flush.
    pub fn should_flush(&self, total: u64) -> bool {
        total != 0 && total % self.frequency.get() == 0
    }
}

/// Writes [KeyTally] into the snapshot. Failures are contained here: they are logged and shown to
/// the user, but never reach whoever asked for the flush.
pub struct Persister<W: SnapshotWriter> {
    tally: Arc<KeyTally>,
    writer: W,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    // Only one flush writes at a time. The snapshot is taken while holding it, so a later flush
    // never writes older data than an earlier one.
    flushing: Mutex<()>,
    finalized: AtomicBool,
    failures: AtomicU64,
}

impl<W: SnapshotWriter> Persister<W> {
    pub fn new(
        tally: Arc<KeyTally>,
        writer: W,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tally,
            writer,
            notifier,
            clock,
            flushing: Mutex::new(()),
            finalized: AtomicBool::new(false),
            failures: AtomicU64::new(0),
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Amount of flushes that failed to write since the start of the session.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Renders the current state and replaces the snapshot with it. Returns whether the write
    /// succeeded.
    #[instrument(skip(self))]
    pub async fn flush(&self) -> bool {
        let _flushing = self.flushing.lock().await;

        let snapshot = self.tally.snapshot();
        let report = render(&snapshot, self.tally.session(), self.clock.time());

        match self.writer.write(&report).await {
            Ok(()) => {
                debug!(
                    "Saved {} presses to {:?}",
                    snapshot.total(),
                    self.writer.path()
                );
                true
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                error!("Failed to save snapshot {e:?}");
                self.notifier.notify(SAVE_FAILED_MESSAGE);
                false
            }
        }
    }

    /// The flush done on shutdown. Only the first call writes, later calls return right away.
    pub async fn final_flush(&self) -> bool {
        if self.finalized.swap(true, Ordering::SeqCst) {
            debug!("Final flush already happened");
            return false;
        }
        info!("Final flush with {} presses", self.tally.total());
        self.flush().await
    }
}
