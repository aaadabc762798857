use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::daemon::{
    collection::KeyEvent, counting::KeyTally, storage::snapshot_writer::SnapshotWriter,
};

use super::{
    module::EventProcessor,
    persistence::{FlushPolicy, Persister},
};

/// Bridges [ProcessingModule](super::ProcessingModule) and [KeyTally]: counts every press and
/// flushes whenever [FlushPolicy] asks for it.
pub struct KeyCounter<W: SnapshotWriter> {
    tally: Arc<KeyTally>,
    policy: FlushPolicy,
    persister: Arc<Persister<W>>,
}

impl<W: SnapshotWriter> KeyCounter<W> {
    pub fn new(tally: Arc<KeyTally>, policy: FlushPolicy, persister: Arc<Persister<W>>) -> Self {
        Self {
            tally,
            policy,
            persister,
        }
    }
}

impl<W: SnapshotWriter> EventProcessor for KeyCounter<W> {
    async fn process_next(&self, event: KeyEvent) -> Result<()> {
        let total = self.tally.record(&event.key);

        if self.policy.should_flush(total) {
            debug!("Reached {total} presses, flushing");
            self.persister.flush().await;
        }
        Ok(())
    }

    async fn finalize(&self) -> Result<()> {
        self.persister.final_flush().await;
        Ok(())
    }
}
