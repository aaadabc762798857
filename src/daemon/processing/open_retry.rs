use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use tracing::{error, info, instrument, warn};

use crate::{
    daemon::storage::snapshot_writer::SnapshotWriter,
    desktop::{notifier::Notifier, opener::FileOpener},
    utils::clock::Clock,
};

use super::persistence::Persister;

/// Checks past this amount of retries give up.
pub const MAX_OPEN_RETRIES: u32 = 5;
pub const OPEN_RETRY_DELAY: Duration = Duration::from_millis(20);

pub const OPEN_UNSUPPORTED_MESSAGE: &str = "Unable to open log file! Open manually on desktop.";
pub const OPEN_FAILED_MESSAGE: &str =
    "There was an error opening the log file. Open manually on desktop.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// The snapshot was handed to the file opener after `attempts` existence checks.
    Opened { attempts: u32 },
    /// The snapshot never became visible.
    Exhausted { attempts: u32 },
    /// The host can't open files.
    Unsupported,
    /// The file opener returned an error.
    Failed,
}

/// Flushes the snapshot and shows it to the user. A freshly written file is not always visible
/// right away, so existence is retried a bounded amount of times.
pub struct SnapshotOpener<W: SnapshotWriter> {
    persister: Arc<Persister<W>>,
    opener: Box<dyn FileOpener>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    retries: AtomicU32,
}

impl<W: SnapshotWriter> SnapshotOpener<W> {
    pub fn new(
        persister: Arc<Persister<W>>,
        opener: Box<dyn FileOpener>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            persister,
            opener,
            notifier,
            clock,
            retries: AtomicU32::new(0),
        }
    }

    /// Retries used by the request in progress. Zero when no request is running.
    pub fn retries(&self) -> u32 {
        self.retries.load(Ordering::SeqCst)
    }

    #[instrument(skip(self))]
    pub async fn open_snapshot(&self) -> OpenOutcome {
        self.persister.flush().await;

        if !self.opener.is_supported() {
            warn!("Opening files isn't supported on this host");
            self.notifier.notify(OPEN_UNSUPPORTED_MESSAGE);
            return OpenOutcome::Unsupported;
        }

        let path = self.persister.writer().path();
        loop {
            let retries = self.retries.load(Ordering::SeqCst);
            if self.persister.writer().exists().await {
                self.retries.store(0, Ordering::SeqCst);
                let attempts = retries + 1;
                return match self.opener.open(path).await {
                    Ok(()) => {
                        info!("Opened {path:?} after {attempts} checks");
                        OpenOutcome::Opened { attempts }
                    }
                    Err(e) => {
                        error!("Failed to open {path:?} {e:?}");
                        self.notifier.notify(OPEN_FAILED_MESSAGE);
                        OpenOutcome::Failed
                    }
                };
            }

            if retries > MAX_OPEN_RETRIES {
                let attempts = retries + 1;
                warn!("{path:?} didn't appear after {attempts} checks");
                self.retries.store(0, Ordering::SeqCst);
                self.notifier
                    .notify(&format!("Failed to open log file after {attempts} tries."));
                return OpenOutcome::Exhausted { attempts };
            }

            self.clock.sleep(OPEN_RETRY_DELAY).await;
            self.retries.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::Ordering, Arc};

    use anyhow::anyhow;

    use crate::{
        daemon::{
            counting::KeyTally,
            processing::persistence::{test_writer::TestWriter, Persister},
        },
        desktop::{
            notifier::{MockNotifier, NoopNotifier, Notifier},
            opener::MockFileOpener,
        },
        utils::clock::test_clock::{TestClock, TEST_START_DATE},
    };

    use super::{
        OpenOutcome, SnapshotOpener, MAX_OPEN_RETRIES, OPEN_FAILED_MESSAGE,
        OPEN_UNSUPPORTED_MESSAGE,
    };

    fn opener(
        writer: TestWriter,
        file_opener: MockFileOpener,
        notifier: impl Notifier + 'static,
        clock: Arc<TestClock>,
    ) -> SnapshotOpener<TestWriter> {
        let notifier: Arc<dyn Notifier> = Arc::new(notifier);
        let tally = Arc::new(KeyTally::new(TEST_START_DATE));
        tally.record("a");
        let persister = Arc::new(Persister::new(
            tally,
            writer,
            notifier.clone(),
            clock.clone(),
        ));
        SnapshotOpener::new(persister, Box::new(file_opener), notifier, clock)
    }

    #[tokio::test]
    async fn test_open_after_file_appears() {
        let clock = Arc::new(TestClock::new(TEST_START_DATE));
        let mut file_opener = MockFileOpener::new();
        file_opener.expect_is_supported().return_const(true);
        file_opener.expect_open().times(1).returning(|_| Ok(()));

        let opener = opener(
            TestWriter::with_existence([false, false, true]),
            file_opener,
            NoopNotifier,
            clock.clone(),
        );

        assert_eq!(
            opener.open_snapshot().await,
            OpenOutcome::Opened { attempts: 3 }
        );
        assert_eq!(opener.retries(), 0);
        assert_eq!(clock.sleeps(), 2);
        assert_eq!(opener.persister.writer().write_count(), 1);
    }

    #[tokio::test]
    async fn test_open_gives_up() {
        let clock = Arc::new(TestClock::new(TEST_START_DATE));
        let mut file_opener = MockFileOpener::new();
        file_opener.expect_is_supported().return_const(true);
        file_opener.expect_open().never();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|message| message.starts_with("Failed to open log file after"))
            .times(1)
            .return_const(());

        let opener = opener(
            TestWriter::with_existence([false]),
            file_opener,
            notifier,
            clock.clone(),
        );

        let outcome = opener.open_snapshot().await;
        let checks = opener.persister.writer().exists_checks.load(Ordering::SeqCst);

        assert_eq!(
            outcome,
            OpenOutcome::Exhausted {
                attempts: MAX_OPEN_RETRIES + 2
            }
        );
        assert!(checks >= 6);
        assert_eq!(checks, MAX_OPEN_RETRIES + 2);
        assert_eq!(opener.retries(), 0);
    }

    #[tokio::test]
    async fn test_open_unsupported_still_flushes() {
        let clock = Arc::new(TestClock::new(TEST_START_DATE));
        let mut file_opener = MockFileOpener::new();
        file_opener.expect_is_supported().return_const(false);
        file_opener.expect_open().never();
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|message| message == OPEN_UNSUPPORTED_MESSAGE)
            .times(1)
            .return_const(());

        let opener = opener(TestWriter::default(), file_opener, notifier, clock);

        assert_eq!(opener.open_snapshot().await, OpenOutcome::Unsupported);
        assert_eq!(opener.persister.writer().write_count(), 1);
    }

    #[tokio::test]
    async fn test_open_error_is_reported() {
        let clock = Arc::new(TestClock::new(TEST_START_DATE));
        let mut file_opener = MockFileOpener::new();
        file_opener.expect_is_supported().return_const(true);
        file_opener
            .expect_open()
            .times(1)
            .returning(|_| Err(anyhow!("no default program")));
        let mut notifier = MockNotifier::new();
        notifier
            .expect_notify()
            .withf(|message| message == OPEN_FAILED_MESSAGE)
            .times(1)
            .return_const(());

        let opener = opener(
            TestWriter::with_existence([true]),
            file_opener,
            notifier,
            clock,
        );

        assert_eq!(opener.open_snapshot().await, OpenOutcome::Failed);
    }
}
