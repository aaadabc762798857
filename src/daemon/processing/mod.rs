use std::sync::Arc;

use anyhow::Result;
use module::EventProcessor;
use tokio::{
    sync::{mpsc::Receiver, Semaphore},
    task::JoinSet,
};
use tracing::{error, info, trace};

use super::collection::KeyEvent;

pub mod counter;
pub mod module;
pub mod open_retry;
pub mod persistence;
pub mod report;

/// Receives key press events and hands each of them to its own task. At most `workers` handlers
/// run at the same time, further events wait in the channel.
pub struct ProcessingModule<Processor> {
    receiver: Receiver<KeyEvent>,
    processor: Arc<Processor>,
    workers: Arc<Semaphore>,
}

impl<P: EventProcessor> ProcessingModule<P> {
    pub fn new(receiver: Receiver<KeyEvent>, processor: Arc<P>, workers: usize) -> Self {
        Self {
            receiver,
            processor,
            workers: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        let mut handlers = JoinSet::new();

        while let Some(event) = self.receiver.recv().await {
            let permit = self.workers.clone().acquire_owned().await?;
            let processor = self.processor.clone();

            handlers.spawn(async move {
                let _permit = permit;
                trace!("Processing event {:?}", event);
                if let Err(e) = processor.process_next(event.clone()).await {
                    error!("Error processing event {:?}: {e:?}", event)
                }
            });

            while let Some(result) = handlers.try_join_next() {
                log_handler_result(result);
            }
        }

        info!("Input closed, waiting for {} handlers", handlers.len());
        while let Some(result) = handlers.join_next().await {
            log_handler_result(result);
        }

        let result = self.processor.finalize().await;
        self.receiver.close();
        result
    }
}

fn log_handler_result(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("Key press handler didn't finish {e:?}");
    }
}

#[cfg(test)]
mod tests {
    use std::{num::NonZeroU64, sync::Arc};

    use anyhow::Result;
    use tokio::sync::mpsc;

    use crate::{
        daemon::{
            collection::KeyEvent,
            counting::KeyTally,
            processing::{
                counter::KeyCounter,
                persistence::{test_writer::TestWriter, FlushPolicy, Persister},
            },
        },
        desktop::notifier::NoopNotifier,
        utils::{
            clock::test_clock::{TestClock, TEST_START_DATE},
            logging::TEST_LOGGING,
        },
    };

    use super::ProcessingModule;

    async fn run_events(
        events: u64,
        workers: usize,
    ) -> Result<(Arc<KeyTally>, Arc<Persister<TestWriter>>)> {
        *TEST_LOGGING;
        let tally = Arc::new(KeyTally::new(TEST_START_DATE));
        let persister = Arc::new(Persister::new(
            tally.clone(),
            TestWriter::default(),
            Arc::new(NoopNotifier),
            Arc::new(TestClock::new(TEST_START_DATE)),
        ));
        let counter = KeyCounter::new(
            tally.clone(),
            FlushPolicy::every(NonZeroU64::new(75).unwrap()),
            persister.clone(),
        );

        let (sender, receiver) = mpsc::channel(10);
        let module = ProcessingModule::new(receiver, Arc::new(counter), workers);

        let keys = ["a", "b", "Space", "Enter"];
        let producer = async move {
            for i in 0..events {
                sender
                    .send(KeyEvent::new(keys[i as usize % keys.len()]))
                    .await
                    .unwrap();
            }
        };

        let (_, result) = tokio::join!(producer, module.run());
        result?;
        Ok((tally, persister))
    }

    #[tokio::test]
    async fn test_threshold_flushes_plus_final() -> Result<()> {
        let (tally, persister) = run_events(225, 4).await?;

        assert_eq!(tally.total(), 225);
        // 3 threshold flushes and the final one.
        assert_eq!(persister.writer().write_count(), 4);
        assert!(persister
            .writer()
            .last_write()
            .unwrap()
            .starts_with("Total key presses: 225\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_below_threshold_only_final_flush() -> Result<()> {
        let (tally, persister) = run_events(74, 2).await?;

        assert_eq!(tally.total(), 74);
        assert_eq!(persister.writer().write_count(), 1);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_handlers_conserve_counts() -> Result<()> {
        let (tally, persister) = run_events(1500, 8).await?;

        let snapshot = tally.snapshot();
        assert_eq!(snapshot.total(), 1500);
        assert_eq!(
            ["a", "b", "Space", "Enter"]
                .iter()
                .map(|key| snapshot.get(key))
                .sum::<u64>(),
            1500
        );
        assert_eq!(persister.writer().write_count(), 21);
        Ok(())
    }
}
