use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use tokio::{
    sync::mpsc,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info_span, trace, Instrument};

use crate::keyboard_api::KeyboardApi;

use super::KeyEvent;

/// Polls a [KeyboardApi] and turns keys that went from released to held into press events.
pub struct KeyCollectionModule {
    next: mpsc::Sender<KeyEvent>,
    producer: Box<dyn KeyboardApi>,
    shutdown: CancellationToken,
    poll_interval: Duration,
    held: HashSet<Arc<str>>,
}

impl KeyCollectionModule {
    pub fn new(
        next: mpsc::Sender<KeyEvent>,
        producer: Box<dyn KeyboardApi>,
        shutdown: CancellationToken,
        poll_interval: Duration,
    ) -> Self {
        Self {
            next,
            producer,
            shutdown,
            poll_interval,
            held: HashSet::new(),
        }
    }

    fn collect_presses(&mut self) -> Result<Vec<KeyEvent>> {
        let current = self
            .producer
            .pressed_keys()?
            .into_iter()
            .collect::<HashSet<_>>();

        let presses = current
            .iter()
            .filter(|key| !self.held.contains(*key))
            .map(|key| KeyEvent { key: key.clone() })
            .collect();
        self.held = current;
        Ok(presses)
    }

    /// Executes the collector event loop.
    pub async fn run(mut self) -> Result<()> {
        let mut ticks = interval(self.poll_interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Cancelation stops the loop and drops the sender, which in turn stops the
                // processing module.
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                _ = ticks.tick() => ()
            }

            match self.collect_presses() {
                Ok(presses) => {
                    for press in presses {
                        let span = info_span!("Sending key press");
                        trace!("Sending {:?}", press);
                        self.next
                            .send(press)
                            .instrument(span)
                            .await
                            .map_err(|_| anyhow!("Processing module stopped receiving events"))
                            .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
                    }
                }
                Err(e) => {
                    debug!("Encountered an error during collection {:?}", e)
                }
            }
        }
    }
}
