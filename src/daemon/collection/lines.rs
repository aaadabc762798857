use anyhow::{anyhow, Result};
use tokio::{io::AsyncBufRead, io::AsyncBufReadExt, sync::mpsc};
use tokio_stream::{wrappers::SplitStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use super::KeyEvent;

/// Reads one key name per line. Used when key presses come from an external hook program piped
/// into the daemon instead of a compiled-in keyboard backend. Lines that aren't valid UTF-8 are
/// skipped, the following ones are still counted.
pub struct LineCollectionModule<R> {
    next: mpsc::Sender<KeyEvent>,
    lines: SplitStream<R>,
    shutdown: CancellationToken,
}

impl<R: AsyncBufRead + Unpin> LineCollectionModule<R> {
    pub fn new(next: mpsc::Sender<KeyEvent>, reader: R, shutdown: CancellationToken) -> Self {
        Self {
            next,
            lines: SplitStream::new(reader.split(b'\n')),
            shutdown,
        }
    }

    /// Runs until the input ends or shutdown is requested.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let line = tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return Ok(())
                }
                line = self.lines.next() => line
            };

            let Some(line) = line else {
                info!("Key press input ended");
                return Ok(());
            };

            let line = match String::from_utf8(line?) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Skipping key press line that isn't valid UTF-8 {e}");
                    continue;
                }
            };
            let key = line.trim();
            if key.is_empty() {
                continue;
            }

            trace!("Read key press {key}");
            self.next
                .send(KeyEvent::new(key))
                .await
                .map_err(|_| anyhow!("Processing module stopped receiving events"))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tokio::{io::BufReader, sync::mpsc};
    use tokio_util::sync::CancellationToken;

    use super::LineCollectionModule;

    #[tokio::test]
    async fn test_lines_become_events() -> Result<()> {
        let input: &[u8] = b"a\na\n\n  b \nEnter\r\n";
        let (sender, mut receiver) = mpsc::channel(16);

        LineCollectionModule::new(sender, BufReader::new(input), CancellationToken::new())
            .run()
            .await?;

        let mut received = vec![];
        while let Some(event) = receiver.recv().await {
            received.push(event.key.to_string());
        }
        assert_eq!(received, ["a", "a", "b", "Enter"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_line_is_skipped() -> Result<()> {
        let input: &[u8] = b"a\n\xff\xfe\nb\nc\n";
        let (sender, mut receiver) = mpsc::channel(16);

        LineCollectionModule::new(sender, BufReader::new(input), CancellationToken::new())
            .run()
            .await?;

        let mut received = vec![];
        while let Some(event) = receiver.recv().await {
            received.push(event.key.to_string());
        }
        assert_eq!(received, ["a", "b", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_before_input() -> Result<()> {
        let (_writer, reader) = tokio::io::duplex(64);
        let (sender, _receiver) = mpsc::channel(16);
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        LineCollectionModule::new(sender, BufReader::new(reader), shutdown)
            .run()
            .await?;
        Ok(())
    }
}
