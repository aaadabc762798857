//! Commands coming from the user while the daemon runs. They replace a tray menu: on unix the
//! `open` and `exit` commands of the cli reach the daemon as `SIGUSR1` and `SIGUSR2`.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{
    processing::open_retry::SnapshotOpener, storage::snapshot_writer::SnapshotWriter, DaemonExit,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Flush and show the current snapshot.
    OpenSnapshot,
    /// Stop the daemon with [EXIT_COMMAND_CODE](super::EXIT_COMMAND_CODE).
    Exit,
}

/// Translates user signals into [ControlCommand]s until shutdown.
#[cfg(unix)]
pub async fn listen_for_signals(
    sender: mpsc::Sender<ControlCommand>,
    shutdown: CancellationToken,
) -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut open = signal(SignalKind::user_defined1())?;
    let mut exit = signal(SignalKind::user_defined2())?;
    loop {
        let command = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            _ = open.recv() => ControlCommand::OpenSnapshot,
            _ = exit.recv() => ControlCommand::Exit,
        };
        debug!("Received control signal {command:?}");
        if sender.send(command).await.is_err() {
            return Ok(());
        }
    }
}

/// There are no user signals outside of unix, the sender is only kept alive until shutdown.
#[cfg(not(unix))]
pub async fn listen_for_signals(
    sender: mpsc::Sender<ControlCommand>,
    shutdown: CancellationToken,
) -> Result<()> {
    let _sender = sender;
    shutdown.cancelled().await;
    debug!("Control listener stopped");
    Ok(())
}

/// Executes [ControlCommand]s. Opening the snapshot may wait for the filesystem, so it runs here
/// and not next to the collectors.
pub struct ControlModule<W: SnapshotWriter> {
    receiver: mpsc::Receiver<ControlCommand>,
    opener: Arc<SnapshotOpener<W>>,
    shutdown: CancellationToken,
}

impl<W: SnapshotWriter> ControlModule<W> {
    pub fn new(
        receiver: mpsc::Receiver<ControlCommand>,
        opener: Arc<SnapshotOpener<W>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            opener,
            shutdown,
        }
    }

    pub async fn run(mut self) -> Result<DaemonExit> {
        loop {
            let command = tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(DaemonExit::Shutdown),
                command = self.receiver.recv() => command,
            };

            match command {
                Some(ControlCommand::OpenSnapshot) => {
                    let outcome = self.opener.open_snapshot().await;
                    info!("Open request finished with {outcome:?}");
                }
                Some(ControlCommand::Exit) => {
                    info!("Exit requested");
                    // The final flush happens once the processing module drains its events.
                    self.shutdown.cancel();
                    return Ok(DaemonExit::ExitCommand);
                }
                None => {
                    self.shutdown.cancelled().await;
                    return Ok(DaemonExit::Shutdown);
                }
            }
        }
    }
}
