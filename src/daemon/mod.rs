use std::sync::Arc;

use anyhow::Result;
use collection::{collector::KeyCollectionModule, lines::LineCollectionModule, KeyEvent};
use control::{ControlCommand, ControlModule};
use counting::KeyTally;
use processing::{
    counter::KeyCounter,
    open_retry::SnapshotOpener,
    persistence::{FlushPolicy, Persister},
    ProcessingModule,
};
use storage::snapshot_writer::{FileSnapshotWriter, SnapshotWriter};
use tokio::{
    io::{BufReader, Stdin},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::{
    desktop::{
        notifier::{detect_notifier, Notifier},
        opener::{FileOpener, SystemFileOpener},
    },
    keyboard_api::{GenericKeyboardApi, KeyboardApi},
    utils::{
        clock::{Clock, DefaultClock},
        config::Config,
        dir::{default_snapshot_dir, ensure_dir},
    },
};

pub mod args;
pub mod collection;
pub mod control;
pub mod counting;
pub mod processing;
pub mod shutdown;
pub mod storage;

/// Exit code used when the user explicitly asked the daemon to stop.
pub const EXIT_COMMAND_CODE: i32 = 418;

pub const STARTED_MESSAGE: &str = "Running in the background.";

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    /// Poll the compiled-in keyboard backend.
    Keyboard,
    /// Read key names from stdin.
    Stdin,
}

/// Why the daemon stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonExit {
    Shutdown,
    ExitCommand,
}

impl DaemonExit {
    pub fn code(&self) -> i32 {
        match self {
            DaemonExit::Shutdown => 0,
            DaemonExit::ExitCommand => EXIT_COMMAND_CODE,
        }
    }
}

enum Collector {
    Keyboard(KeyCollectionModule),
    Lines(LineCollectionModule<BufReader<Stdin>>),
}

impl Collector {
    async fn run(self) -> Result<()> {
        match self {
            Collector::Keyboard(collector) => collector.run().await,
            Collector::Lines(collector) => collector.run().await,
        }
    }
}

/// Represents the starting point for the daemon
pub async fn start_daemon(config: Config, input: InputSource) -> Result<DaemonExit> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let notifier: Arc<dyn Notifier> = detect_notifier(config.notifications).into();

    let output_dir = match &config.output_dir {
        Some(dir) => dir.clone(),
        None => default_snapshot_dir()?,
    };
    // Writes into a missing directory are reported on every flush, there's no need to fail here.
    if let Err(e) = ensure_dir(&output_dir) {
        warn!("Failed to create snapshot directory {output_dir:?} {e:?}");
    }

    let tally = Arc::new(KeyTally::new(clock.time()));
    let writer = FileSnapshotWriter::new(&output_dir, &tally.session().snapshot_file_name());
    info!("Counting key presses into {:?}", writer.path());

    let shutdown_token = CancellationToken::new();
    let (sender, receiver) = mpsc::channel::<KeyEvent>(EVENT_CHANNEL_CAPACITY);
    let (control_sender, control_receiver) = mpsc::channel::<ControlCommand>(4);

    let collector = match input {
        InputSource::Keyboard => Collector::Keyboard(create_collector(
            sender,
            GenericKeyboardApi::new()?,
            &shutdown_token,
            &config,
        )),
        InputSource::Stdin => Collector::Lines(LineCollectionModule::new(
            sender,
            BufReader::new(tokio::io::stdin()),
            shutdown_token.clone(),
        )),
    };

    let (processor, control) = create_processor(
        tally,
        writer,
        &config,
        receiver,
        control_receiver,
        notifier.clone(),
        Box::new(SystemFileOpener::new()),
        clock,
        &shutdown_token,
    );

    notifier.notify(STARTED_MESSAGE);

    let (_, signal_result, collection_result, processing_result, control_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token.clone()),
        control::listen_for_signals(control_sender, shutdown_token.clone()),
        async {
            let result = collector.run().await;
            // Without input there's nothing left to count.
            shutdown_token.cancel();
            result
        },
        processor.run(),
        control.run(),
    );

    if let Err(signal_result) = signal_result {
        error!("Control signals are unavailable {:?}", signal_result);
    }

    if let Err(collection_result) = collection_result {
        error!("Collection module got an error {:?}", collection_result);
    }

    if let Err(processing_result) = processing_result {
        error!("Processing module got an error {:?}", processing_result);
    }

    let exit = control_result
        .inspect_err(|e| error!("Control module got an error {e:?}"))
        .unwrap_or(DaemonExit::Shutdown);
    info!("Daemon stopped with {exit:?}");
    Ok(exit)
}

fn create_collector(
    sender: mpsc::Sender<KeyEvent>,
    api: impl KeyboardApi + 'static,
    shutdown_token: &CancellationToken,
    config: &Config,
) -> KeyCollectionModule {
    KeyCollectionModule::new(
        sender,
        Box::new(api),
        shutdown_token.clone(),
        config.poll_interval(),
    )
}

#[allow(clippy::too_many_arguments)]
fn create_processor<W: SnapshotWriter>(
    tally: Arc<KeyTally>,
    writer: W,
    config: &Config,
    receiver: mpsc::Receiver<KeyEvent>,
    control_receiver: mpsc::Receiver<ControlCommand>,
    notifier: Arc<dyn Notifier>,
    file_opener: Box<dyn FileOpener>,
    clock: Arc<dyn Clock>,
    shutdown_token: &CancellationToken,
) -> (ProcessingModule<KeyCounter<W>>, ControlModule<W>) {
    let persister = Arc::new(Persister::new(
        tally.clone(),
        writer,
        notifier.clone(),
        clock.clone(),
    ));
    let counter = KeyCounter::new(
        tally,
        FlushPolicy::every(config.flush_frequency),
        persister.clone(),
    );
    let opener = SnapshotOpener::new(persister, file_opener, notifier, clock);

    (
        ProcessingModule::new(receiver, Arc::new(counter), config.worker_count()),
        ControlModule::new(control_receiver, Arc::new(opener), shutdown_token.clone()),
    )
}
