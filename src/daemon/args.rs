use std::{ffi::OsString, num::NonZeroU64, path::PathBuf};

use anyhow::{anyhow, Result};
use clap::{Args, Parser};
use tracing::level_filters::LevelFilter;

use crate::utils::config::Config;

use super::InputSource;

#[derive(Parser, Debug)]
pub struct DaemonArgs {
    /// Run in the current process instead of detaching.
    #[arg(long)]
    pub force: bool,
    #[command(flatten)]
    pub serve: ServeOptions,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}

/// Options shared by the daemon binary and `keycount serve`.
#[derive(Args, Debug, Clone, Default)]
pub struct ServeOptions {
    #[arg(
        long,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    pub dir: Option<PathBuf>,
    #[arg(long = "output-dir", help = "Directory for snapshots. Defaults to the desktop")]
    pub output_dir: Option<PathBuf>,
    #[arg(
        long = "flush-frequency",
        help = "Write a snapshot every time this many key presses were counted"
    )]
    pub flush_frequency: Option<NonZeroU64>,
    #[arg(long, help = "Maximum amount of concurrently running key press handlers")]
    pub workers: Option<usize>,
    #[arg(long, help = "Read key names from stdin, one per line")]
    pub stdin: bool,
    #[arg(long = "no-notifications", help = "Don't show desktop notifications")]
    pub no_notifications: bool,
}

impl ServeOptions {
    /// Command line values win over the configuration file.
    pub fn apply(&self, config: &mut Config) {
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        if let Some(flush_frequency) = self.flush_frequency {
            config.flush_frequency = flush_frequency;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.no_notifications {
            config.notifications = false;
        }
    }

    /// Arguments reproducing these options for a spawned daemon.
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args = Vec::<OsString>::new();
        if let Some(dir) = &self.dir {
            args.extend(["--dir".into(), dir.into()]);
        }
        if let Some(output_dir) = &self.output_dir {
            args.extend(["--output-dir".into(), output_dir.into()]);
        }
        if let Some(flush_frequency) = self.flush_frequency {
            args.extend(["--flush-frequency".into(), flush_frequency.to_string().into()]);
        }
        if let Some(workers) = self.workers {
            args.extend(["--workers".into(), workers.to_string().into()]);
        }
        if self.stdin {
            args.push("--stdin".into());
        }
        if self.no_notifications {
            args.push("--no-notifications".into());
        }
        args
    }

    /// A detached daemon reads stdin from `/dev/null`, so piped key names would end right away.
    pub fn check_detached(&self) -> Result<()> {
        if self.stdin {
            return Err(anyhow!(
                "--stdin needs an attached input, use `keycount serve` or `keycount-daemon --force`"
            ));
        }
        Ok(())
    }

    pub fn input(&self) -> InputSource {
        if self.stdin {
            InputSource::Stdin
        } else {
            InputSource::Keyboard
        }
    }
}
