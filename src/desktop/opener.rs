use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

#[cfg(not(windows))]
use super::find_program;

/// Opens files with the program the user configured as default for them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileOpener: Send + Sync {
    /// Whether the host can open files at all.
    fn is_supported(&self) -> bool;

    async fn open(&self, path: &Path) -> Result<()>;
}

/// [FileOpener] backed by `xdg-open`, `open` or `start` depending on the platform.
pub struct SystemFileOpener {
    program: Option<PathBuf>,
}

impl SystemFileOpener {
    pub fn new() -> Self {
        #[cfg(windows)]
        let program = Some(PathBuf::from("cmd"));
        #[cfg(target_os = "macos")]
        let program = find_program("open");
        #[cfg(not(any(windows, target_os = "macos")))]
        let program = find_program("xdg-open");

        Self::with_program(program)
    }

    pub fn with_program(program: Option<PathBuf>) -> Self {
        Self { program }
    }
}

impl Default for SystemFileOpener {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileOpener for SystemFileOpener {
    fn is_supported(&self) -> bool {
        self.program.is_some()
    }

    async fn open(&self, path: &Path) -> Result<()> {
        let program = self
            .program
            .as_ref()
            .ok_or_else(|| anyhow!("No program for opening files is available"))?;
        debug!("Opening {path:?} with {program:?}");

        let mut command = Command::new(program);
        if cfg!(windows) {
            command.args(["/C", "start", ""]);
        }
        command
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // The launcher hands the file over to the real program and exits right away.
        let status = command.status().await?;
        if !status.success() {
            return Err(anyhow!("{program:?} exited with {status}"));
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::path::Path;

    use crate::desktop::find_program;

    use super::{FileOpener, SystemFileOpener};

    #[tokio::test]
    async fn test_open_waits_for_launcher() {
        let opener = SystemFileOpener::with_program(find_program("true"));
        assert!(opener.is_supported());
        assert!(opener.open(Path::new("/tmp/snapshot.txt")).await.is_ok());

        let failing = SystemFileOpener::with_program(find_program("false"));
        assert!(failing.open(Path::new("/tmp/snapshot.txt")).await.is_err());
    }

    #[tokio::test]
    async fn test_open_without_program() {
        let opener = SystemFileOpener::with_program(None);
        assert!(!opener.is_supported());
        assert!(opener.open(Path::new("/tmp/snapshot.txt")).await.is_err());
    }
}
