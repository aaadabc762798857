use std::path::PathBuf;

use tracing::{info, warn};

use super::find_program;

pub const APPLICATION_TITLE: &str = "Key press counter";

/// Sink for short messages shown to the user. Notifying is fire-and-forget and never fails from
/// the caller's point of view.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Used when the host has no way of showing notifications.
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, message: &str) {
        info!("Notification suppressed: {message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotificationProgram {
    NotifySend,
    Osascript,
}

/// Shows notifications by spawning the desktop's notification program.
pub struct DesktopNotifier {
    program: PathBuf,
    kind: NotificationProgram,
}

impl DesktopNotifier {
    /// Returns [None] if no supported notification program is installed.
    pub fn detect() -> Option<Self> {
        if cfg!(target_os = "macos") {
            find_program("osascript").map(|program| Self {
                program,
                kind: NotificationProgram::Osascript,
            })
        } else {
            find_program("notify-send").map(|program| Self {
                program,
                kind: NotificationProgram::NotifySend,
            })
        }
    }

    fn command(&self, message: &str) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.program);
        match self.kind {
            NotificationProgram::NotifySend => {
                command.args(["--app-name", APPLICATION_TITLE, APPLICATION_TITLE, message]);
            }
            NotificationProgram::Osascript => {
                let script = format!(
                    "display notification {:?} with title {:?}",
                    message, APPLICATION_TITLE
                );
                command.args(["-e", &script]);
            }
        }
        command
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true);
        command
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, message: &str) {
        info!("Notifying user: {message}");
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("Can't show notification outside of the runtime: {message}");
            return;
        };

        // Spawning has to happen inside the runtime, the child is awaited in the background so
        // it doesn't linger as a zombie.
        let _guard = runtime.enter();
        match self.command(message).spawn() {
            Ok(mut child) => {
                runtime.spawn(async move {
                    if let Err(e) = child.wait().await {
                        warn!("Notification process failed {e:?}");
                    }
                });
            }
            Err(e) => warn!("Failed to spawn notification process {e:?}"),
        }
    }
}

/// Picks the notifier for the current host. Notifications that are disabled or unsupported
/// degrade to [NoopNotifier] instead of being checked at every call site.
pub fn detect_notifier(enabled: bool) -> Box<dyn Notifier> {
    if !enabled {
        info!("Notifications are disabled");
        return Box::new(NoopNotifier);
    }
    match DesktopNotifier::detect() {
        Some(notifier) => {
            info!("Using {:?} for notifications", notifier.program);
            Box::new(notifier)
        }
        None => {
            warn!("No notification program found, notifications will only be logged");
            Box::new(NoopNotifier)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{detect_notifier, NoopNotifier, Notifier};

    #[test]
    fn test_noop_notifier_never_panics() {
        NoopNotifier.notify("Running in the background.");
    }

    #[test]
    fn test_disabled_notifications_outside_runtime() {
        // Disabled notifier must be usable without a runtime.
        detect_notifier(false).notify("Running in the background.");
    }
}
