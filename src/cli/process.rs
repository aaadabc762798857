use std::{env, path::PathBuf, process::Stdio};

use anyhow::{anyhow, Result};
use sysinfo::{get_current_pid, Pid, Process, Signal, System};
use tracing::{info, warn};

use crate::daemon::args::ServeOptions;

use super::daemon_path::to_daemon_path;

/// Executables that can host a running daemon: the daemon binary itself and the cli running
/// `serve`.
pub fn daemon_executables() -> Result<Vec<PathBuf>> {
    let cli = env::current_exe()?;
    Ok(vec![to_daemon_path(&cli), cli])
}

/// Calls `action` for every other running process started from one of `names`.
fn for_each_daemon(names: &[PathBuf], mut action: impl FnMut(&Pid, &Process)) -> Result<usize> {
    let system = System::new_all();
    let current_id = get_current_pid().map_err(|e| anyhow!("Can't get current process id {e}"))?;
    let mut found = 0;
    for (pid, process) in system.processes().iter() {
        if *pid == current_id {
            continue;
        }
        if matches!(process.parent(), Some(p) if p == current_id) {
            continue;
        }

        if process
            .exe()
            .filter(|v| v.exists())
            .filter(|v| names.iter().any(|name| name.as_path() == *v))
            .is_some()
        {
            found += 1;
            action(pid, process);
        }
    }
    Ok(found)
}

/// Stops running daemons and waits for them to exit. On unix they receive SIGTERM and write their
/// final snapshot first.
pub fn kill_previous_servers(names: &[PathBuf]) -> Result<usize> {
    for_each_daemon(names, |pid, process| {
        info!("Stopping daemon {pid}");
        // This will forcefully terminate the process on Windows. Anything better will require a
        // lot more work.
        if process.kill_with(Signal::Term).is_none() {
            process.kill();
        }
        process.wait();
    })
}

/// Delivers `signal` to every running daemon.
pub fn signal_daemons(names: &[PathBuf], signal: Signal) -> Result<usize> {
    let mut unsupported = false;
    let found = for_each_daemon(names, |pid, process| {
        match process.kill_with(signal) {
            Some(true) => info!("Sent {signal:?} to {pid}"),
            Some(false) => warn!("Failed to send {signal:?} to {pid}"),
            None => unsupported = true,
        }
    })?;
    if unsupported {
        return Err(anyhow!("{signal:?} can't be sent on this platform"));
    }
    Ok(found)
}

/// Intended for shutting down previous daemons and starting a new one. The daemon binary detaches
/// itself, so it's only spawned here.
pub fn restart_server(options: &ServeOptions) -> Result<()> {
    options.check_detached()?;
    let names = daemon_executables()?;
    kill_previous_servers(&names)?;

    let daemon = &names[0];
    if !daemon.exists() {
        return Err(anyhow!("Daemon executable {daemon:?} is missing"));
    }
    let mut command = std::process::Command::new(daemon);
    command.args(options.to_args());

    #[cfg(feature = "win")]
    {
        use std::os::windows::process::CommandExt;
        use windows::Win32::System::Threading::DETACHED_PROCESS;
        command.creation_flags(DETACHED_PROCESS.0);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::null());

    println!("Spawning {daemon:?}");
    #[allow(clippy::zombie_processes)]
    let _ = command.spawn()?;
    println!("Success");
    Ok(())
}
