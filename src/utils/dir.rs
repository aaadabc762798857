use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};

const APPLICATION_NAME: &str = "keycount";

/// Directory used for logs and the configuration file.
pub fn create_application_default_path() -> Result<PathBuf> {
    let path = {
        #[cfg(windows)]
        {
            let mut path = PathBuf::from(
                env::var("APPDATA").context("APPDATA should be present on Windows")?,
            );
            path.push(APPLICATION_NAME);
            path
        }
        #[cfg(target_os = "linux")]
        {
            let mut path = env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .map_err(|_| anyhow!("Couldn't find neither XDG_STATE_HOME nor HOME"))?;
            path.push(APPLICATION_NAME);
            path
        }
        #[cfg(not(any(windows, target_os = "linux")))]
        {
            let mut path = home_dir()?;
            path.push("Library/Application Support");
            path.push(APPLICATION_NAME);
            path
        }
    };

    ensure_dir(&path)?;
    Ok(path)
}

/// The user's desktop. Snapshots land here unless configured otherwise.
pub fn default_snapshot_dir() -> Result<PathBuf> {
    Ok(home_dir()?.join("Desktop"))
}

fn home_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    let variable = "USERPROFILE";
    #[cfg(not(windows))]
    let variable = "HOME";

    env::var(variable)
        .map(PathBuf::from)
        .map_err(|_| anyhow!("Couldn't find home directory, {variable} is not set"))
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    match std::fs::create_dir_all(path) {
        Ok(_) => Ok(()),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(v) => Err(v.into()),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::ensure_dir;

    #[test]
    fn test_ensure_dir_nested_and_existing() -> Result<()> {
        let dir = tempdir()?;
        let nested = dir.path().join("a").join("b");

        ensure_dir(&nested)?;
        ensure_dir(&nested)?;

        assert!(nested.is_dir());
        Ok(())
    }
}
