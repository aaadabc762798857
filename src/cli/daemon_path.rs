use std::path::{Path, PathBuf};

/// Path of the daemon binary installed next to the cli.
pub fn to_daemon_path(path: &Path) -> PathBuf {
    let mut path = path.to_path_buf();
    path.set_file_name("keycount-daemon");
    #[cfg(windows)]
    {
        path.set_extension("exe");
    }
    path
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::to_daemon_path;

    #[cfg(unix)]
    #[test]
    fn test_daemon_lives_next_to_cli() {
        assert_eq!(
            to_daemon_path(Path::new("/usr/local/bin/keycount")),
            Path::new("/usr/local/bin/keycount-daemon")
        );
    }
}
