//! Collaborators provided by the user's desktop session: short notifications and opening files
//! with their default program. Both are optional capabilities, the daemon works without them.

pub mod notifier;
pub mod opener;

use std::{env, path::PathBuf};

/// Looks for an executable named `program` in `PATH`.
pub(crate) fn find_program(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}
