//! Workspace bookkeeping paths.
//!
//! Everything stratus stores on a machine lives under `~/.stratus/`; this
//! crate owns the path segment constants and resolves them against the user's
//! home directory so other crates never hard-code them.

use std::path::PathBuf;

use thiserror::Error;

/// Directory under the user home that holds all stratus bookkeeping state.
pub const BOOKKEEPING_DIR: &str = ".stratus";

/// Directory under [`BOOKKEEPING_DIR`] that holds installed plugins.
pub const PLUGINS_DIR: &str = "plugins";

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not determine the current user's home directory")]
    NoHomeDir,
}

/// Returns the bookkeeping directory for the current user (`~/.stratus`).
pub fn bookkeeping_dir() -> Result<PathBuf, Error> {
    let dirs = directories::UserDirs::new().ok_or(Error::NoHomeDir)?;
    Ok(dirs.home_dir().join(BOOKKEEPING_DIR))
}

/// Returns the directory in which plugins on the current machine are managed
/// (`~/.stratus/plugins`).
pub fn plugins_dir() -> Result<PathBuf, Error> {
    Ok(bookkeeping_dir()?.join(PLUGINS_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugins_dir_under_bookkeeping_dir() {
        let plugins = plugins_dir().unwrap();
        assert!(plugins.ends_with(format!("{BOOKKEEPING_DIR}/{PLUGINS_DIR}")));
        assert_eq!(plugins.parent(), bookkeeping_dir().ok().as_deref());
    }
}
