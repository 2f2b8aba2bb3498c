//! Metadata probing for installed plugin directories.
//!
//! Sizes and timestamps are descriptive only — they feed `plugin ls`-style
//! output and never influence resolution decisions.

use std::{io, path::Path, time::SystemTime};

/// Recursively sums the byte length of every regular file under `dir`.
///
/// A missing directory reports 0 rather than an error: scans and deletes may
/// race, and a plugin that vanished mid-probe is simply empty. Other I/O
/// errors propagate.
pub fn plugin_size(dir: &Path) -> anyhow::Result<u64> {
    let mut size = 0;
    for entry in walkdir::WalkDir::new(dir) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if is_not_found(&e) => continue,
            Err(e) => return Err(e.into()),
        };
        if entry.file_type().is_file() {
            match entry.metadata() {
                Ok(meta) => size += meta.len(),
                Err(e) if is_not_found(&e) => {},
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(size)
}

fn is_not_found(e: &walkdir::Error) -> bool {
    e.io_error()
        .is_some_and(|io| io.kind() == io::ErrorKind::NotFound)
}

/// Filesystem birth time of `path`, where the platform and filesystem expose
/// one. Linux before statx, and several filesystems, do not.
pub fn install_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.created().ok()
}

/// Last access time of `path`.
pub fn last_used_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).ok()?.accessed().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_sums_nested_regular_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("resource-aws-v1.0.0");
        std::fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        std::fs::write(dir.join("pulumi-resource-aws"), vec![0u8; 100]).unwrap();
        std::fs::write(dir.join("nested/data"), vec![0u8; 25]).unwrap();
        std::fs::write(dir.join("nested/deeper/more"), vec![0u8; 5]).unwrap();

        assert_eq!(plugin_size(&dir).unwrap(), 130);
    }

    #[test]
    fn test_size_of_missing_dir_is_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("never-installed");
        assert_eq!(plugin_size(&gone).unwrap(), 0);
    }

    #[test]
    fn test_size_counts_empty_dirs_as_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("plugin");
        std::fs::create_dir_all(dir.join("only/directories/here")).unwrap();
        assert_eq!(plugin_size(&dir).unwrap(), 0);
    }

    #[test]
    fn test_last_used_time_present_for_existing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(last_used_time(tmp.path()).is_some());
        assert!(last_used_time(&tmp.path().join("missing")).is_none());
    }
}
