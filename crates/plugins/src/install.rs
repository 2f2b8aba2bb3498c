//! Plugin installation and removal.
//!
//! An install consumes a gzip-compressed tarball stream and expands it into
//! the plugin's cache directory. Extraction goes through a staging directory
//! beside the final location and is renamed into place only on success, so a
//! failed install never leaves a half-written directory for the scanner to
//! find.

use std::{
    fs,
    io::{self, Read},
    path::{Component, Path, PathBuf},
};

use anyhow::Context;

use crate::types::PluginDescriptor;

/// The default cache root for the current user: `~/.stratus/plugins`.
pub fn default_plugins_root() -> anyhow::Result<PathBuf> {
    stratus_workspace::plugins_dir().context("resolving the plugin cache root")
}

/// Install a plugin's tarball into the cache under `root`.
///
/// `tarball` must be a gzip-compressed tar stream containing only directory
/// and regular-file entries; any other entry type (symlink, hard link,
/// device, …) aborts the install. The stream is consumed and dropped on every
/// exit path. On success the staged extraction atomically replaces any
/// existing directory for the same descriptor.
pub fn install(root: &Path, plugin: &PluginDescriptor, tarball: impl Read) -> anyhow::Result<()> {
    fs::create_dir_all(root)
        .with_context(|| format!("creating plugin cache root {}", root.display()))?;

    let staging = tempfile::Builder::new()
        .prefix(".staging-")
        .tempdir_in(root)
        .context("creating staging directory")?;
    set_owner_only(staging.path())?;

    extract(tarball, staging.path()).with_context(|| format!("installing plugin {plugin}"))?;

    // Move the fully extracted tree into place. An existing directory for the
    // same descriptor is replaced, not merged.
    let dest = plugin.dir_path(root);
    match fs::remove_dir_all(&dest) {
        Ok(()) => {},
        Err(e) if e.kind() == io::ErrorKind::NotFound => {},
        Err(e) => {
            return Err(e)
                .with_context(|| format!("replacing existing plugin directory {}", dest.display()));
        },
    }
    let staged = staging.keep();
    if let Err(e) = fs::rename(&staged, &dest) {
        let _ = fs::remove_dir_all(&staged);
        return Err(e)
            .with_context(|| format!("moving plugin {plugin} into {}", dest.display()));
    }

    tracing::info!(%plugin, dest = %dest.display(), "installed plugin");
    Ok(())
}

/// Remove the plugin's directory tree from the cache. Idempotent: deleting a
/// plugin that is not installed is not an error.
pub fn delete(root: &Path, plugin: &PluginDescriptor) -> anyhow::Result<()> {
    let dir = plugin.dir_path(root);
    match fs::remove_dir_all(&dir) {
        Ok(()) => {
            tracing::info!(%plugin, dir = %dir.display(), "deleted plugin");
            Ok(())
        },
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("deleting plugin directory {}", dir.display())),
    }
}

fn extract(tarball: impl Read, target: &Path) -> anyhow::Result<()> {
    let decoder = flate2::read::GzDecoder::new(tarball);
    let mut archive = tar::Archive::new(decoder);

    for entry in archive.entries().context("unzipping plugin archive")? {
        let mut entry = entry.context("untarring plugin archive")?;
        let path = entry.path().context("reading archive entry path")?.into_owned();
        let Some(relative) = sanitize_entry_path(&path)? else {
            continue;
        };
        let dest = target.join(&relative);

        let entry_type = entry.header().entry_type();
        if entry_type.is_dir() {
            // Non-fatal if it already exists.
            fs::create_dir_all(&dest)
                .with_context(|| format!("untarring dir {}", path.display()))?;
            continue;
        }
        if !entry_type.is_file() {
            anyhow::bail!(
                "unsupported entry type {:?} for {} in plugin archive",
                entry_type,
                path.display()
            );
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }

        // Open-or-create without truncation, apply the archived permission
        // bits, and copy the entry's bytes verbatim.
        let mut file = fs::OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&dest)
            .with_context(|| format!("opening file {} for untar", path.display()))?;
        #[cfg(unix)]
        if let Ok(mode) = entry.header().mode() {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(mode))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        io::copy(&mut entry, &mut file)
            .with_context(|| format!("untarring file {}", path.display()))?;
    }
    Ok(())
}

/// Normalize an archive entry path, rejecting anything that could escape the
/// extraction directory. Entries that normalize to nothing are skipped.
fn sanitize_entry_path(path: &Path) -> anyhow::Result<Option<PathBuf>> {
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {},
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                anyhow::bail!("archive contains unsafe path component: {}", path.display());
            },
        }
    }
    if clean.as_os_str().is_empty() {
        return Ok(None);
    }
    Ok(Some(clean))
}

#[cfg(unix)]
fn set_owner_only(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o700))
        .with_context(|| format!("restricting permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn set_owner_only(_path: &Path) -> anyhow::Result<()> {
    Ok(())
}
