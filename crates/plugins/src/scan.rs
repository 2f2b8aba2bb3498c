//! Cache scanning: the read path over the filesystem-as-database.

use std::{io, path::Path};

use crate::{
    meta,
    parse::parse_dir_name,
    types::{PluginDescriptor, PluginInfo},
};

/// List every plugin installed under `root`.
///
/// Enumerates the immediate children of the cache root, keeps the directories
/// whose names parse as plugin directories, and attaches probe metadata to
/// each. Foreign or partially written entries are skipped silently. A missing
/// root yields an empty list; any other I/O error while reading it propagates.
///
/// Entries are processed in sorted directory-name order, so the result — and
/// anything derived from it, such as version resolution — is deterministic
/// for a given cache state.
pub fn list_plugins(root: &Path) -> anyhow::Result<Vec<PluginInfo>> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            tracing::debug!(entry = %entry.path().display(), "skipping file in plugin cache");
            continue;
        }
        names.push(entry.file_name());
    }
    names.sort();

    let mut plugins = Vec::new();
    for name in names {
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(descriptor) = parse_dir_name(name) else {
            tracing::debug!(name, "skipping cache entry that is not a plugin");
            continue;
        };

        let path = root.join(name);
        plugins.push(PluginInfo {
            size: meta::plugin_size(&path)?,
            install_time: meta::install_time(&path),
            last_used_time: meta::last_used_time(&path),
            descriptor,
            path,
        });
    }
    Ok(plugins)
}

/// Returns true iff the exact directory for `plugin` exists under `root`.
/// A pure presence check; it never consults the scan.
pub fn has_plugin(root: &Path, plugin: &PluginDescriptor) -> bool {
    plugin.dir_path(root).is_dir()
}

/// Returns true if `plugin` is installed at its version or greater.
///
/// An exact directory match short-circuits; otherwise the cache is scanned
/// for an entry with the same kind and name whose version is >= the requested
/// one. Unversioned records never satisfy the check.
pub fn has_plugin_gte(root: &Path, plugin: &PluginDescriptor) -> anyhow::Result<bool> {
    if has_plugin(root, plugin) {
        return Ok(true);
    }

    let installed = list_plugins(root)?;
    Ok(installed.iter().any(|p| {
        p.descriptor.kind == plugin.kind
            && p.descriptor.name == plugin.name
            && match (&p.descriptor.version, &plugin.version) {
                (Some(have), Some(want)) => have >= want,
                _ => false,
            }
    }))
}
