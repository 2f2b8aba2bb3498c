//! Version-aware plugin resolution.
//!
//! Resolution answers "which executable do I run for this (kind, name)
//! request" in two steps: a development override on the executable search
//! path wins outright, otherwise the best installed cache entry is chosen.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use semver::Version;

use crate::{
    scan,
    types::{PluginDescriptor, PluginInfo, PluginKind},
};

/// Where a plugin request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedPlugin {
    /// Found on the executable search path. Bypasses the cache entirely and
    /// carries no version information.
    PathOverride(PathBuf),
    /// Found in the plugin cache.
    Cached { dir: PathBuf, path: PathBuf },
}

impl ResolvedPlugin {
    /// The executable to run.
    pub fn path(&self) -> &Path {
        match self {
            Self::PathOverride(path) => path,
            Self::Cached { path, .. } => path,
        }
    }

    /// The plugin directory, for cache hits only.
    pub fn dir(&self) -> Option<&Path> {
        match self {
            Self::PathOverride(_) => None,
            Self::Cached { dir, .. } => Some(dir),
        }
    }
}

/// Resolve a plugin's executable by kind, name, and optional minimum version.
///
/// If an unversioned `pulumi-<kind>-<name>` executable is present on the
/// process's `PATH`, it is returned immediately with no version comparison —
/// the development escape hatch. Otherwise the cache under `root` is scanned
/// and the best matching installed version is selected; see
/// [`get_plugin_path_in`] for the selection rules. A missing plugin is
/// `Ok(None)`, not an error.
pub fn get_plugin_path(
    root: &Path,
    kind: PluginKind,
    name: &str,
    min_version: Option<&Version>,
) -> anyhow::Result<Option<ResolvedPlugin>> {
    let search_path = std::env::var_os("PATH");
    get_plugin_path_in(root, kind, name, min_version, search_path.as_deref())
}

/// [`get_plugin_path`] with an explicit executable search path.
///
/// The search path is a parameter (rather than read from the environment at
/// the bottom of the stack) so callers and tests can resolve against an
/// isolated path without mutating process-global state.
pub fn get_plugin_path_in(
    root: &Path,
    kind: PluginKind,
    name: &str,
    min_version: Option<&Version>,
    search_path: Option<&OsStr>,
) -> anyhow::Result<Option<ResolvedPlugin>> {
    let descriptor = PluginDescriptor::new(kind, name, None);

    // Development override: an unversioned executable on the search path wins
    // over anything installed, regardless of the requested minimum.
    let filename = descriptor.file_prefix();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if let Some(paths) = search_path
        && let Ok(path) = which::which_in(&filename, Some(paths), &cwd)
    {
        tracing::debug!(%kind, name, path = %path.display(), "plugin found on search path");
        return Ok(Some(ResolvedPlugin::PathOverride(path)));
    }

    let installed = scan::list_plugins(root)?;
    let mut selected: Option<PluginInfo> = None;
    for candidate in installed
        .into_iter()
        .filter(|p| p.descriptor.kind == kind && p.descriptor.name == name)
    {
        // Candidates arrive in sorted directory-name order. A candidate is
        // adopted when any of the following holds; note that "strictly newer
        // than the current selection" deliberately does not re-check the
        // requested minimum, preserving the long-standing selection rules.
        let adopt = match &selected {
            None => min_version.is_none() || meets_floor(&candidate, min_version),
            Some(current) => {
                current.descriptor.version.is_none()
                    || strictly_newer(&candidate, current)
                    || meets_floor(&candidate, min_version)
            },
        };
        if adopt {
            tracing::debug!(
                %kind,
                name,
                version = ?candidate.descriptor.version,
                "found candidate plugin"
            );
            selected = Some(candidate);
        }
    }

    let Some(best) = selected else {
        tracing::debug!(%kind, name, ?min_version, "no matching plugin installed");
        return Ok(None);
    };
    let dir = best.descriptor.dir_path(root);
    let path = best.descriptor.file_path(root);
    tracing::debug!(%kind, name, path = %path.display(), "plugin found in cache");
    Ok(Some(ResolvedPlugin::Cached { dir, path }))
}

fn strictly_newer(candidate: &PluginInfo, current: &PluginInfo) -> bool {
    match (&candidate.descriptor.version, &current.descriptor.version) {
        (Some(candidate), Some(current)) => candidate > current,
        _ => false,
    }
}

fn meets_floor(candidate: &PluginInfo, min_version: Option<&Version>) -> bool {
    match (&candidate.descriptor.version, min_version) {
        (Some(have), Some(want)) => have >= want,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use {std::ffi::OsString, tempfile::TempDir};

    use super::*;

    fn ver(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    fn fake_install(root: &Path, dir_name: &str) {
        let dir = root.join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("payload"), b"x").unwrap();
    }

    /// An empty search path, so tests never resolve against the real `PATH`.
    fn no_override() -> (TempDir, OsString) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().as_os_str().to_os_string();
        (tmp, path)
    }

    fn resolve(
        root: &Path,
        name: &str,
        min: Option<&str>,
        search_path: &OsStr,
    ) -> Option<ResolvedPlugin> {
        let min = min.map(ver);
        get_plugin_path_in(
            root,
            PluginKind::Resource,
            name,
            min.as_ref(),
            Some(search_path),
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_single_installed_version() {
        let cache = tempfile::tempdir().unwrap();
        let (_guard, path) = no_override();
        fake_install(cache.path(), "resource-aws-v1.0.0");

        let resolved = resolve(cache.path(), "aws", None, &path).unwrap();
        assert_eq!(
            resolved.dir(),
            Some(cache.path().join("resource-aws-v1.0.0").as_path())
        );
        assert!(resolved.path().starts_with(cache.path()));
        assert!(
            resolved
                .path()
                .to_string_lossy()
                .contains("pulumi-resource-aws")
        );
    }

    #[test]
    fn test_resolve_picks_latest_without_minimum() {
        let cache = tempfile::tempdir().unwrap();
        let (_guard, path) = no_override();
        fake_install(cache.path(), "resource-aws-v1.0.0");
        fake_install(cache.path(), "resource-aws-v1.5.0");
        fake_install(cache.path(), "resource-aws-v2.0.0");

        let resolved = resolve(cache.path(), "aws", None, &path).unwrap();
        assert_eq!(
            resolved.dir(),
            Some(cache.path().join("resource-aws-v2.0.0").as_path())
        );
    }

    #[test]
    fn test_resolve_honors_minimum_version() {
        let cache = tempfile::tempdir().unwrap();
        let (_guard, path) = no_override();
        fake_install(cache.path(), "resource-aws-v1.0.0");
        fake_install(cache.path(), "resource-aws-v1.5.0");
        fake_install(cache.path(), "resource-aws-v2.0.0");

        let resolved = resolve(cache.path(), "aws", Some("1.5.0"), &path).unwrap();
        let dir = resolved.dir().unwrap().to_string_lossy().into_owned();
        let version = dir.rsplit_once("-v").map(|(_, v)| ver(v)).unwrap();
        assert!(version >= ver("1.5.0"));
    }

    #[test]
    fn test_resolve_unsatisfiable_minimum_is_none() {
        let cache = tempfile::tempdir().unwrap();
        let (_guard, path) = no_override();
        fake_install(cache.path(), "resource-aws-v1.0.0");
        fake_install(cache.path(), "resource-aws-v2.0.0");

        assert!(resolve(cache.path(), "aws", Some("3.0.0"), &path).is_none());
    }

    #[test]
    fn test_resolve_ignores_other_kinds_and_names() {
        let cache = tempfile::tempdir().unwrap();
        let (_guard, path) = no_override();
        fake_install(cache.path(), "language-aws-v1.0.0");
        fake_install(cache.path(), "resource-azure-v1.0.0");

        assert!(resolve(cache.path(), "aws", None, &path).is_none());
    }

    #[test]
    fn test_resolve_empty_cache_is_none() {
        let cache = tempfile::tempdir().unwrap();
        let (_guard, path) = no_override();
        assert!(resolve(cache.path(), "aws", None, &path).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_prefers_search_path_override() {
        use std::os::unix::fs::PermissionsExt;

        let cache = tempfile::tempdir().unwrap();
        fake_install(cache.path(), "resource-aws-v9.9.9");

        let bin = tempfile::tempdir().unwrap();
        let exe = bin.path().join("pulumi-resource-aws");
        std::fs::write(&exe, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Even with a minimum version requested, the override wins and the
        // cache is never consulted.
        let resolved = resolve(cache.path(), "aws", Some("1.0.0"), bin.path().as_os_str()).unwrap();
        assert_eq!(resolved, ResolvedPlugin::PathOverride(exe));
        assert!(resolved.dir().is_none());
    }
}
