use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
    time::SystemTime,
};

use {
    semver::Version,
    serde::{Deserialize, Serialize},
    thiserror::Error,
};

// ── Plugin kind ──────────────────────────────────────────────────────────────

/// The category of a plugin that may be dynamically loaded and run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// A resource analyzer, run against a stack before deployment.
    Analyzer,
    /// A language host that executes programs for one runtime.
    Language,
    /// A resource provider implementing CRUD for a cloud or service.
    Resource,
}

impl PluginKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Analyzer => "analyzer",
            Self::Language => "language",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown plugin kind '{0}'")]
pub struct UnknownPluginKind(pub String);

impl FromStr for PluginKind {
    type Err = UnknownPluginKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analyzer" => Ok(Self::Analyzer),
            "language" => Ok(Self::Language),
            "resource" => Ok(Self::Resource),
            other => Err(UnknownPluginKind(other.to_string())),
        }
    }
}

// ── Descriptor ───────────────────────────────────────────────────────────────

/// The (kind, name, version) identity of a plugin.
///
/// Names are non-empty, alphanumeric plus interior hyphens. The version is
/// optional on the descriptor itself, but a plugin directory is only
/// recognized by the cache scanner when it carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub kind: PluginKind,
    pub name: String,
    pub version: Option<Version>,
}

impl PluginDescriptor {
    pub fn new(kind: PluginKind, name: impl Into<String>, version: Option<Version>) -> Self {
        Self {
            kind,
            name: name.into(),
            version,
        }
    }

    /// The cache directory name for this plugin: `<kind>-<name>`, plus
    /// `-v<version>` when a version is present.
    pub fn dir_name(&self) -> String {
        let mut dir = format!("{}-{}", self.kind, self.name);
        if let Some(version) = &self.version {
            dir.push_str(&format!("-v{version}"));
        }
        dir
    }

    /// The executable name without the platform suffix. The search-path
    /// override looks this up directly, so it never embeds a version.
    pub fn file_prefix(&self) -> String {
        format!("pulumi-{}-{}", self.kind, self.name)
    }

    /// Platform executable suffix: empty everywhere except Windows.
    pub fn file_suffix() -> &'static str {
        if cfg!(windows) { ".exe" } else { "" }
    }

    /// The expected name of the plugin's primary executable.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.file_prefix(), Self::file_suffix())
    }

    /// The directory this plugin occupies under `root`.
    pub fn dir_path(&self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }

    /// The full path of the plugin's primary executable under `root`.
    pub fn file_path(&self, root: &Path) -> PathBuf {
        self.dir_path(root).join(self.file_name())
    }
}

impl fmt::Display for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, "-{version}")?;
        }
        Ok(())
    }
}

// ── Installed plugin record ──────────────────────────────────────────────────

/// An installed plugin as discovered by a cache scan: its identity plus
/// attributes derived from the directory itself. Never persisted — the
/// filesystem layout is the record, and a fresh scan rebuilds it.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub descriptor: PluginDescriptor,
    /// Absolute path of the plugin directory.
    pub path: PathBuf,
    /// Total size of the plugin directory, in bytes.
    pub size: u64,
    /// Filesystem birth time of the directory, where the platform exposes it.
    pub install_time: Option<SystemTime>,
    /// Last access time of the directory.
    pub last_used_time: Option<SystemTime>,
}
