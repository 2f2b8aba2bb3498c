//! Inverse of the plugin directory naming scheme.
//!
//! A cache entry is only a plugin if its directory name matches
//! `<kind>-<name>-v<version>` exactly; everything else in the cache root is
//! someone else's business and is skipped without comment.

use std::sync::LazyLock;

use {regex::Regex, semver::Version};

use crate::types::{PluginDescriptor, PluginKind};

/// Matches plugin directory names: `KIND-NAME-vVERSION`. The name may contain
/// hyphens but may not start or end with one.
#[allow(clippy::unwrap_used)] // constant pattern, compiles or nothing does
static PLUGIN_DIR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "^(?P<kind>[a-z]+)-\
         (?P<name>[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]|[a-zA-Z0-9])-\
         v(?P<version>[0-9]+\\.[0-9]+\\.[0-9]+(-[a-zA-Z0-9-_.]+)?)$",
    )
    .unwrap()
});

/// Parse a cache directory name back into a plugin descriptor.
///
/// Returns `None` — not an error — when the name does not look like a plugin
/// directory at all, the kind is not a recognized plugin kind, or the version
/// is not valid semver. Partially written or foreign directories are an
/// expected condition in the cache root.
pub fn parse_dir_name(dir_name: &str) -> Option<PluginDescriptor> {
    let captures = PLUGIN_DIR_REGEX.captures(dir_name)?;

    let kind: PluginKind = match captures["kind"].parse() {
        Ok(kind) => kind,
        Err(e) => {
            tracing::debug!(dir_name, %e, "skipping entry with invalid plugin kind");
            return None;
        },
    };
    let name = captures["name"].to_string();
    let version = match Version::parse(&captures["version"]) {
        Ok(version) => version,
        Err(e) => {
            tracing::debug!(dir_name, %e, "skipping entry with invalid plugin version");
            return None;
        },
    };

    Some(PluginDescriptor::new(kind, name, Some(version)))
}
