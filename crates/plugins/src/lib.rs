//! Plugin cache: naming, discovery, version resolution, and installation.
//!
//! Plugins are versioned external executables (language hosts, resource
//! providers, analyzers) that stratus shells out to at runtime. Each one
//! installs into its own directory under the cache root (by default
//! `~/.stratus/plugins/<kind>-<name>-v<version>/`), and the primary loadable
//! executable inside it is named `pulumi-<kind>-<name>`, following the Pulumi
//! plugin packaging convention for ecosystem compatibility.
//!
//! There is no index file: the directory tree *is* the database. Every read
//! path rescans the cache root, and all operations take the root as an
//! explicit parameter so tests can point at an isolated temporary directory.

pub mod install;
pub mod meta;
pub mod parse;
pub mod resolve;
pub mod scan;
pub mod types;

pub use {
    install::{default_plugins_root, delete, install},
    resolve::{ResolvedPlugin, get_plugin_path},
    scan::{has_plugin, has_plugin_gte, list_plugins},
    types::{PluginDescriptor, PluginInfo, PluginKind},
};
