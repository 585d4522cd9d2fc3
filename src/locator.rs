//! Where to look for the NDI runtime library.
//!
//! The official installers export the runtime directory through a versioned
//! environment variable (`NDI_RUNTIME_DIR_V3` for the v3 installer, up to
//! `NDI_RUNTIME_DIR_V6` for current ones). Every newer runtime still exports
//! the v3 bootstrap symbol, so all of them are acceptable.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variables consulted by default, newest runtime first.
pub const DEFAULT_ENV_VARS: &[&str] = &[
    "NDI_RUNTIME_DIR_V6",
    "NDI_RUNTIME_DIR_V5",
    "NDI_RUNTIME_DIR_V4",
    "NDI_RUNTIME_DIR_V3",
];

/// Platform file names of the runtime library, newest first.
#[cfg(all(target_arch = "x86_64", target_os = "windows"))]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["Processing.NDI.Lib.x64.dll"];
#[cfg(all(target_arch = "x86", target_os = "windows"))]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["Processing.NDI.Lib.x86.dll"];
#[cfg(target_os = "linux")]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &[
    "libndi.so.6",
    "libndi.so.5",
    "libndi.so.4",
    "libndi.so.3",
    "libndi.so",
];
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libndi.dylib"];
#[cfg(not(any(
    all(target_arch = "x86_64", target_os = "windows"),
    all(target_arch = "x86", target_os = "windows"),
    target_os = "linux",
    target_os = "macos",
)))]
pub const DEFAULT_LIBRARY_NAMES: &[&str] = &["libndi.so"];

/// Search configuration for [`NDI::load_with`](crate::NDI::load_with).
///
/// Candidates are produced in this order:
/// 1. every `extra_dirs` entry joined with every library name,
/// 2. every set environment variable's directory joined with every library name,
/// 3. the bare library names, resolved by the platform loader's search path
///    (only when `search_system_path` is set).
///
/// # Examples
///
/// ```
/// use ndi_dyn::LibraryLocator;
///
/// let locator = LibraryLocator::new()
///     .extra_dir("/opt/ndi/lib")
///     .library_names(["libndi.so.5"])
///     .search_system_path(false);
///
/// let candidates = locator.candidates_with(|_| None);
/// assert_eq!(candidates, vec![std::path::PathBuf::from("/opt/ndi/lib/libndi.so.5")]);
/// ```
#[derive(Debug, Clone)]
pub struct LibraryLocator {
    env_vars: Vec<String>,
    library_names: Vec<String>,
    extra_dirs: Vec<PathBuf>,
    search_system_path: bool,
}

impl Default for LibraryLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl LibraryLocator {
    /// Creates a locator with the platform defaults.
    pub fn new() -> Self {
        Self {
            env_vars: DEFAULT_ENV_VARS.iter().map(|s| s.to_string()).collect(),
            library_names: DEFAULT_LIBRARY_NAMES.iter().map(|s| s.to_string()).collect(),
            extra_dirs: Vec::new(),
            search_system_path: true,
        }
    }

    /// Replace the environment variables consulted for runtime directories.
    #[must_use]
    pub fn env_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_vars = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the library file names tried in each directory.
    #[must_use]
    pub fn library_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.library_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Add a directory searched before any environment variable.
    #[must_use]
    pub fn extra_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.extra_dirs.push(dir.into());
        self
    }

    /// Whether to finally try the bare names through the loader search path.
    #[must_use]
    pub fn search_system_path(mut self, enabled: bool) -> Self {
        self.search_system_path = enabled;
        self
    }

    /// Candidate paths using the process environment.
    pub fn candidates(&self) -> Vec<PathBuf> {
        self.candidates_with(|var| std::env::var_os(var))
    }

    /// Candidate paths using `lookup` to read environment variables.
    ///
    /// Variables that are unset or empty are skipped; duplicates are removed
    /// while keeping the first occurrence.
    pub fn candidates_with<F>(&self, lookup: F) -> Vec<PathBuf>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let env_dirs = self
            .env_vars
            .iter()
            .filter_map(|var| lookup(var.as_str()))
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let mut candidates: Vec<PathBuf> = Vec::new();
        for dir in self.extra_dirs.iter().cloned().chain(env_dirs) {
            for name in &self.library_names {
                push_unique(&mut candidates, dir.join(name));
            }
        }

        if self.search_system_path {
            for name in &self.library_names {
                push_unique(&mut candidates, Path::new(name).to_path_buf());
            }
        }

        candidates
    }
}

fn push_unique(candidates: &mut Vec<PathBuf>, path: PathBuf) {
    if !candidates.contains(&path) {
        candidates.push(path);
    }
}
