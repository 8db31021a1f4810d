use std::path::PathBuf;

use crate::consts::{DEFAULT_REGISTRY_NAME, DEPOT_DIR_NAME};

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("USERPROFILE").map(PathBuf::from)
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  std::env::var_os("HOME").map(PathBuf::from)
}

/// Returns the first entry of `JULIA_DEPOT_PATH`, falling back to `~/.julia`
pub fn depot_dir() -> Option<PathBuf> {
  if let Some(paths) = std::env::var_os("JULIA_DEPOT_PATH")
    && let Some(first) = std::env::split_paths(&paths).find(|p| !p.as_os_str().is_empty())
  {
    return Some(first);
  }
  home_dir().map(|home| home.join(DEPOT_DIR_NAME))
}

/// Returns the default location of the local package registry checkout
pub fn registry_dir() -> Option<PathBuf> {
  depot_dir().map(|depot| depot.join("registries").join(DEFAULT_REGISTRY_NAME))
}
