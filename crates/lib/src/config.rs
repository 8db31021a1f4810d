//! Runtime configuration from the environment.

use std::path::PathBuf;

use crate::consts::{DEFAULT_API_URL, DEFAULT_DOWNLOAD_HOST, DEFAULT_ORG, DEFAULT_OUTPUT_DIR};
use crate::platform::paths::registry_dir;
use crate::registry::Registry;

pub const API_URL_VAR: &str = "BUILDJL_API_URL";
pub const DOWNLOAD_HOST_VAR: &str = "BUILDJL_DOWNLOAD_HOST";
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const ORG_VAR: &str = "BUILDJL_ORG";
pub const REGISTRY_VAR: &str = "BUILDJL_REGISTRY";

#[derive(Debug, Clone)]
pub struct Config {
  /// Base URL of the release hosting API.
  pub api_url: String,
  /// Host that serves release downloads; the manifest's `bin_prefix` starts here.
  pub download_host: String,
  pub token: Option<String>,
  /// Organization that owns the wrapper repositories.
  pub org: String,
  /// Registry consulted when no tag is given. `None` if no location could be determined.
  pub registry: Option<Registry>,
  pub output_dir: PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      api_url: DEFAULT_API_URL.to_string(),
      download_host: DEFAULT_DOWNLOAD_HOST.to_string(),
      token: None,
      org: DEFAULT_ORG.to_string(),
      registry: registry_dir().map(Registry::Local),
      output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
    }
  }
}

impl Config {
  /// Build a configuration from `BUILDJL_*` and `GITHUB_TOKEN`. Empty values count as unset.
  pub fn from_env() -> Self {
    let defaults = Self::default();
    Self {
      api_url: env_var(API_URL_VAR).unwrap_or(defaults.api_url),
      download_host: env_var(DOWNLOAD_HOST_VAR).unwrap_or(defaults.download_host),
      token: env_var(TOKEN_VAR),
      org: env_var(ORG_VAR).unwrap_or(defaults.org),
      registry: env_var(REGISTRY_VAR)
        .map(|location| Registry::from_location(&location))
        .or(defaults.registry),
      output_dir: defaults.output_dir,
    }
  }

  /// Base URL the tarballs of `repo`'s release `tag` are served from.
  pub fn bin_prefix(&self, repo: &str, tag: &str) -> String {
    format!(
      "{}/{}/releases/download/{}",
      self.download_host.trim_end_matches('/'),
      repo,
      tag
    )
  }
}

fn env_var(name: &str) -> Option<String> {
  std::env::var(name).ok().filter(|value| !value.is_empty())
}
