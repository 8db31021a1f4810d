//! Package registry lookup.
//!
//! Used only to pick a release tag when none is given: the newest
//! non-yanked version of the wrapper package names the release.
//!
//! A registry keeps one `Versions.toml` per package at
//! `<root>/<Initial>/<Package>/Versions.toml`, with one table per version:
//!
//! ```toml
//! ["1.2.11+0"]
//! git-tree-sha1 = "5a6a0df5f5d4b6e8a79a1d5ad9e7f3a1a0b1c2d3"
//!
//! ["1.2.11+1"]
//! git-tree-sha1 = "0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c"
//! yanked = true
//! ```

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use semver::Version;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::USER_AGENT;
use crate::util::version::parse_version;

const VERSIONS_FILE: &str = "Versions.toml";

#[derive(Debug, Error)]
pub enum RegistryError {
  #[error("failed to read {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse {location}: {source}")]
  Parse {
    location: String,
    #[source]
    source: toml::de::Error,
  },

  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{url} returned HTTP {status}")]
  Http { url: String, status: StatusCode },
}

#[derive(Debug, Deserialize)]
struct VersionEntry {
  #[serde(default)]
  yanked: bool,
}

/// Where registry metadata is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registry {
  /// A checkout on disk.
  Local(PathBuf),
  /// A raw-file HTTP endpoint serving the same layout.
  Remote(String),
}

impl Registry {
  /// `http://` and `https://` locations are remote, anything else is a path.
  pub fn from_location(location: &str) -> Self {
    if location.starts_with("http://") || location.starts_with("https://") {
      Self::Remote(location.trim_end_matches('/').to_string())
    } else {
      Self::Local(PathBuf::from(location))
    }
  }

  /// The highest non-yanked version of `package`, or `None` if the registry
  /// does not know the package or has no usable version of it.
  pub fn latest_version(&self, package: &str) -> Result<Option<Version>, RegistryError> {
    let segments = versions_path(package);
    let (location, contents) = match self {
      Self::Local(root) => {
        let path = segments.iter().fold(root.clone(), |path, segment| path.join(segment));
        debug!(path = %path.display(), "reading registry entry");
        match std::fs::read_to_string(&path) {
          Ok(contents) => (path.display().to_string(), contents),
          Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
          Err(source) => return Err(RegistryError::Io { path, source }),
        }
      }
      Self::Remote(base) => {
        let url = format!("{}/{}", base, segments.join("/"));
        debug!(url = %url, "fetching registry entry");
        match fetch_text(&url)? {
          Some(contents) => (url, contents),
          None => return Ok(None),
        }
      }
    };

    let entries: BTreeMap<String, VersionEntry> =
      toml::from_str(&contents).map_err(|source| RegistryError::Parse { location, source })?;
    Ok(latest_of(entries))
  }
}

/// Path segments of a package's `Versions.toml`, relative to the registry root.
fn versions_path(package: &str) -> Vec<String> {
  let initial = package
    .chars()
    .next()
    .map(|c| c.to_uppercase().to_string())
    .unwrap_or_default();
  vec![initial, package.to_string(), VERSIONS_FILE.to_string()]
}

fn latest_of(entries: BTreeMap<String, VersionEntry>) -> Option<Version> {
  entries
    .into_iter()
    .filter(|(_, entry)| !entry.yanked)
    .filter_map(|(key, _)| match parse_version(&key) {
      Ok(version) => Some(version),
      Err(e) => {
        warn!(version = %key, error = %e, "ignoring unparseable registry version");
        None
      }
    })
    .max()
}

fn fetch_text(url: &str) -> Result<Option<String>, RegistryError> {
  let client = Client::builder()
    .user_agent(USER_AGENT)
    .build()
    .map_err(RegistryError::Client)?;
  let request_error = |source| RegistryError::Request {
    url: url.to_string(),
    source,
  };

  let response = client.get(url).send().map_err(request_error)?;
  match response.status() {
    status if status.is_success() => response.text().map(Some).map_err(request_error),
    StatusCode::NOT_FOUND => Ok(None),
    status => Err(RegistryError::Http {
      url: url.to_string(),
      status,
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use mockito::Server;
  use std::fs;
  use tempfile::TempDir;

  const ZLIB_VERSIONS: &str = r#"
["1.2.11+0"]
git-tree-sha1 = "5a6a0df5f5d4b6e8a79a1d5ad9e7f3a1a0b1c2d3"

["1.2.11+9"]
git-tree-sha1 = "0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c"

["1.2.12+0"]
git-tree-sha1 = "1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d"

["1.2.13+0"]
git-tree-sha1 = "2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e"
yanked = true
"#;

  fn local_registry(package: &str, contents: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join(&package[..1]).join(package);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(VERSIONS_FILE), contents).unwrap();
    temp
  }

  #[test]
  fn location_selects_registry_kind() {
    assert_eq!(
      Registry::from_location("https://raw.example.com/General/"),
      Registry::Remote("https://raw.example.com/General".to_string())
    );
    assert_eq!(
      Registry::from_location("/home/user/.julia/registries/General"),
      Registry::Local(PathBuf::from("/home/user/.julia/registries/General"))
    );
  }

  #[test]
  fn initial_is_uppercased() {
    assert_eq!(versions_path("libpng_jll"), vec!["L", "libpng_jll", "Versions.toml"]);
  }

  #[test]
  fn latest_skips_yanked() {
    let temp = local_registry("Zlib_jll", ZLIB_VERSIONS);
    let registry = Registry::Local(temp.path().to_path_buf());
    assert_eq!(
      registry.latest_version("Zlib_jll").unwrap(),
      Some(Version::parse("1.2.12+0").unwrap())
    );
  }

  #[test]
  fn unknown_package_is_none() {
    let temp = TempDir::new().unwrap();
    let registry = Registry::Local(temp.path().to_path_buf());
    assert_eq!(registry.latest_version("Nope_jll").unwrap(), None);
  }

  #[test]
  fn all_yanked_is_none() {
    let temp = local_registry("Old_jll", "[\"1.0.0\"]\nyanked = true\n");
    let registry = Registry::Local(temp.path().to_path_buf());
    assert_eq!(registry.latest_version("Old_jll").unwrap(), None);
  }

  #[test]
  fn malformed_toml_is_a_parse_error() {
    let temp = local_registry("Bad_jll", "this is not toml = = =");
    let registry = Registry::Local(temp.path().to_path_buf());
    let err = registry.latest_version("Bad_jll").unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }));
  }

  #[test]
  fn remote_registry_is_fetched_over_http() {
    let mut server = Server::new();
    let _m = server
      .mock("GET", "/Z/Zlib_jll/Versions.toml")
      .with_status(200)
      .with_body(ZLIB_VERSIONS)
      .create();
    let _missing = server.mock("GET", "/N/Nope_jll/Versions.toml").with_status(404).create();

    let registry = Registry::from_location(&server.url());
    assert_eq!(
      registry.latest_version("Zlib_jll").unwrap(),
      Some(Version::parse("1.2.12+0").unwrap())
    );
    assert_eq!(registry.latest_version("Nope_jll").unwrap(), None);
  }
}
