//! Release tarball name parsing.
//!
//! Binary tarballs are named `<name>.v<version>.<triplet>.tar.gz`, for example
//! `Zlib.v1.2.11.x86_64-linux-gnu.tar.gz`. This module recovers the three
//! parts and classifies the triplet.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;
use thiserror::Error;
use tracing::warn;

use crate::consts::SCRIPT_EXTENSION;
use crate::platform::{Platform, PlatformError, parse_triplet};
use crate::util::version::parse_version;

/// Everything after a `<name>.v` split: `<version>.<triplet>.tar.gz`.
static TARBALL_TAIL: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(.*?)\.([^.\-]+-[^.\-]+-(?:[^\-]+-){0,2}[^\-]+)\.tar\.gz$").expect("tarball name pattern is valid")
});

/// Errors that can occur while parsing a tarball name.
#[derive(Debug, Error)]
pub enum TarballError {
  /// The filename does not have the `<name>.v<version>.<triplet>.tar.gz` shape.
  #[error("could not parse name, version and platform from '{0}'")]
  NoMatch(String),

  #[error("invalid version '{version}' in '{filename}': {source}")]
  Version {
    filename: String,
    version: String,
    #[source]
    source: semver::Error,
  },

  #[error(transparent)]
  Platform(#[from] PlatformError),

  /// Host fallback was requested but this machine has no descriptor.
  #[error("current platform is not supported")]
  UnsupportedHost,
}

impl TarballError {
  /// True when the name itself is unusable, as opposed to naming an unknown platform.
  pub fn is_unparseable_name(&self) -> bool {
    matches!(self, Self::NoMatch(_) | Self::Version { .. })
  }
}

/// The parts recovered from a tarball filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarballName {
  pub name: String,
  pub version: Version,
  pub triplet: String,
  pub platform: Platform,
}

/// What to do when a platform cannot be extracted from a filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractPolicy {
  /// Propagate the error.
  #[default]
  Strict,
  /// Log a warning and substitute the descriptor of the running machine.
  HostFallback,
}

/// Parse a tarball filename (or path; only the basename is considered).
pub fn parse_tarball_name(filename: &str) -> Result<TarballName, TarballError> {
  let basename = Path::new(filename)
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| filename.to_string());

  // Names may themselves contain `.v` (`lib.vpx`), so try each split in turn
  // and keep the first whose version parses.
  let mut version_error = None;
  for (at, _) in basename.match_indices(".v") {
    let (name, tail) = (&basename[..at], &basename[at + 2..]);
    let Some(captures) = TARBALL_TAIL.captures(tail) else {
      continue;
    };

    let version_str = &captures[1];
    match parse_version(version_str) {
      Ok(version) => {
        let triplet = captures[2].to_string();
        let platform = parse_triplet(&triplet)?;
        return Ok(TarballName {
          name: name.to_string(),
          version,
          triplet,
          platform,
        });
      }
      Err(source) => {
        version_error.get_or_insert(TarballError::Version {
          filename: basename.clone(),
          version: version_str.to_string(),
          source,
        });
      }
    }
  }

  Err(version_error.unwrap_or(TarballError::NoMatch(basename)))
}

/// Extract only the platform of a tarball, applying `policy` on failure.
pub fn extract_platform(filename: &str, policy: ExtractPolicy) -> Result<Platform, TarballError> {
  match parse_tarball_name(filename) {
    Ok(parsed) => Ok(parsed.platform),
    Err(err) => match policy {
      ExtractPolicy::Strict => Err(err),
      ExtractPolicy::HostFallback => {
        let host = Platform::current().ok_or(TarballError::UnsupportedHost)?;
        warn!(filename, error = %err, host = %host, "could not extract platform, falling back to host platform");
        Ok(host)
      }
    },
  }
}

/// Release helper scripts (`build*.jl`) are never binary tarballs.
pub fn is_build_script(filename: &str) -> bool {
  filename.starts_with("build") && filename.ends_with(SCRIPT_EXTENSION)
}
