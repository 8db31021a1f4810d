//! Release asset fetching.
//!
//! Lists the assets of a tagged release through the hosting API, picks the
//! binary tarballs, downloads them into a scratch directory and records the
//! SHA-256 of each one against the platform its filename names.
//!
//! The scratch directory is a [`tempfile::TempDir`]: it is removed when
//! [`fetch_product_hashes`] returns, whether the fetch succeeded or not.

mod download;

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::consts::{APP_NAME, USER_AGENT};
use crate::platform::Platform;
use crate::tarball::{ExtractPolicy, TarballError, extract_platform, is_build_script, parse_tarball_name};
use crate::util::hash::{ContentHash, HashError, hash_file};

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Errors that can occur while fetching release assets.
#[derive(Debug, Error)]
pub enum ReleaseError {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("no release tagged '{tag}' in {repo}")]
  ReleaseNotFound { repo: String, tag: String },

  #[error("{url} returned HTTP {status}")]
  Http { url: String, status: StatusCode },

  #[error("request to {url} failed: {source}")]
  Request {
    url: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("failed to create scratch directory: {0}")]
  Scratch(#[source] io::Error),

  #[error("failed to write {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error(transparent)]
  Hash(#[from] HashError),

  #[error(transparent)]
  Tarball(#[from] TarballError),

  #[error("{first} and {second} are both built for {platform}")]
  DuplicatePlatform {
    platform: Platform,
    first: String,
    second: String,
  },
}

/// A release as reported by the hosting API. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
  #[serde(default)]
  pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
  pub name: String,
  pub browser_download_url: String,
}

/// What to do when two assets map to the same platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
  #[default]
  Error,
  KeepFirst,
  KeepLast,
}

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
  pub policy: ExtractPolicy,
  pub conflict: ConflictPolicy,
  /// Parent of the scratch directory; the system temp dir when unset.
  pub scratch_root: Option<PathBuf>,
}

/// The hash of one downloaded tarball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductHash {
  pub filename: String,
  pub sha256: ContentHash,
}

pub type ProductHashes = BTreeMap<Platform, ProductHash>;

/// Client for the release hosting API.
pub struct ReleaseClient {
  http: Client,
  api_url: String,
  token: Option<String>,
}

impl ReleaseClient {
  pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self, ReleaseError> {
    let http = Client::builder()
      .user_agent(USER_AGENT)
      .build()
      .map_err(ReleaseError::Client)?;
    Ok(Self {
      http,
      api_url: api_url.into().trim_end_matches('/').to_string(),
      token: token.filter(|t| !t.is_empty()),
    })
  }

  /// Look up the release tagged `tag` in `repo` (`owner/name`).
  pub fn release(&self, repo: &str, tag: &str) -> Result<Release, ReleaseError> {
    let url = format!("{}/repos/{}/releases/tags/{}", self.api_url, repo, tag);
    debug!(url = %url, "querying release");

    let mut request = self.http.get(&url).header(ACCEPT, GITHUB_JSON);
    if let Some(token) = &self.token {
      request = request.header(AUTHORIZATION, format!("Bearer {token}"));
    }

    let request_error = |source| ReleaseError::Request {
      url: url.clone(),
      source,
    };
    let response = request.send().map_err(request_error)?;

    match response.status() {
      status if status.is_success() => response.json::<Release>().map_err(request_error),
      StatusCode::NOT_FOUND => Err(ReleaseError::ReleaseNotFound {
        repo: repo.to_string(),
        tag: tag.to_string(),
      }),
      status => Err(ReleaseError::Http { url: url.clone(), status }),
    }
  }
}

/// Download every binary tarball of `repo`'s release `tag` and hash it.
///
/// Assets named `build*.jl` are skipped, as are assets whose names do not
/// have the tarball shape. A well-formed name with an unknown platform is
/// handled according to `options.policy`.
pub fn fetch_product_hashes(
  client: &ReleaseClient,
  repo: &str,
  tag: &str,
  options: &FetchOptions,
) -> Result<ProductHashes, ReleaseError> {
  let release = client.release(repo, tag)?;
  info!(repo, tag, assets = release.assets.len(), "fetched release");

  let selected = select_assets(&release.assets, options)?;
  if selected.is_empty() {
    warn!(repo, tag, "release has no binary tarballs");
  }

  let scratch_prefix = format!("{}-", APP_NAME);
  let mut builder = tempfile::Builder::new();
  builder.prefix(&scratch_prefix);
  let scratch = match &options.scratch_root {
    Some(root) => builder.tempdir_in(root),
    None => builder.tempdir(),
  }
  .map_err(ReleaseError::Scratch)?;

  let mut hashes = ProductHashes::new();
  for (platform, asset) in selected {
    let path = download::download_to(&client.http, &asset.browser_download_url, scratch.path())?;
    let sha256 = hash_file(&path)?;
    debug!(filename = %asset.name, sha256 = %sha256, platform = %platform, "hashed tarball");
    hashes.insert(
      platform,
      ProductHash {
        filename: asset.name.clone(),
        sha256,
      },
    );
  }

  Ok(hashes)
}

/// Map assets to platforms, applying the extract and conflict policies.
fn select_assets<'a>(
  assets: &'a [ReleaseAsset],
  options: &FetchOptions,
) -> Result<BTreeMap<Platform, &'a ReleaseAsset>, ReleaseError> {
  let mut selected: BTreeMap<Platform, &ReleaseAsset> = BTreeMap::new();

  for asset in assets {
    if is_build_script(&asset.name) {
      debug!(name = %asset.name, "skipping build script");
      continue;
    }

    let platform = match parse_tarball_name(&asset.name) {
      Ok(parsed) => parsed.platform,
      Err(err) if err.is_unparseable_name() => {
        debug!(name = %asset.name, error = %err, "skipping asset");
        continue;
      }
      Err(_) => extract_platform(&asset.name, options.policy)?,
    };

    match selected.get(&platform) {
      None => {
        selected.insert(platform, asset);
      }
      Some(existing) => match options.conflict {
        ConflictPolicy::Error => {
          return Err(ReleaseError::DuplicatePlatform {
            platform,
            first: existing.name.clone(),
            second: asset.name.clone(),
          });
        }
        ConflictPolicy::KeepFirst => {
          warn!(platform = %platform, kept = %existing.name, dropped = %asset.name, "duplicate platform");
        }
        ConflictPolicy::KeepLast => {
          warn!(platform = %platform, kept = %asset.name, dropped = %existing.name, "duplicate platform");
          selected.insert(platform, asset);
        }
      },
    }
  }

  Ok(selected)
}
