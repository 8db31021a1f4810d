//! End-to-end generation of a build script from a declaration.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::consts::WRAPPER_SUFFIX;
use crate::declaration::{BuildDeclaration, DeclarationError, evaluate_declaration};
use crate::manifest::write_build_script;
use crate::registry::RegistryError;
use crate::release::{FetchOptions, ProductHashes, ReleaseClient, ReleaseError, fetch_product_hashes};

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error(transparent)]
  Declaration(#[from] DeclarationError),

  #[error(transparent)]
  Release(#[from] ReleaseError),

  #[error(transparent)]
  Registry(#[from] RegistryError),

  #[error("could not determine the latest version of {package}; pass a tag explicitly")]
  UnresolvedVersion { package: String },

  #[error("cannot derive a repository name from {}; pass one explicitly", .0.display())]
  UnresolvedRepo(PathBuf),

  #[error("failed to write build script to {}: {source}", dir.display())]
  Write {
    dir: PathBuf,
    #[source]
    source: io::Error,
  },
}

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
  /// Path to the build declaration script.
  pub declaration: PathBuf,
  /// `owner/name` of the release repository. Derived from the declaration's directory when unset.
  pub repo: Option<String>,
  /// Release tag. Resolved from the registry when unset.
  pub tag: Option<String>,
  pub options: FetchOptions,
}

#[derive(Debug, Clone)]
pub struct GenerateOutcome {
  pub path: PathBuf,
  pub declaration: BuildDeclaration,
  pub repo: String,
  pub tag: String,
  /// Every platform written to the build script, with its tarball and hash.
  pub hashes: ProductHashes,
}

/// Evaluate the declaration, hash the release's tarballs and write the build script.
///
/// Nothing is written unless every tarball was downloaded and hashed.
pub fn generate(request: &GenerateRequest, config: &Config) -> Result<GenerateOutcome, GenerateError> {
  let declaration = evaluate_declaration(&request.declaration)?;

  let repo = match &request.repo {
    Some(repo) => repo.clone(),
    None => default_repo(&request.declaration, &config.org)?,
  };
  let tag = match &request.tag {
    Some(tag) => tag.clone(),
    None => latest_tag(&declaration, config)?,
  };
  info!(name = %declaration.name, repo = %repo, tag = %tag, "generating build script");

  let client = ReleaseClient::new(&config.api_url, config.token.clone())?;
  let hashes = fetch_product_hashes(&client, &repo, &tag, &request.options)?;

  let bin_prefix = config.bin_prefix(&repo, &tag);
  let path = write_build_script(&config.output_dir, &declaration, &hashes, &bin_prefix).map_err(|source| {
    GenerateError::Write {
      dir: config.output_dir.clone(),
      source,
    }
  })?;

  Ok(GenerateOutcome {
    path,
    declaration,
    repo,
    tag,
    hashes,
  })
}

/// `<org>/<dir>_jll`, where `<dir>` is the directory holding the declaration.
fn default_repo(declaration: &Path, org: &str) -> Result<String, GenerateError> {
  let canonical = dunce::canonicalize(declaration).map_err(|_| GenerateError::UnresolvedRepo(declaration.to_path_buf()))?;
  let dir_name = canonical
    .parent()
    .and_then(|dir| dir.file_name())
    .and_then(|name| name.to_str())
    .ok_or_else(|| GenerateError::UnresolvedRepo(declaration.to_path_buf()))?;
  Ok(format!("{}/{}{}", org, dir_name, WRAPPER_SUFFIX))
}

/// `<name>-v<version>` for the newest registered version of `<name>_jll`.
fn latest_tag(declaration: &BuildDeclaration, config: &Config) -> Result<String, GenerateError> {
  let package = format!("{}{}", declaration.name, WRAPPER_SUFFIX);
  let Some(registry) = &config.registry else {
    warn!(package = %package, "no registry location configured");
    return Err(GenerateError::UnresolvedVersion { package });
  };

  match registry.latest_version(&package)? {
    Some(version) => Ok(format!("{}-v{}", declaration.name, version)),
    None => Err(GenerateError::UnresolvedVersion { package }),
  }
}
