//! Asset downloads into a scratch directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use tracing::{debug, info};

use super::ReleaseError;
use crate::util::hash::hash_bytes;

/// Download `url` into `dir` and return the path of the written file.
///
/// The response body is streamed to disk. Any non-2xx status is an error.
pub(crate) fn download_to(http: &Client, url: &str, dir: &Path) -> Result<PathBuf, ReleaseError> {
  info!(url = %url, "downloading");

  let dest_path = dir.join(url_to_filename(url));

  let mut response = http.get(url).send().map_err(|source| ReleaseError::Request {
    url: url.to_string(),
    source,
  })?;

  let status = response.status();
  if !status.is_success() {
    return Err(ReleaseError::Http {
      url: url.to_string(),
      status,
    });
  }

  let io_error = |source: io::Error| ReleaseError::Io {
    path: dest_path.clone(),
    source,
  };
  let mut file = fs::File::create(&dest_path).map_err(io_error)?;
  let size = response.copy_to(&mut file).map_err(|source| ReleaseError::Request {
    url: url.to_string(),
    source,
  })?;

  debug!(path = ?dest_path, size, "download complete");
  Ok(dest_path)
}

/// Convert a URL to a safe filename.
///
/// Takes the last path component and sanitizes it. Falls back to a hash of
/// the URL if no suitable filename can be extracted.
fn url_to_filename(url: &str) -> String {
  if let Some(filename) = url.rsplit('/').next() {
    let filename = filename.split('?').next().unwrap_or(filename);

    let sanitized: String = filename
      .chars()
      .map(|c| {
        if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' {
          c
        } else {
          '_'
        }
      })
      .collect();

    if !sanitized.is_empty() && sanitized != "." && sanitized != ".." {
      return sanitized;
    }
  }

  format!("download_{}", &hash_bytes(url.as_bytes()).0[..16])
}
