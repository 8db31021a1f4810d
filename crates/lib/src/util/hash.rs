//! Hashing utilities for download verification.
//!
//! All digests are SHA-256, rendered as 64 lowercase hex characters.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A full 64-character SHA256 hash of some content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Error while reading content to hash.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file {path}: {source}")]
pub struct HashError {
  pub path: String,
  #[source]
  pub source: std::io::Error,
}

/// Hash a file's contents.
///
/// Streams the file so large tarballs are never held in memory.
pub fn hash_file(path: &Path) -> Result<ContentHash, HashError> {
  let read_error = |source| HashError {
    path: path.display().to_string(),
    source,
  };
  let mut file = fs::File::open(path).map_err(read_error)?;

  let mut hasher = Sha256::new();
  let mut buffer = [0u8; 8192];

  loop {
    let bytes_read = file.read(&mut buffer).map_err(read_error)?;
    if bytes_read == 0 {
      break;
    }
    hasher.update(&buffer[..bytes_read]);
  }

  Ok(ContentHash(hex::encode(hasher.finalize())))
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  ContentHash(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  const HELLO_WORLD_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

  #[test]
  fn hash_bytes_known_vector() {
    assert_eq!(hash_bytes(b"hello world").0, HELLO_WORLD_SHA256);
  }

  #[test]
  fn hash_file_matches_hash_bytes() {
    let temp = tempdir().unwrap();
    let file_path = temp.path().join("test.txt");
    fs::write(&file_path, "hello world").unwrap();

    let hash = hash_file(&file_path).unwrap();
    assert_eq!(hash.0, HELLO_WORLD_SHA256);
    assert_eq!(hash, hash_bytes(b"hello world"));
  }

  #[test]
  fn hash_file_spanning_buffers() {
    let temp = tempdir().unwrap();
    let file_path = temp.path().join("big.bin");
    let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&file_path, &data).unwrap();

    assert_eq!(hash_file(&file_path).unwrap(), hash_bytes(&data));
  }

  #[test]
  fn hash_file_missing() {
    let temp = tempdir().unwrap();
    let err = hash_file(&temp.path().join("nope")).unwrap_err();
    assert!(err.to_string().contains("nope"));
  }
}
