//! Implementation of `generate_buildjl`.
//!
//! Evaluates the build declaration, hashes the release's tarballs and writes
//! the build script, then prints a summary.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use buildjl_lib::platform::platform_triplet;
use buildjl_lib::release::{ConflictPolicy, FetchOptions};
use buildjl_lib::tarball::ExtractPolicy;
use buildjl_lib::{Config, GenerateRequest, generate};

use crate::output::{format_duration, print_info, print_mapping, print_stat, print_success, print_warning, truncate_hash};

pub struct GenerateArgs {
  pub declaration: PathBuf,
  pub repo: Option<String>,
  pub tag: Option<String>,
  pub output_dir: Option<PathBuf>,
  pub conflict: ConflictPolicy,
  pub host_fallback: bool,
  pub verbose: bool,
}

pub fn cmd_generate(args: GenerateArgs) -> Result<()> {
  let start = Instant::now();

  let mut config = Config::from_env();
  if let Some(dir) = args.output_dir {
    config.output_dir = dir;
  }
  debug!(
    api_url = %config.api_url,
    org = %config.org,
    registry = ?config.registry,
    host = ?platform_triplet(),
    "configuration"
  );

  let request = GenerateRequest {
    declaration: args.declaration,
    repo: args.repo,
    tag: args.tag,
    options: FetchOptions {
      policy: if args.host_fallback {
        ExtractPolicy::HostFallback
      } else {
        ExtractPolicy::Strict
      },
      conflict: args.conflict,
      scratch_root: None,
    },
  };

  print_info(&format!("Evaluating {}", request.declaration.display()));
  let outcome = generate(&request, &config)
    .with_context(|| format!("Failed to generate build script for {}", request.declaration.display()))?;

  if outcome.hashes.is_empty() {
    print_warning(&format!("Release {} of {} has no binary tarballs", outcome.tag, outcome.repo));
  }

  print_success(&format!("Wrote {}", outcome.path.display()));
  print_stat(
    "Package",
    &format!("{} v{}", outcome.declaration.name, outcome.declaration.version),
  );
  print_stat("Repository", &outcome.repo);
  print_stat("Tag", &outcome.tag);
  print_stat("Products", &outcome.declaration.products.len().to_string());
  print_stat("Platforms", &outcome.hashes.len().to_string());
  if args.verbose {
    for (platform, hash) in &outcome.hashes {
      print_mapping(&platform.triplet(), &format!("{} ({})", hash.filename, truncate_hash(&hash.sha256.0)));
    }
  }
  print_stat("Duration", &format_duration(start.elapsed()));

  Ok(())
}
