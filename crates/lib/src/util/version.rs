//! Lenient version parsing.
//!
//! Release names and registry entries carry versions like `1.2`, `1.2.11`, or
//! `1.2.11+3`. Strict semver rejects the first, so missing minor/patch
//! components are padded with zeros before parsing.

use semver::Version;

pub fn parse_version(input: &str) -> Result<Version, semver::Error> {
  let input = input.trim();
  let input = input.strip_prefix('v').unwrap_or(input);
  let split_at = input.find(['-', '+']).unwrap_or(input.len());
  let (core, suffix) = input.split_at(split_at);

  let components = core.split('.').count();
  let padded = match components {
    1 => format!("{}.0.0{}", core, suffix),
    2 => format!("{}.0{}", core, suffix),
    _ => input.to_string(),
  };
  Version::parse(&padded)
}
