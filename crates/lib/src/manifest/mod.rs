//! Build script rendering.
//!
//! The generated `build_<name>.v<version>.jl` lists the declared products and
//! maps every platform to the URL and SHA-256 of its tarball, followed by the
//! installer boilerplate. Rendering is deterministic: platforms are sorted by
//! their rendered text, products keep declaration order.

mod templates;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::consts::SCRIPT_EXTENSION;
use crate::declaration::{BuildDeclaration, Product};
use crate::release::ProductHashes;

/// File name of the build script for a declaration.
pub fn build_script_name(declaration: &BuildDeclaration) -> String {
  format!("build_{}.v{}{}", declaration.name, declaration.version, SCRIPT_EXTENSION)
}

/// Render the build script text.
pub fn render_build_script(declaration: &BuildDeclaration, hashes: &ProductHashes, bin_prefix: &str) -> String {
  let mut out = String::from(templates::PREAMBLE);

  out.push_str("products = [\n");
  for product in &declaration.products {
    out.push_str(&format!("    {},\n", render_product(product)));
  }
  out.push_str("]\n\n");

  out.push_str("# Download binaries from hosted location\n");
  out.push_str(&format!("bin_prefix = \"{}\"\n\n", escape_julia(bin_prefix)));

  let mut entries: Vec<(String, String)> = hashes
    .iter()
    .map(|(platform, hash)| {
      (
        platform.to_string(),
        format!(
          "(\"$bin_prefix/{}\", \"{}\")",
          escape_julia(&hash.filename),
          hash.sha256
        ),
      )
    })
    .collect();
  entries.sort();

  out.push_str("# Listing of files generated by BinaryBuilder:\n");
  out.push_str("download_info = Dict(\n");
  for (platform, download) in entries {
    out.push_str(&format!("    {} => {},\n", platform, download));
  }
  out.push_str(")\n");

  out.push_str(templates::INSTALL_FOOTER);
  out
}

/// Render and write the build script into `dir`, creating it if needed.
pub fn write_build_script(
  dir: &Path,
  declaration: &BuildDeclaration,
  hashes: &ProductHashes,
  bin_prefix: &str,
) -> io::Result<PathBuf> {
  fs::create_dir_all(dir)?;
  let path = dir.join(build_script_name(declaration));
  fs::write(&path, render_build_script(declaration, hashes, bin_prefix))?;
  info!(path = %path.display(), platforms = hashes.len(), "wrote build script");
  Ok(path)
}

fn render_product(product: &Product) -> String {
  let variable = product.variable();
  match product {
    Product::Library { libnames, .. } => {
      let names: Vec<String> = libnames.iter().map(|n| format!("\"{}\"", escape_julia(n))).collect();
      format!("LibraryProduct(prefix, String[{}], :{})", names.join(", "), variable)
    }
    Product::Executable { binname, .. } => {
      format!("ExecutableProduct(prefix, \"{}\", :{})", escape_julia(binname), variable)
    }
    Product::File { path, .. } => {
      format!("FileProduct(prefix, \"{}\", :{})", escape_julia(path), variable)
    }
  }
}

/// Escape text for a double-quoted Julia string literal.
fn escape_julia(s: &str) -> String {
  let mut escaped = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '\\' | '"' | '$' => {
        escaped.push('\\');
        escaped.push(c);
      }
      '\n' => escaped.push_str("\\n"),
      _ => escaped.push(c),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::platform::{Platform, parse_triplet};
  use crate::release::ProductHash;
  use crate::util::hash::hash_bytes;
  use regex::Regex;
  use semver::Version;
  use tempfile::TempDir;

  const BIN_PREFIX: &str = "https://github.com/JuliaBinaryWrappers/Zlib_jll.jl/releases/download/Zlib-v1.2.11";

  fn zlib() -> BuildDeclaration {
    BuildDeclaration {
      name: "Zlib".to_string(),
      version: Version::new(1, 2, 11),
      products: vec![
        Product::Library {
          libnames: vec!["libz".to_string()],
          variable: "libz".to_string(),
        },
        Product::Executable {
          binname: "minigzip".to_string(),
          variable: "minigzip".to_string(),
        },
        Product::File {
          path: "include/zlib.h".to_string(),
          variable: "zlib_h".to_string(),
        },
      ],
    }
  }

  fn hashes(triplets: &[&str]) -> ProductHashes {
    triplets
      .iter()
      .map(|triplet| {
        let filename = format!("Zlib.v1.2.11.{triplet}.tar.gz");
        (
          parse_triplet(triplet).unwrap(),
          ProductHash {
            sha256: hash_bytes(filename.as_bytes()),
            filename,
          },
        )
      })
      .collect()
  }

  #[test]
  fn script_name_uses_name_and_version() {
    assert_eq!(build_script_name(&zlib()), "build_Zlib.v1.2.11.jl");
  }

  #[test]
  fn renders_preamble_products_and_footer() {
    let text = render_build_script(&zlib(), &hashes(&["x86_64-linux-gnu"]), BIN_PREFIX);

    assert!(text.starts_with("using BinaryProvider # requires BinaryProvider 0.3.0 or later\n"));
    assert!(text.contains(r#"const verbose = "--verbose" in ARGS"#));
    assert!(text.contains(r#"    LibraryProduct(prefix, String["libz"], :libz),"#));
    assert!(text.contains(r#"    ExecutableProduct(prefix, "minigzip", :minigzip),"#));
    assert!(text.contains(r#"    FileProduct(prefix, "include/zlib.h", :zlib_h),"#));
    assert!(text.contains(&format!("bin_prefix = \"{BIN_PREFIX}\"")));
    assert!(text.contains(
      r#"    Linux(:x86_64, libc=:glibc) => ("$bin_prefix/Zlib.v1.2.11.x86_64-linux-gnu.tar.gz", "#
    ));
    assert!(text.ends_with("write_deps_file(joinpath(@__DIR__, \"deps.jl\"), products, verbose=verbose)\n"));
  }

  #[test]
  fn download_info_is_sorted_by_rendered_platform() {
    let triplets = [
      "x86_64-w64-mingw32",
      "x86_64-linux-gnu",
      "aarch64-linux-gnu",
      "x86_64-apple-darwin14",
      "i686-linux-musl",
      "arm-linux-gnueabihf",
    ];
    let text = render_build_script(&zlib(), &hashes(&triplets), BIN_PREFIX);

    let rendered: Vec<&str> = text
      .lines()
      .filter(|line| line.contains(" => (\"$bin_prefix/"))
      .map(|line| line.trim_start().split(" => ").next().unwrap())
      .collect();
    let mut sorted = rendered.clone();
    sorted.sort();
    assert_eq!(rendered.len(), triplets.len());
    assert_eq!(rendered, sorted);
  }

  #[test]
  fn rendering_is_idempotent() {
    let hashes = hashes(&["x86_64-linux-gnu", "x86_64-apple-darwin14", "i686-w64-mingw32"]);
    let first = render_build_script(&zlib(), &hashes, BIN_PREFIX);
    let second = render_build_script(&zlib(), &hashes, BIN_PREFIX);
    assert_eq!(first, second);
  }

  #[test]
  fn hashes_round_trip_through_text() {
    let hashes = hashes(&["x86_64-linux-gnu", "aarch64-linux-musl", "x86_64-unknown-freebsd11.1"]);
    let text = render_build_script(&zlib(), &hashes, BIN_PREFIX);

    let entry = Regex::new(r#"\$bin_prefix/([^"]+)", "([0-9a-f]{64})"\)"#).unwrap();
    let parsed: Vec<(String, String)> = entry
      .captures_iter(&text)
      .map(|c| (c[1].to_string(), c[2].to_string()))
      .collect();

    assert_eq!(parsed.len(), hashes.len());
    for hash in hashes.values() {
      assert!(parsed.contains(&(hash.filename.clone(), hash.sha256.to_string())));
    }
  }

  #[test]
  fn empty_release_renders_empty_dict() {
    let text = render_build_script(&zlib(), &ProductHashes::new(), BIN_PREFIX);
    assert!(text.contains("download_info = Dict(\n)\n"));
  }

  #[test]
  fn escapes_julia_strings() {
    assert_eq!(escape_julia(r#"a"b$c\d"#), r#"a\"b\$c\\d"#);
    let decl = BuildDeclaration {
      products: vec![Product::File {
        path: "share/$weird\".txt".to_string(),
        variable: "weird".to_string(),
      }],
      ..zlib()
    };
    let text = render_build_script(&decl, &ProductHashes::new(), BIN_PREFIX);
    assert!(text.contains(r#"FileProduct(prefix, "share/\$weird\".txt", :weird)"#));
  }

  #[test]
  fn writes_into_created_directory() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("build");
    let hashes = hashes(&["x86_64-linux-gnu"]);
    let path = write_build_script(&dir, &zlib(), &hashes, BIN_PREFIX).unwrap();

    assert_eq!(path, dir.join("build_Zlib.v1.2.11.jl"));
    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(written, render_build_script(&zlib(), &hashes, BIN_PREFIX));
  }

  #[test]
  fn host_platform_renders() {
    let host = Platform::current().unwrap();
    let text = render_build_script(
      &zlib(),
      &[(
        host,
        ProductHash {
          filename: "Zlib.tar.gz".to_string(),
          sha256: hash_bytes(b""),
        },
      )]
      .into_iter()
      .collect(),
      BIN_PREFIX,
    );
    assert!(text.contains(&format!("    {} => (", host)));
  }
}
