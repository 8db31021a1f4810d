//! CLI smoke tests for generate_buildjl.
//!
//! A mockito server stands in for the release API and download host.

use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use mockito::{Server, ServerGuard};
use predicates::prelude::*;
use tempfile::TempDir;

const TAG: &str = "Zlib-v1.2.11";

fn generate_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("generate_buildjl");
  for var in ["RUST_LOG", "GITHUB_TOKEN", "BUILDJL_DOWNLOAD_HOST", "BUILDJL_ORG", "BUILDJL_REGISTRY"] {
    cmd.env_remove(var);
  }
  cmd
}

fn fixture_declaration() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/Zlib/build_tarballs.lua")
}

fn mock_release(server: &mut ServerGuard, names: &[&str]) -> Vec<mockito::Mock> {
  let assets: Vec<String> = names
    .iter()
    .map(|name| {
      format!(
        r#"{{"name": "{name}", "browser_download_url": "{}/download/{name}"}}"#,
        server.url()
      )
    })
    .collect();
  let body = format!(r#"{{"tag_name": "{TAG}", "assets": [{}]}}"#, assets.join(","));

  let mut mocks = vec![
    server
      .mock("GET", format!("/repos/JuliaBinaryWrappers/Zlib_jll/releases/tags/{TAG}").as_str())
      .with_status(200)
      .with_header("content-type", "application/json")
      .with_body(body)
      .create(),
  ];
  for name in names {
    mocks.push(
      server
        .mock("GET", format!("/download/{name}").as_str())
        .with_status(200)
        .with_body(format!("contents of {name}"))
        .create(),
    );
  }
  mocks
}

#[test]
fn help_flag_works() {
  generate_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  generate_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("generate_buildjl"));
}

#[test]
fn missing_declaration_is_usage_error() {
  generate_cmd()
    .arg("/nonexistent/build_tarballs.lua")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("no such file"));
}

#[test]
fn too_many_arguments_is_usage_error() {
  generate_cmd()
    .arg(fixture_declaration())
    .args(["JuliaBinaryWrappers/Zlib_jll", TAG, "extra"])
    .assert()
    .code(2);
}

#[test]
fn no_arguments_is_usage_error() {
  generate_cmd().assert().code(2);
}

#[test]
fn writes_build_script() {
  let mut server = Server::new();
  let _mocks = mock_release(
    &mut server,
    &[
      "Zlib.v1.2.11.x86_64-linux-gnu.tar.gz",
      "Zlib.v1.2.11.x86_64-apple-darwin14.tar.gz",
      "build_Zlib.v1.2.11.jl",
    ],
  );
  let out = TempDir::new().unwrap();

  generate_cmd()
    .arg(fixture_declaration())
    .args(["JuliaBinaryWrappers/Zlib_jll", TAG])
    .arg("--output-dir")
    .arg(out.path())
    .env("BUILDJL_API_URL", server.url())
    .assert()
    .success()
    .stdout(predicate::str::contains("build_Zlib.v1.2.11.jl"))
    .stdout(predicate::str::contains("Platforms: 2"));

  let script = std::fs::read_to_string(out.path().join("build_Zlib.v1.2.11.jl")).unwrap();
  assert!(script.contains(r#"LibraryProduct(prefix, String["libz"], :libz)"#));
  assert!(script.contains("MacOS(:x86_64) => (\"$bin_prefix/Zlib.v1.2.11.x86_64-apple-darwin14.tar.gz\""));
  assert!(script.contains(
    "bin_prefix = \"https://github.com/JuliaBinaryWrappers/Zlib_jll/releases/download/Zlib-v1.2.11\""
  ));
}

#[test]
fn unresolvable_tag_fails() {
  let mut server = Server::new();
  let _mocks = mock_release(&mut server, &["Zlib.v1.2.11.x86_64-linux-gnu.tar.gz"]);
  let out = TempDir::new().unwrap();

  generate_cmd()
    .arg(fixture_declaration())
    .arg("--output-dir")
    .arg(out.path())
    .env("BUILDJL_API_URL", server.url())
    .env("BUILDJL_ORG", "JuliaBinaryWrappers")
    .env("BUILDJL_REGISTRY", out.path().join("no-registry"))
    .assert()
    .failure()
    .code(1)
    .stderr(predicate::str::contains("Zlib_jll"));
}

#[test]
fn duplicate_platforms_fail_unless_allowed() {
  let names = [
    "Zlib.v1.2.11.x86_64-linux-gnu.tar.gz",
    "Zlib.v1.2.11.amd64-linux-gnu.tar.gz",
  ];
  let mut server = Server::new();
  let _mocks = mock_release(&mut server, &names);
  let out = TempDir::new().unwrap();

  generate_cmd()
    .arg(fixture_declaration())
    .args(["JuliaBinaryWrappers/Zlib_jll", TAG])
    .arg("--output-dir")
    .arg(out.path())
    .env("BUILDJL_API_URL", server.url())
    .assert()
    .code(1)
    .stderr(predicate::str::contains("both built for"));
  assert!(!out.path().join("build_Zlib.v1.2.11.jl").exists());

  generate_cmd()
    .arg(fixture_declaration())
    .args(["JuliaBinaryWrappers/Zlib_jll", TAG])
    .args(["--on-conflict", "keep-last", "--output-dir"])
    .arg(out.path())
    .env("BUILDJL_API_URL", server.url())
    .assert()
    .success();
  let script = std::fs::read_to_string(out.path().join("build_Zlib.v1.2.11.jl")).unwrap();
  assert!(script.contains("Zlib.v1.2.11.amd64-linux-gnu.tar.gz"));
  assert!(!script.contains("Zlib.v1.2.11.x86_64-linux-gnu.tar.gz"));
}

#[test]
fn missing_release_fails() {
  let mut server = Server::new();
  let _m = server
    .mock("GET", format!("/repos/JuliaBinaryWrappers/Zlib_jll/releases/tags/{TAG}").as_str())
    .with_status(404)
    .create();
  let out = TempDir::new().unwrap();

  generate_cmd()
    .arg(fixture_declaration())
    .args(["JuliaBinaryWrappers/Zlib_jll", TAG])
    .arg("--output-dir")
    .arg(out.path())
    .env("BUILDJL_API_URL", server.url())
    .assert()
    .code(1)
    .stderr(predicate::str::contains("no release tagged"));
}
