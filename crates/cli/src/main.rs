mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use buildjl_lib::release::ConflictPolicy;

use crate::cmd::GenerateArgs;
use crate::output::print_error;

/// Generate a build.jl installer script from a package's binary release
#[derive(Parser)]
#[command(name = "generate_buildjl")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Path to the build declaration script
  #[arg(value_parser = existing_file)]
  declaration: PathBuf,

  /// Release repository as owner/name (default: <org>/<declaration dir>_jll)
  repo: Option<String>,

  /// Release tag (default: latest registered version)
  tag: Option<String>,

  /// Enable verbose output
  #[arg(short, long)]
  verbose: bool,

  /// Directory to write the build script into
  #[arg(long, value_name = "DIR")]
  output_dir: Option<PathBuf>,

  /// What to do when two tarballs are built for the same platform
  #[arg(long, value_enum, default_value_t = OnConflict::Error)]
  on_conflict: OnConflict,

  /// Use the host platform for tarballs whose platform is not recognized
  #[arg(long)]
  host_fallback: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnConflict {
  Error,
  KeepFirst,
  KeepLast,
}

impl From<OnConflict> for ConflictPolicy {
  fn from(value: OnConflict) -> Self {
    match value {
      OnConflict::Error => ConflictPolicy::Error,
      OnConflict::KeepFirst => ConflictPolicy::KeepFirst,
      OnConflict::KeepLast => ConflictPolicy::KeepLast,
    }
  }
}

fn existing_file(value: &str) -> Result<PathBuf, String> {
  let path = PathBuf::from(value);
  if path.is_file() {
    Ok(path)
  } else {
    Err(format!("no such file: {}", value))
  }
}

fn init_logging(verbose: bool) {
  let default_level = if verbose { "debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let args = GenerateArgs {
    declaration: cli.declaration,
    repo: cli.repo,
    tag: cli.tag,
    output_dir: cli.output_dir,
    conflict: cli.on_conflict.into(),
    host_fallback: cli.host_fallback,
    verbose: cli.verbose,
  };

  match cmd::cmd_generate(args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
