//! Shared constants.

pub const APP_NAME: &str = "generate_buildjl";

/// Sent with every request; the release API rejects requests without one.
pub const USER_AGENT: &str = concat!("generate_buildjl/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DOWNLOAD_HOST: &str = "https://github.com";
pub const DEFAULT_ORG: &str = "JuliaBinaryWrappers";
pub const DEFAULT_OUTPUT_DIR: &str = "build";

pub const DEPOT_DIR_NAME: &str = ".julia";
pub const DEFAULT_REGISTRY_NAME: &str = "General";

/// Suffix appended to a package name to name its binary wrapper package.
pub const WRAPPER_SUFFIX: &str = "_jll";

/// Extension of generated companion scripts, also used to skip stray build scripts in releases.
pub const SCRIPT_EXTENSION: &str = ".jl";

/// Upper bound on memory the declaration sandbox may allocate.
pub const SANDBOX_MEMORY_LIMIT: usize = 64 * 1024 * 1024;
