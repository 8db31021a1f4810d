//! buildjl-lib: generate installer build scripts from binary releases
//!
//! The pipeline behind `generate_buildjl`:
//! - [`declaration`]: evaluate a build declaration script in a Lua sandbox
//! - [`tarball`] and [`platform`]: recover platforms from release tarball names
//! - [`release`]: download and hash a release's tarballs
//! - [`registry`]: find the latest registered version when no tag is given
//! - [`manifest`]: render the `build_<name>.v<version>.jl` script
//! - [`generate`]: all of the above, end to end

pub mod config;
pub mod consts;
pub mod declaration;
pub mod generate;
pub mod lua;
pub mod manifest;
pub mod platform;
pub mod registry;
pub mod release;
pub mod tarball;
pub mod util;

pub use config::Config;
pub use generate::{GenerateError, GenerateOutcome, GenerateRequest, generate};
