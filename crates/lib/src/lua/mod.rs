//! Lua runtime for build declarations.
//!
//! - [`runtime`] - sandboxed VM creation and script loading
//! - [`globals`] - the stub globals a declaration script can call

pub mod globals;
pub mod runtime;
