//! Classification of platform triplets into [`Platform`] descriptors.

use thiserror::Error;

use super::Platform;
use super::abi::{CallAbi, CompilerAbi, CxxAbi, GccVersion, Libc};
use super::arch::Arch;

/// Errors that can occur while classifying a triplet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
  /// The triplet does not have 3 to 5 dash-separated fields.
  #[error("invalid platform triplet '{0}': expected 3 to 5 dash-separated fields")]
  InvalidTriplet(String),

  #[error("unrecognized architecture '{arch}' in triplet '{triplet}'")]
  UnrecognizedArch { triplet: String, arch: String },

  /// Vendor is `linux` but the ABI field is not a known libc variant.
  #[error("unrecognized ABI '{abi}' in triplet '{triplet}'")]
  UnrecognizedAbi { triplet: String, abi: String },

  #[error("unrecognized vendor/ABI combination '{vendor}-{abi}' in triplet '{triplet}'")]
  UnrecognizedVendor {
    triplet: String,
    vendor: String,
    abi: String,
  },

  #[error("unrecognized compiler ABI tag '{tag}' in triplet '{triplet}'")]
  UnrecognizedCompilerAbi { triplet: String, tag: String },
}

/// Classify a platform triplet such as `x86_64-linux-gnu` or
/// `x86_64-apple-darwin14-libgfortran4-cxx11`.
pub fn parse_triplet(triplet: &str) -> Result<Platform, PlatformError> {
  let fields: Vec<&str> = triplet.split('-').collect();
  if !(3..=5).contains(&fields.len()) || fields.iter().any(|f| f.is_empty()) {
    return Err(PlatformError::InvalidTriplet(triplet.to_string()));
  }

  let compiler_abi = parse_compiler_abi(triplet, &fields[3..])?;
  let arch = Arch::from_triplet_field(fields[0]).ok_or_else(|| PlatformError::UnrecognizedArch {
    triplet: triplet.to_string(),
    arch: fields[0].to_string(),
  })?;
  let (vendor, abi) = (fields[1], fields[2]);

  match vendor {
    "linux" => {
      let (libc, call_abi) = match abi {
        "gnu" => (Libc::Glibc, None),
        "musl" => (Libc::Musl, None),
        "gnueabihf" => (Libc::Glibc, Some(CallAbi::Eabihf)),
        "musleabihf" => (Libc::Musl, Some(CallAbi::Eabihf)),
        _ => {
          return Err(PlatformError::UnrecognizedAbi {
            triplet: triplet.to_string(),
            abi: abi.to_string(),
          });
        }
      };
      Ok(Platform::Linux {
        arch,
        libc,
        call_abi,
        compiler_abi,
      })
    }
    "apple" if abi.starts_with("darwin") => Ok(Platform::MacOs { arch, compiler_abi }),
    "unknown" if abi.starts_with("freebsd") => Ok(Platform::FreeBsd { arch, compiler_abi }),
    "w64" if abi == "mingw32" => Ok(Platform::Windows { arch, compiler_abi }),
    _ => Err(PlatformError::UnrecognizedVendor {
      triplet: triplet.to_string(),
      vendor: vendor.to_string(),
      abi: abi.to_string(),
    }),
  }
}

/// Parse the optional compiler ABI suffix fields (zero, one, or two of them).
fn parse_compiler_abi(triplet: &str, tags: &[&str]) -> Result<CompilerAbi, PlatformError> {
  let unrecognized = |tag: &str| PlatformError::UnrecognizedCompilerAbi {
    triplet: triplet.to_string(),
    tag: tag.to_string(),
  };
  let cxx = |tag: &str| CxxAbi::from_tag(tag).ok_or_else(|| unrecognized(tag));

  match tags {
    [] => Ok(CompilerAbi::default()),
    [tag] if tag.starts_with("cxx") => Ok(CompilerAbi::new(GccVersion::Any, cxx(*tag)?)),
    [tag] if tag.starts_with("libgfortran") => Ok(CompilerAbi::new(GccVersion::from_gfortran_tag(tag), CxxAbi::Any)),
    [fortran, cxx_tag] if fortran.starts_with("libgfortran") && cxx_tag.starts_with("cxx") => {
      Ok(CompilerAbi::new(GccVersion::from_gfortran_tag(fortran), cxx(*cxx_tag)?))
    }
    [tag] => Err(unrecognized(*tag)),
    [fortran, cxx_tag] => Err(unrecognized(if fortran.starts_with("libgfortran") { *cxx_tag } else { *fortran })),
    _ => Err(PlatformError::InvalidTriplet(triplet.to_string())),
  }
}
