//! Platform descriptors for binary tarballs.
//!
//! A [`Platform`] is the normalized form of a tarball's platform triplet. It
//! renders to the constructor syntax the installer library expects (see the
//! `Display` impl) and back to a canonical triplet via [`Platform::triplet`].

pub mod abi;
pub mod arch;
pub mod os;
pub mod paths;
pub mod triplet;

use std::fmt;

use abi::{CallAbi, CompilerAbi, Libc};
use arch::Arch;
use os::Os;

pub use triplet::{PlatformError, parse_triplet};

/// Normalized platform descriptor.
///
/// Each variant carries only the attributes meaningful for its family:
/// libc and call ABI exist for Linux alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
  Linux {
    arch: Arch,
    libc: Libc,
    call_abi: Option<CallAbi>,
    compiler_abi: CompilerAbi,
  },
  MacOs {
    arch: Arch,
    compiler_abi: CompilerAbi,
  },
  FreeBsd {
    arch: Arch,
    compiler_abi: CompilerAbi,
  },
  Windows {
    arch: Arch,
    compiler_abi: CompilerAbi,
  },
}

impl Platform {
  /// Descriptor of the machine running this process.
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    let arch = Arch::current()?;
    let compiler_abi = CompilerAbi::default();
    let platform = match Os::current()? {
      Os::Linux => Self::Linux {
        arch,
        libc: if cfg!(target_env = "musl") { Libc::Musl } else { Libc::Glibc },
        call_abi: (arch == Arch::Armv7l).then_some(CallAbi::Eabihf),
        compiler_abi,
      },
      Os::MacOs => Self::MacOs { arch, compiler_abi },
      Os::FreeBsd => Self::FreeBsd { arch, compiler_abi },
      Os::Windows => Self::Windows { arch, compiler_abi },
    };
    Some(platform)
  }

  pub fn os(&self) -> Os {
    match self {
      Self::Linux { .. } => Os::Linux,
      Self::MacOs { .. } => Os::MacOs,
      Self::FreeBsd { .. } => Os::FreeBsd,
      Self::Windows { .. } => Os::Windows,
    }
  }

  pub fn arch(&self) -> Arch {
    match *self {
      Self::Linux { arch, .. } | Self::MacOs { arch, .. } | Self::FreeBsd { arch, .. } | Self::Windows { arch, .. } => {
        arch
      }
    }
  }

  pub fn compiler_abi(&self) -> CompilerAbi {
    match *self {
      Self::Linux { compiler_abi, .. }
      | Self::MacOs { compiler_abi, .. }
      | Self::FreeBsd { compiler_abi, .. }
      | Self::Windows { compiler_abi, .. } => compiler_abi,
    }
  }

  /// Canonical triplet for this descriptor (e.g., `arm-linux-gnueabihf-cxx11`).
  ///
  /// `parse_triplet(&p.triplet())` yields `p` again.
  pub fn triplet(&self) -> String {
    let arch = self.arch().triplet_str();
    let mut triplet = match self {
      Self::Linux { libc, call_abi, .. } => {
        let call_abi = call_abi.map(|c| c.as_str()).unwrap_or("");
        format!("{}-linux-{}{}", arch, libc.triplet_str(), call_abi)
      }
      Self::MacOs { .. } => format!("{}-apple-darwin14", arch),
      Self::FreeBsd { .. } => format!("{}-unknown-freebsd11.1", arch),
      Self::Windows { .. } => format!("{}-w64-mingw32", arch),
    };
    for tag in self.compiler_abi().triplet_tags() {
      triplet.push('-');
      triplet.push_str(tag);
    }
    triplet
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}(:{}", self.os(), self.arch())?;
    if let Self::Linux { libc, call_abi, .. } = self {
      write!(f, ", libc=:{}", libc.as_str())?;
      if let Some(call_abi) = call_abi {
        write!(f, ", call_abi=:{}", call_abi.as_str())?;
      }
    }
    let compiler_abi = self.compiler_abi();
    if !compiler_abi.is_any() {
      write!(f, ", compiler_abi={}", compiler_abi)?;
    }
    write!(f, ")")
  }
}

/// Returns the canonical triplet for the current system
///
/// Returns `None` if the current platform is not supported
pub fn platform_triplet() -> Option<String> {
  Platform::current().map(|p| p.triplet())
}

#[cfg(test)]
mod tests {
  use super::abi::{CxxAbi, GccVersion};
  use super::*;

  #[test]
  fn linux_display() {
    let platform = Platform::Linux {
      arch: Arch::X86_64,
      libc: Libc::Glibc,
      call_abi: None,
      compiler_abi: CompilerAbi::default(),
    };
    assert_eq!(platform.to_string(), "Linux(:x86_64, libc=:glibc)");

    let platform = Platform::Linux {
      arch: Arch::Armv7l,
      libc: Libc::Musl,
      call_abi: Some(CallAbi::Eabihf),
      compiler_abi: CompilerAbi::new(GccVersion::Gcc7, CxxAbi::Cxx11),
    };
    assert_eq!(
      platform.to_string(),
      "Linux(:armv7l, libc=:musl, call_abi=:eabihf, compiler_abi=CompilerABI(:gcc7, :cxx11))"
    );
  }

  #[test]
  fn non_linux_display_omits_libc() {
    let platform = Platform::MacOs {
      arch: Arch::X86_64,
      compiler_abi: CompilerAbi::default(),
    };
    assert_eq!(platform.to_string(), "MacOS(:x86_64)");

    let platform = Platform::Windows {
      arch: Arch::I686,
      compiler_abi: CompilerAbi::new(GccVersion::Gcc8, CxxAbi::Any),
    };
    assert_eq!(platform.to_string(), "Windows(:i686, compiler_abi=CompilerABI(:gcc8))");
  }

  #[test]
  fn triplet_rendering() {
    let platform = Platform::Linux {
      arch: Arch::Armv7l,
      libc: Libc::Glibc,
      call_abi: Some(CallAbi::Eabihf),
      compiler_abi: CompilerAbi::new(GccVersion::Gcc4, CxxAbi::Cxx03),
    };
    assert_eq!(platform.triplet(), "arm-linux-gnueabihf-libgfortran3-cxx03");

    let platform = Platform::FreeBsd {
      arch: Arch::X86_64,
      compiler_abi: CompilerAbi::default(),
    };
    assert_eq!(platform.triplet(), "x86_64-unknown-freebsd11.1");
  }

  #[test]
  fn current_platform_triplet_parses_back() {
    let platform = Platform::current().expect("test host should be supported");
    assert_eq!(parse_triplet(&platform.triplet()).unwrap(), platform);
    assert_eq!(platform_triplet(), Some(platform.triplet()));
  }
}
