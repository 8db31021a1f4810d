//! ABI attributes carried by platform descriptors.

use std::fmt;

/// C library a Linux tarball links against
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Libc {
  Glibc,
  Musl,
}

impl Libc {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Glibc => "glibc",
      Self::Musl => "musl",
    }
  }

  /// The ABI field prefix used in triplets (`gnu`, `musl`)
  pub fn triplet_str(&self) -> &'static str {
    match self {
      Self::Glibc => "gnu",
      Self::Musl => "musl",
    }
  }
}

/// Calling convention suffix on 32-bit ARM
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallAbi {
  Eabihf,
}

impl CallAbi {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Eabihf => "eabihf",
    }
  }
}

/// GCC generation, derived from the bundled libgfortran major version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum GccVersion {
  Gcc4,
  Gcc7,
  Gcc8,
  #[default]
  Any,
}

impl GccVersion {
  /// Map a `libgfortranN` tag to a compiler generation. Unknown versions map to [`GccVersion::Any`].
  pub fn from_gfortran_tag(tag: &str) -> Self {
    match tag {
      "libgfortran3" => Self::Gcc4,
      "libgfortran4" => Self::Gcc7,
      "libgfortran5" => Self::Gcc8,
      _ => Self::Any,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Gcc4 => "gcc4",
      Self::Gcc7 => "gcc7",
      Self::Gcc8 => "gcc8",
      Self::Any => "gcc_any",
    }
  }

  /// The triplet tag for this generation, `None` for [`GccVersion::Any`]
  pub fn gfortran_tag(&self) -> Option<&'static str> {
    match self {
      Self::Gcc4 => Some("libgfortran3"),
      Self::Gcc7 => Some("libgfortran4"),
      Self::Gcc8 => Some("libgfortran5"),
      Self::Any => None,
    }
  }
}

/// C++ standard library string ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CxxAbi {
  Cxx03,
  Cxx11,
  #[default]
  Any,
}

impl CxxAbi {
  pub fn from_tag(tag: &str) -> Option<Self> {
    match tag {
      "cxx03" => Some(Self::Cxx03),
      "cxx11" => Some(Self::Cxx11),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Cxx03 => "cxx03",
      Self::Cxx11 => "cxx11",
      Self::Any => "cxx_any",
    }
  }

  /// The triplet tag for this ABI, `None` for [`CxxAbi::Any`]
  pub fn tag(&self) -> Option<&'static str> {
    match self {
      Self::Any => None,
      other => Some(other.as_str()),
    }
  }
}

/// Compiler ABI section of a platform descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CompilerAbi {
  pub gcc: GccVersion,
  pub cxx: CxxAbi,
}

impl CompilerAbi {
  pub fn new(gcc: GccVersion, cxx: CxxAbi) -> Self {
    Self { gcc, cxx }
  }

  /// True when neither component constrains the match
  pub fn is_any(&self) -> bool {
    self.gcc == GccVersion::Any && self.cxx == CxxAbi::Any
  }

  /// Triplet suffix fields, Fortran tag first
  pub fn triplet_tags(&self) -> Vec<&'static str> {
    self.gcc.gfortran_tag().into_iter().chain(self.cxx.tag()).collect()
  }
}

impl fmt::Display for CompilerAbi {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "CompilerABI(:{}", self.gcc.as_str())?;
    if self.cxx != CxxAbi::Any {
      write!(f, ", :{}", self.cxx.as_str())?;
    }
    write!(f, ")")
  }
}
