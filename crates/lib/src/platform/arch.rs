use std::fmt;

/// CPU architecture variants that binary tarballs are published for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arch {
  X86_64,
  I686,
  Aarch64,
  Armv7l,
  Powerpc64le,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X86_64),
      "x86" => Some(Self::I686),
      "aarch64" => Some(Self::Aarch64),
      "arm" => Some(Self::Armv7l),
      "powerpc64" if cfg!(target_endian = "little") => Some(Self::Powerpc64le),
      _ => None,
    }
  }

  /// Parse the architecture field of a platform triplet, accepting common aliases
  pub fn from_triplet_field(field: &str) -> Option<Self> {
    match field {
      "x86_64" | "amd64" => Some(Self::X86_64),
      "i686" | "i586" | "i486" | "i386" => Some(Self::I686),
      "aarch64" => Some(Self::Aarch64),
      "arm" | "armv7l" => Some(Self::Armv7l),
      "powerpc64le" | "ppc64le" => Some(Self::Powerpc64le),
      _ => None,
    }
  }

  /// Returns the identifier used in rendered descriptors (e.g., `:armv7l`)
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::I686 => "i686",
      Self::Aarch64 => "aarch64",
      Self::Armv7l => "armv7l",
      Self::Powerpc64le => "powerpc64le",
    }
  }

  /// Returns the spelling used in tarball triplets. 32-bit ARM is published as `arm`.
  pub fn triplet_str(&self) -> &'static str {
    match self {
      Self::Armv7l => "arm",
      other => other.as_str(),
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
