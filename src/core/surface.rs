//! Surface contract - what a target exports vs keeps to itself.
//!
//! A target's compile requirements are split in two halves. The public
//! half propagates to every dependent; the private half only affects the
//! target's own compilation units.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Complete surface contract for a target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    /// Compile-time requirements (includes, defines, flags)
    #[serde(default)]
    pub compile: CompileSurface,
}

/// Compile-time surface (public vs private).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileSurface {
    /// Requirements that propagate to dependents
    #[serde(default)]
    pub public: CompileRequirements,

    /// Internal-only requirements
    #[serde(default)]
    pub private: CompileRequirements,
}

/// Compile-time requirements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileRequirements {
    /// Include directories (-I)
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,

    /// Preprocessor defines (-D)
    #[serde(default)]
    pub defines: Vec<Define>,

    /// Additional compiler flags
    #[serde(default)]
    pub cflags: Vec<String>,
}

impl CompileRequirements {
    /// Merge another set of requirements into this one.
    pub fn merge(&mut self, other: &CompileRequirements) {
        self.include_dirs.extend(other.include_dirs.iter().cloned());
        self.defines.extend(other.defines.iter().cloned());
        self.cflags.extend(other.cflags.iter().cloned());
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.include_dirs.is_empty() && self.defines.is_empty() && self.cflags.is_empty()
    }
}

/// A preprocessor define.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Define {
    /// Simple flag: -DFOO
    Flag(String),
    /// Key-value: -DFOO=bar
    KeyValue { name: String, value: String },
}

impl Define {
    /// Create a simple flag define.
    pub fn flag(name: impl Into<String>) -> Self {
        Define::Flag(name.into())
    }

    /// Create a key-value define.
    pub fn key_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Define::KeyValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Get the define name.
    pub fn name(&self) -> &str {
        match self {
            Define::Flag(n) => n.split('=').next().unwrap_or(n),
            Define::KeyValue { name, .. } => name,
        }
    }

    /// Get the define value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Define::Flag(n) => n.split_once('=').map(|(_, v)| v),
            Define::KeyValue { value, .. } => Some(value),
        }
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            Some(value) => write!(f, "{}={}", self.name(), value),
            None => write!(f, "{}", self.name()),
        }
    }
}

/// Optimization level applied to a target's own compilation units.
///
/// This is never part of the public surface: dependents compile with
/// their own level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptLevel {
    /// No optimization (`-O0`, `/Od`)
    None,
    /// `-O1`
    Basic,
    /// `-O2`
    Full,
    /// `-O3`
    Aggressive,
    /// `-Os`
    Size,
    /// `-Oz`
    MinSize,
    /// `-Og`
    Debug,
}

impl OptLevel {
    /// The manifest spelling of this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            OptLevel::None => "0",
            OptLevel::Basic => "1",
            OptLevel::Full => "2",
            OptLevel::Aggressive => "3",
            OptLevel::Size => "s",
            OptLevel::MinSize => "z",
            OptLevel::Debug => "g",
        }
    }
}

impl fmt::Display for OptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" | "none" => Ok(OptLevel::None),
            "1" => Ok(OptLevel::Basic),
            "2" => Ok(OptLevel::Full),
            "3" => Ok(OptLevel::Aggressive),
            "s" => Ok(OptLevel::Size),
            "z" => Ok(OptLevel::MinSize),
            "g" => Ok(OptLevel::Debug),
            _ => Err(format!(
                "invalid opt_level `{}`; expected one of 0, 1, 2, 3, s, z, g",
                s
            )),
        }
    }
}

impl Serialize for OptLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OptLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Accept both `opt_level = 0` and `opt_level = "0"`.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u8),
            Str(String),
        }

        let s = match Raw::deserialize(deserializer)? {
            Raw::Int(n) => n.to_string(),
            Raw::Str(s) => s,
        };
        s.parse().map_err(serde::de::Error::custom)
    }
}
