//! Toolchain abstraction for rendering compile surfaces as compiler flags.
//!
//! Toolchain detection priority:
//! 1. Toolchain config file (`.bspkit/toolchain.toml` or the user config dir)
//! 2. The `CC` environment variable
//! 3. Auto-detection (searching PATH for `cc`, `gcc`, `clang`, `cl`)

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::surface::{Define, OptLevel};

mod detect;
mod gcc;
mod msvc;

pub use detect::{detect_toolchain, toolchain_for};
pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute, with program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "arm-none-eabi-gcc", "cl.exe")
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Input for a compile step.
#[derive(Debug, Clone, Default)]
pub struct CompileInput {
    /// Source file to compile
    pub source: PathBuf,
    /// Output object file
    pub output: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub defines: Vec<Define>,
    pub cflags: Vec<String>,
    /// The compiling target's own level
    pub opt_level: Option<OptLevel>,
}

/// The family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPlatform {
    Gcc,
    Clang,
    Msvc,
}

impl ToolchainPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::Clang => "clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }
}

impl fmt::Display for ToolchainPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolchainPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" | "gnu" => Ok(ToolchainPlatform::Gcc),
            "clang" | "llvm" => Ok(ToolchainPlatform::Clang),
            "msvc" | "cl" => Ok(ToolchainPlatform::Msvc),
            _ => Err(format!(
                "unknown toolchain family `{}`; expected gcc, clang or msvc",
                s
            )),
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to spell a compile surface for its compiler.
pub trait Toolchain: Send + Sync {
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C compiler path.
    fn compiler_path(&self) -> &Path;

    fn opt_flag(&self, level: OptLevel) -> String;

    fn include_flag(&self, dir: &Path) -> String;

    fn define_flag(&self, define: &Define) -> String;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;

    /// Generate a compile command for one translation unit.
    fn compile_command(&self, input: &CompileInput) -> CommandSpec;

    /// Flags for everything but the source and output, in the order
    /// opt level, include dirs, defines, cflags.
    fn compile_flags(&self, input: &CompileInput) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(level) = input.opt_level {
            flags.push(self.opt_flag(level));
        }
        flags.extend(input.include_dirs.iter().map(|d| self.include_flag(d)));
        flags.extend(input.defines.iter().map(|d| self.define_flag(d)));
        flags.extend(input.cflags.iter().cloned());
        flags
    }
}
