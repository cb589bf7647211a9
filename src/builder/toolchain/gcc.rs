//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::surface::{Define, OptLevel};

use super::{CommandSpec, CompileInput, Toolchain, ToolchainPlatform};

/// GCC-style toolchain (gcc, clang, and cross variants such as
/// `arm-none-eabi-gcc`).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C compiler
    pub cc: PathBuf,
    /// Compiler family (gcc or clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    pub fn new(cc: PathBuf, family: ToolchainPlatform) -> Self {
        GccToolchain { cc, family }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cc
    }

    fn opt_flag(&self, level: OptLevel) -> String {
        format!("-O{}", level.as_str())
    }

    fn include_flag(&self, dir: &Path) -> String {
        format!("-I{}", dir.display())
    }

    fn define_flag(&self, define: &Define) -> String {
        format!("-D{}", define)
    }

    fn object_extension(&self) -> &str {
        "o"
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        CommandSpec::new(&self.cc)
            .arg("-c")
            .args(self.compile_flags(input))
            .arg("-o")
            .arg(input.output.display().to_string())
            .arg(input.source.display().to_string())
    }
}
