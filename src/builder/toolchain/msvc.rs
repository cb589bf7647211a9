//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::surface::{Define, OptLevel};

use super::{CommandSpec, CompileInput, Toolchain, ToolchainPlatform};

/// MSVC toolchain (Windows).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    /// Path to cl.exe
    pub cl: PathBuf,
}

impl MsvcToolchain {
    pub fn new(cl: PathBuf) -> Self {
        MsvcToolchain { cl }
    }
}

impl Toolchain for MsvcToolchain {
    fn platform(&self) -> ToolchainPlatform {
        ToolchainPlatform::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn opt_flag(&self, level: OptLevel) -> String {
        // cl has no separate debug-friendly or min-size levels
        let flag = match level {
            OptLevel::None | OptLevel::Debug => "/Od",
            OptLevel::Size | OptLevel::MinSize => "/O1",
            OptLevel::Basic | OptLevel::Full => "/O2",
            OptLevel::Aggressive => "/Ox",
        };
        flag.to_string()
    }

    fn include_flag(&self, dir: &Path) -> String {
        format!("/I{}", dir.display())
    }

    fn define_flag(&self, define: &Define) -> String {
        format!("/D{}", define)
    }

    fn object_extension(&self) -> &str {
        "obj"
    }

    fn compile_command(&self, input: &CompileInput) -> CommandSpec {
        CommandSpec::new(&self.cl)
            .arg("/nologo")
            .arg("/c")
            .args(self.compile_flags(input))
            .arg(format!("/Fo{}", input.output.display()))
            .arg(input.source.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msvc_spelling() {
        let tc = MsvcToolchain::new(PathBuf::from("cl.exe"));
        assert_eq!(tc.opt_flag(OptLevel::None), "/Od");
        assert_eq!(tc.opt_flag(OptLevel::Aggressive), "/Ox");
        assert_eq!(tc.include_flag(Path::new("C:/ws/periph")), "/IC:/ws/periph");
        assert_eq!(tc.define_flag(&Define::key_value("F_CPU", "16000000")), "/DF_CPU=16000000");
    }

    #[test]
    fn test_compile_command() {
        let tc = MsvcToolchain::new(PathBuf::from("cl.exe"));
        let input = CompileInput {
            source: PathBuf::from("main.c"),
            output: PathBuf::from("main.obj"),
            opt_level: Some(OptLevel::None),
            ..Default::default()
        };

        let cmd = tc.compile_command(&input);
        assert_eq!(cmd.args, vec!["/nologo", "/c", "/Od", "/Fomain.obj", "main.c"]);
    }
}
