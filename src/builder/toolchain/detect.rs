//! Toolchain detection functions.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::util::config::ToolchainConfig;

use super::{GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform};

/// Detect the toolchain used to render flags.
///
/// Tries, in order:
/// 1. `[toolchain]` settings from the merged config files
/// 2. The `CC` environment variable
/// 3. `cc`, `gcc`, `clang`, `cl` on PATH
///
/// With no compiler anywhere, flags are still rendered GCC-style against
/// a plain `cc`; configuring never needs a working compiler.
pub fn detect_toolchain(config: &ToolchainConfig) -> Result<Box<dyn Toolchain>> {
    let forced_family = config
        .toolchain
        .family
        .as_deref()
        .map(|f| f.parse::<ToolchainPlatform>().map_err(anyhow::Error::msg))
        .transpose()
        .context("invalid `family` in toolchain config")?;

    let cc = config
        .toolchain
        .cc
        .clone()
        .filter(|cc| {
            let found = cc.exists() || which::which(cc).is_ok();
            if !found {
                tracing::warn!("configured C compiler not found: {}", cc.display());
            }
            found
        })
        .or_else(|| std::env::var_os("CC").map(PathBuf::from))
        .or_else(|| {
            ["cc", "gcc", "clang", "cl"]
                .iter()
                .find_map(|name| which::which(name).ok())
        });

    let toolchain = match cc {
        Some(cc) => {
            let family = forced_family.unwrap_or_else(|| detect_compiler_family(&cc));
            tracing::debug!("using {} toolchain at {}", family, cc.display());
            toolchain_for(family, Some(cc))
        }
        None => {
            tracing::debug!("no C compiler found, rendering gcc-style flags");
            toolchain_for(forced_family.unwrap_or(ToolchainPlatform::Gcc), None)
        }
    };
    Ok(toolchain)
}

/// Build a toolchain of a given family, defaulting the compiler path to
/// the family's usual driver name.
pub fn toolchain_for(family: ToolchainPlatform, cc: Option<PathBuf>) -> Box<dyn Toolchain> {
    match family {
        ToolchainPlatform::Gcc => Box::new(GccToolchain::new(
            cc.unwrap_or_else(|| PathBuf::from("gcc")),
            ToolchainPlatform::Gcc,
        )),
        ToolchainPlatform::Clang => Box::new(GccToolchain::new(
            cc.unwrap_or_else(|| PathBuf::from("clang")),
            ToolchainPlatform::Clang,
        )),
        ToolchainPlatform::Msvc => {
            Box::new(MsvcToolchain::new(cc.unwrap_or_else(|| PathBuf::from("cl"))))
        }
    }
}

/// Detect whether the compiler is GCC, Clang, or MSVC.
fn detect_compiler_family(cc: &Path) -> ToolchainPlatform {
    // Check binary name first
    let name = cc
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_lowercase();

    if name == "cl" || name == "clang-cl" {
        return ToolchainPlatform::Msvc;
    } else if name.contains("clang") {
        return ToolchainPlatform::Clang;
    } else if name.contains("gcc") {
        return ToolchainPlatform::Gcc;
    }

    // `cc` is usually a symlink; ask the driver
    if let Ok(output) = std::process::Command::new(cc).arg("--version").output() {
        let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
        if stdout.contains("clang") {
            return ToolchainPlatform::Clang;
        }
    }

    ToolchainPlatform::Gcc
}
