//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use bspkit::builder::ToolchainPlatform;
use bspkit::util::shell::ColorChoice;

/// bspkit - compose board-support libraries into a build graph
#[derive(Parser)]
#[command(name = "bspkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, default_value = "auto", value_parser = parse_color)]
    pub color: ColorChoice,

    /// Path to the root Bspkit.toml
    #[arg(long, global = true, env = "BSPKIT_MANIFEST_PATH")]
    pub manifest_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

fn parse_color(s: &str) -> Result<ColorChoice, String> {
    s.parse()
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a header-only library manifest
    Init(InitArgs),

    /// Discover sources and compose every target
    Configure(ConfigureArgs),

    /// List the discovered sources of a target
    Sources(SourcesArgs),

    /// Show effective compile flags for a target
    Flags(FlagsArgs),

    /// Display the target dependency tree
    Tree(TreeArgs),

    /// Report targets whose sources changed since the last configure
    Status,

    /// Toolchain information
    Toolchain(ToolchainArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    pub path: Option<PathBuf>,

    /// Target name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct ConfigureArgs {
    /// Print the configure plan as JSON instead of a summary
    #[arg(long)]
    pub plan: bool,

    /// Also write .bspkit/compile_commands.json
    #[arg(long)]
    pub compile_commands: bool,
}

#[derive(Args)]
pub struct SourcesArgs {
    /// Target to list
    pub target: String,

    /// Print absolute paths
    #[arg(long)]
    pub absolute: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Target to show flags for
    pub target: String,

    /// Spell flags for this toolchain family instead of the detected one
    #[arg(long, value_enum)]
    pub toolchain: Option<FamilyArg>,

    /// Print the bare flag list without provenance
    #[arg(long)]
    pub plain: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FamilyArg {
    Gcc,
    Clang,
    Msvc,
}

impl From<FamilyArg> for ToolchainPlatform {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Gcc => ToolchainPlatform::Gcc,
            FamilyArg::Clang => ToolchainPlatform::Clang,
            FamilyArg::Msvc => ToolchainPlatform::Msvc,
        }
    }
}

#[derive(Args)]
pub struct TreeArgs {
    /// Target to show the tree for (defaults to every top-level target)
    pub target: Option<String>,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,
}

#[derive(Args)]
pub struct ToolchainArgs {
    #[command(subcommand)]
    pub command: ToolchainCommands,
}

#[derive(Subcommand)]
pub enum ToolchainCommands {
    /// Show the detected toolchain and where its settings came from
    Show,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
