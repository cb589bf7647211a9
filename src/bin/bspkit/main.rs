//! bspkit CLI - compose board-support libraries into a build graph

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bspkit::util::diagnostic::{emit, Diagnostic};
use bspkit::util::{GlobalContext, Shell};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    // Parse CLI
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);
    let color = shell.use_color();

    if let Err(e) = run(cli, shell) {
        emit(&Diagnostic::from_error(&e), color);
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: Shell) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("bspkit=debug")
    } else if cli.quiet {
        EnvFilter::new("bspkit=error")
    } else {
        EnvFilter::new("bspkit=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let ctx = GlobalContext::new()?
        .with_manifest_path(cli.manifest_path)
        .with_shell(shell);

    // Execute command
    match cli.command {
        Commands::Init(args) => commands::init::execute(args, &ctx),
        Commands::Configure(args) => commands::configure::execute(args, &ctx),
        Commands::Sources(args) => commands::sources::execute(args, &ctx),
        Commands::Flags(args) => commands::flags::execute(args, &ctx),
        Commands::Tree(args) => commands::tree::execute(args, &ctx),
        Commands::Status => commands::status::execute(&ctx),
        Commands::Toolchain(args) => commands::toolchain::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
