mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{compile, init, tree, CompileArgs, InitArgs, TreeArgs};

/// Environment variable holding the log filter, e.g. `MDTREE_LOG=mdtree_runtime=debug`
const LOG_ENV: &str = "MDTREE_LOG";

/// mdtree CLI - Parse, inspect and render markdown documents
#[derive(Parser, Debug)]
#[command(name = "mdtree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new mdtree project
    Init(InitArgs),

    /// Render .md files to HTML or normalized markdown
    Compile(CompileArgs),

    /// Print the node tree of a markdown file
    Tree(TreeArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Compile(args) => compile(args, &cwd),
                Command::Tree(args) => tree(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
