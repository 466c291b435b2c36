mod commands;
mod config;
mod project;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    edit, init, inspect, schema, validate, EditArgs, InitArgs, InspectArgs, SchemaArgs, ValidateArgs,
};
use tracing_subscriber::EnvFilter;

/// compedit - Schema-driven prop editor for video compositions
#[derive(Parser, Debug)]
#[command(name = "compedit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log editor activity (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new compedit project
    Init(InitArgs),

    /// Show compositions, or the prop editors of one
    Inspect(InspectArgs),

    /// Edit a composition's props and save them
    Edit(EditArgs),

    /// Check stored props against their schemas
    Validate(ValidateArgs),

    /// Show component schemas
    Schema(SchemaArgs),
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Inspect(args) => inspect(args, &cwd),
                Command::Edit(args) => edit(args, &cwd),
                Command::Validate(args) => validate(args, &cwd),
                Command::Schema(args) => schema(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
