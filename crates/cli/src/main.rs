use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;
mod logging;

use commands::{create_world, execute_serve_command, list_worlds, ServeArgs};

#[derive(Parser)]
#[command(name = "worldctl")]
#[command(about = "Worldctl - HTTP control plane for game-server worlds")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the world control service
    Serve(ServeCommandArgs),
    /// Inspect or create world directories
    Worlds(WorldsArgs),
}

#[derive(Args)]
pub struct ServeCommandArgs {
    /// Configuration file (created with defaults if missing)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to bind, e.g. 0.0.0.0:8085
    #[arg(short, long)]
    pub bind: Option<String>,
    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Directory holding the worlds
    #[arg(short, long)]
    pub worlds_dir: Option<PathBuf>,
    /// Do not load worlds at startup
    #[arg(long)]
    pub no_autoload: bool,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Emit JSON logs
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Args)]
pub struct WorldsArgs {
    /// Directory holding the worlds
    #[arg(short, long, global = true, default_value = "worlds")]
    pub worlds_dir: PathBuf,
    #[command(subcommand)]
    pub command: WorldsCommands,
}

#[derive(Subcommand)]
pub enum WorldsCommands {
    /// List known worlds
    List,
    /// Create an empty world directory
    Create { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let serve_args = ServeArgs {
                config: args.config,
                bind: args.bind,
                port: args.port,
                worlds_dir: args.worlds_dir,
                no_autoload: args.no_autoload,
                log_level: args.log_level,
                log_json: args.log_json,
            };
            execute_serve_command(serve_args).await
        }
        Commands::Worlds(args) => match args.command {
            WorldsCommands::List => list_worlds(&args.worlds_dir),
            WorldsCommands::Create { name } => create_world(&args.worlds_dir, &name),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["worldctl", "serve", "--port", "9000", "--no-autoload"]);
        match cli.command {
            Commands::Serve(args) => {
                assert_eq!(args.port, Some(9000));
                assert!(args.no_autoload);
                assert!(args.config.is_none());
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_worlds_create() {
        let cli = Cli::parse_from(["worldctl", "worlds", "create", "spawn", "--worlds-dir", "/srv/w"]);
        match cli.command {
            Commands::Worlds(args) => {
                assert_eq!(args.worlds_dir, PathBuf::from("/srv/w"));
                assert!(matches!(args.command, WorldsCommands::Create { ref name } if name == "spawn"));
            }
            _ => panic!("expected worlds"),
        }
    }
}
