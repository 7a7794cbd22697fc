//! Ephemera command-line interface.

pub mod client;
pub mod commands;

use clap::{Parser, Subcommand};
use ephemera_core::Config;
use url::Url;

/// Default API address used by `create` and `lookup`.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

/// Ephemera - one-time secret sharing
#[derive(Parser)]
#[command(name = "ephemera")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true, env = "EPHEMERA_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Server address for create and lookup
    #[arg(
        long,
        global = true,
        env = "EPHEMERA_SERVER",
        default_value = DEFAULT_SERVER,
        value_parser = parse_server_url
    )]
    pub server: Url,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start(commands::start::StartArgs),

    /// Store a new secret
    Create(commands::create::CreateArgs),

    /// Reveal a secret, consuming one view
    Lookup(commands::lookup::LookupArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// Accept only absolute http(s) URLs.
pub fn parse_server_url(value: &str) -> Result<Url, String> {
    let url = Url::parse(value).map_err(|e| format!("invalid server address '{value}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(format!(
            "server address '{value}' must start with http:// or https://"
        )),
    }
}

/// Run the CLI with the given arguments and resolved configuration.
pub async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Start(args) => commands::start::run(args, config).await,
        Commands::Create(args) => commands::create::run(args, &cli.server, cli.json).await,
        Commands::Lookup(args) => commands::lookup::run(args, &cli.server, cli.json).await,
        Commands::Config(args) => commands::config::run(args, config, cli.config.as_deref()).await,
        Commands::Version => {
            println!("ephemera {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
