use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use flowtrack::commands::{self, Clients, ResourceCommand};
use flowtrack::config::Config;

#[derive(Parser, Debug)]
#[command(name = "flowtrack")]
#[command(about = "A caching command-line client for flow/task tracking servers")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/flowtrack/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Server base URL, overriding the config file
  #[arg(short, long)]
  server: Option<String>,

  #[command(subcommand)]
  command: TopCommand,
}

#[derive(Debug, Subcommand)]
enum TopCommand {
  /// Operate on flows
  Flows {
    #[command(subcommand)]
    command: ResourceCommand,
  },
  /// Operate on tasks
  Tasks {
    #[command(subcommand)]
    command: ResourceCommand,
  },
  /// Operate on notes
  Notes {
    #[command(subcommand)]
    command: ResourceCommand,
  },
  /// Operate on users
  Users {
    #[command(subcommand)]
    command: ResourceCommand,
  },
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_env("FLOWTRACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;

  // Override server url if specified on command line
  let config = if let Some(url) = args.server {
    Config {
      server: flowtrack::config::ServerConfig { url },
    }
  } else {
    config
  };

  let clients = Clients::new(&config)?;

  match args.command {
    TopCommand::Flows { command } => commands::run(&clients.flows, command).await,
    TopCommand::Tasks { command } => commands::run(&clients.tasks, command).await,
    TopCommand::Notes { command } => commands::run(&clients.notes, command).await,
    TopCommand::Users { command } => commands::run(&clients.users, command).await,
  }
}
