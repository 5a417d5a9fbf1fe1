use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use agentdesk::config::{ClientConfig, DEFAULT_BASE_URL};

mod cli_exec;

#[derive(Parser)]
#[command(name = "agentdesk")]
#[command(about = "Agent workbench client", long_about = None)]
struct Cli {
    /// Backend origin (http:// or https://)
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Websocket URL (defaults to the backend origin with /ws)
    #[arg(long)]
    ws_url: Option<String>,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    settings_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change persisted settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },

    /// List a workspace folder
    Tree {
        /// Workspace folder ("" is the root)
        #[arg(long)]
        subdir: Option<String>,
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload local files into a workspace folder
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long)]
        subdir: Option<String>,
    },

    /// Print a workspace file
    Open {
        path: String,
        #[arg(long)]
        subdir: Option<String>,
    },

    /// Interactive chat with the agent (one message per line)
    Chat {
        #[arg(long)]
        subdir: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show effective settings
    Show {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Save KEY=VALUE pairs (LLM_MODEL, AGENT, LANGUAGE)
    Set {
        #[arg(required = true)]
        pairs: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    agentdesk::logging::init("warn");
    if let Err(err) = run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings_path = match cli.settings_path {
        Some(p) => p,
        None => ClientConfig::default_settings_path()?,
    };
    let config = ClientConfig::new(&cli.base_url, settings_path)?.with_ws_url(cli.ws_url);

    match cli.command {
        Commands::Settings { command } => cli_exec::handle_settings_command(&config, command)?,
        Commands::Tree { subdir, json } => {
            cli_exec::handle_tree(config.with_workspace_subdir(subdir), json).await?
        }
        Commands::Upload { files, subdir } => {
            cli_exec::handle_upload(config.with_workspace_subdir(subdir), &files).await?
        }
        Commands::Open { path, subdir } => {
            cli_exec::handle_open(config.with_workspace_subdir(subdir), &path).await?
        }
        Commands::Chat { subdir } => {
            cli_exec::handle_chat(config.with_workspace_subdir(subdir)).await?
        }
    }

    Ok(())
}
