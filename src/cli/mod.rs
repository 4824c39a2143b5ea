pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "census")]
#[command(about = "Census CLI - administration tool for the survey collection API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the API server")]
    Serve {
        #[arg(long, default_value_t = 3000, help = "Port to listen on")]
        port: u16,
    },

    #[command(about = "Create the database schema (idempotent)")]
    Init,

    #[command(about = "Create the first nationwide administrator")]
    Bootstrap {
        #[arg(help = "Administrator email")]
        email: String,
        #[arg(help = "Administrator password")]
        password: String,
    },

    #[command(about = "Bulk-import the geographic hierarchy from a JSON file")]
    Import {
        #[arg(help = "Path to the hierarchy JSON file")]
        file: String,
    },

    #[command(about = "Replace the required-question set from a JSON file")]
    Questions {
        #[arg(help = "Path to the question list JSON file")]
        file: String,
    },

    #[command(about = "Check a running server's /health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:3000", help = "Server base URL")]
        url: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port } => commands::serve::handle(port).await,
        Commands::Init => commands::init::handle(output_format).await,
        Commands::Bootstrap { email, password } => {
            commands::bootstrap::handle(email, password, output_format).await
        }
        Commands::Import { file } => commands::import::handle(file, output_format).await,
        Commands::Questions { file } => commands::questions::handle(file, output_format).await,
        Commands::Health { url } => commands::health::handle(url, output_format).await,
    }
}
