pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::cli::config::CliContext;
use crate::models::{Categories, Comments, NewsArticles, Subcategories, Tags, Users};

#[derive(Parser)]
#[command(name = "outline-admin")]
#[command(about = "Outline Kerala admin - manage news, taxonomy, users and comments")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Admin API base URL (overrides OUTLINE_API_BASE_URL)")]
    pub api_url: Option<String>,

    #[arg(long, global = true, help = "Origin for relative media paths (overrides OUTLINE_MEDIA_ORIGIN)")]
    pub media_origin: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Session token management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Manage categories")]
    Categories {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Manage subcategories")]
    Subcategories {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Manage tags")]
    Tags {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Manage news articles")]
    News {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Manage users")]
    Users {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Manage comments")]
    Comments {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },

    #[command(about = "Dashboard summaries")]
    Dashboard {
        #[command(subcommand)]
        cmd: commands::dashboard::DashboardCommands,
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
    let ctx = CliContext::load(cli.api_url.as_deref(), cli.media_origin.as_deref())?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format).await,
        Commands::Categories { cmd } => commands::resource::handle::<Categories>(cmd, &ctx, output_format).await,
        Commands::Subcategories { cmd } => commands::resource::handle::<Subcategories>(cmd, &ctx, output_format).await,
        Commands::Tags { cmd } => commands::resource::handle::<Tags>(cmd, &ctx, output_format).await,
        Commands::News { cmd } => commands::resource::handle::<NewsArticles>(cmd, &ctx, output_format).await,
        Commands::Users { cmd } => commands::resource::handle::<Users>(cmd, &ctx, output_format).await,
        Commands::Comments { cmd } => commands::resource::handle::<Comments>(cmd, &ctx, output_format).await,
        Commands::Dashboard { cmd } => commands::dashboard::handle(cmd, &ctx, output_format).await,
    }
}
