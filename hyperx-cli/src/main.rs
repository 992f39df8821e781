//! hyperx CLI tool

use anyhow::Result;
use clap::{Parser, Subcommand};
use hyperx::observability::{self, ObservabilityConfig};
use hyperx_cli_lib::commands::{CheckCommand, JsonCommand, RenderCommand};
use hyperx_cli_lib::Site;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hyperx")]
#[command(version)]
#[command(about = "Render and check HyperX components", long_about = None)]
struct Cli {
    /// Site directory holding hpxconfig.json
    #[arg(long, global = true, default_value = ".")]
    site: PathBuf,

    /// Configuration file, relative to the site directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a component and print its markup
    Render {
        /// Component name or path (e.g., `UserCard`, `forms/SignUp`)
        component: String,
        /// JSON data for the component
        #[arg(long)]
        data: Option<String>,
        /// File holding JSON data for the component
        #[arg(long, conflicts_with = "data")]
        data_file: Option<PathBuf>,
    },
    /// Load every configured component and report failures
    Check,
    /// Render a JSON payload through a page's templates
    Json {
        /// HTML page containing the target
        page: PathBuf,
        /// Id of the target element
        #[arg(long)]
        target: String,
        /// File holding the JSON payload
        #[arg(long)]
        data: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging = ObservabilityConfig::new("hyperx-cli").with_filter("warn,hyperx=info");
    logging.json = cli.json_logs;
    observability::init_with(&logging)?;

    match cli.command {
        Commands::Render {
            component,
            data,
            data_file,
        } => {
            let site = Site::open(&cli.site, cli.config.as_deref())?;
            RenderCommand::new(component)
                .with_data(data)
                .with_data_file(data_file)
                .execute(&site)
                .await?;
        }
        Commands::Check => {
            let site = Site::open(&cli.site, cli.config.as_deref())?;
            CheckCommand::execute(&site).await?;
        }
        Commands::Json { page, target, data } => {
            JsonCommand::new(page, target, data).execute().await?;
        }
    }

    Ok(())
}
