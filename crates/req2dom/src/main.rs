mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("req2dom=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Analyze {
            file,
            analyzer,
            format,
            output,
        } => {
            cli::analyze::run(
                config,
                cli.locale,
                file.as_deref(),
                analyzer,
                format,
                output.as_deref(),
            )
            .await
        }
        Commands::Render { file, output } => {
            cli::render::run(config, cli.locale, file.as_deref(), output.as_deref())
        }
        Commands::Normalize { file } => cli::normalize::run(config, cli.locale, file.as_deref()),
    }
}
