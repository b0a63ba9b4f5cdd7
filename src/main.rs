use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tiktide::app::AppContext;
use tiktide::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON on stdout stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = AppContext::load_config(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    let ctx = AppContext::new(config);

    match cli.command {
        Commands::Serve { .. } => {
            commands::serve(&ctx).await?;
        }
        Commands::Explore { number } => {
            commands::explore(&ctx, number).await?;
        }
        Commands::Search { ref keywords, number } => {
            commands::search(&ctx, keywords, number).await?;
        }
        Commands::Links => {
            commands::links(&ctx).await?;
        }
    }

    Ok(())
}
