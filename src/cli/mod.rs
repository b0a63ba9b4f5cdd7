pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "tiktide")]
#[command(about = "Harvest TikTok explore and search metadata through a real browser", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/tiktide/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Use shorter waits (less reliable against slow pages)
    #[arg(long, global = true)]
    pub fast: bool,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    pub headed: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Collect metadata for videos on the explore page
    Explore {
        /// How many videos to visit
        #[arg(short, long, default_value_t = 10, value_parser = positive)]
        number: usize,
    },
    /// List video URLs from a keyword search
    Search {
        /// Search keywords
        keywords: String,
        /// Maximum number of URLs to print
        #[arg(short, long, default_value_t = 10, value_parser = positive)]
        number: usize,
    },
    /// List explore links and titles without visiting them
    Links,
}

impl Cli {
    /// Fold command-line flags into the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.fast {
            config.scraper = config.scraper.clone().with_fast_timings();
        }
        if self.headed {
            config.scraper.headless = false;
        }
        if let Commands::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
        }
    }
}

fn positive(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err("must be a positive integer".to_string()),
    }
}
