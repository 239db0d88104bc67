// Copyright 2026 Smart Scraper Contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use smart_scraper::cli;
use smart_scraper::config::{RendererBackend, ServiceConfig};
use smart_scraper::service::ExtractionMode;
use std::net::IpAddr;

#[derive(Parser)]
#[command(
    name = "smart-scraper",
    about = "smart-scraper: visible text from any URL, static or rendered",
    version,
    after_help = "Run 'smart-scraper <command> --help' for details on each command.\nRun 'smart-scraper' with no command to start the HTTP service."
)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service (POST /scrape)
    Serve {
        /// Listen port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Listen address (overrides HOST)
        #[arg(long)]
        host: Option<IpAddr>,
        /// Rendering backend for dynamic pages (overrides SCRAPER_RENDERER)
        #[arg(long, value_enum)]
        renderer: Option<RendererBackend>,
    },
    /// Extract one URL and print the result as JSON
    Scrape {
        /// URL to extract
        url: String,
        /// Path selection
        #[arg(long, value_enum, default_value = "auto")]
        mode: ExtractionMode,
    },
    /// Show whether a URL would take the static or dynamic path
    Classify {
        /// URL to classify
        url: String,
    },
    /// Render a URL in headless Chromium and print its visible text
    Render {
        /// URL to render
        url: String,
    },
    /// Check environment and diagnose issues
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.json_logs, cli.verbose);

    let result = run(cli).await;

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}

async fn run(cli: Cli) -> Result<()> {
    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "smart-scraper", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = ServiceConfig::from_env().context("invalid configuration")?;

    match cli.command {
        None => cli::serve::run(config).await,
        Some(Commands::Serve {
            port,
            host,
            renderer,
        }) => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(renderer) = renderer {
                config.renderer = renderer;
            }
            cli::serve::run(config).await
        }
        Some(Commands::Scrape { url, mode }) => cli::scrape_cmd::run(&config, &url, mode).await,
        Some(Commands::Classify { url }) => cli::classify_cmd::run(&config, &url).await,
        Some(Commands::Render { url }) => cli::render_cmd::run(&config, &url).await,
        Some(Commands::Doctor) => cli::doctor::run(&config).await,
        Some(Commands::Completions { .. }) => Ok(()),
    }
}
