//! relnotes - release notes and documentation site generator.

mod assets;
mod build;
mod cli;
mod config;
mod content;
mod filter;
mod generator;
mod init;
mod logger;
mod render;
mod report;
mod routes;
mod serve;
mod state;
mod style;
mod utils;
mod watch;

use anyhow::{Context, Result};
use build::build_site;
use clap::Parser;
use cli::{Cli, Commands};
use config::{SiteConfig, cfg, init_config};
use content::{ContentStore, init_store};
use init::new_site;
use serve::serve_site;
use std::sync::Arc;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    init_config(load_config(cli)?);
    let config = cfg();

    match &cli.command {
        Commands::Init { name } => new_site(&config, name.is_some()),
        Commands::Build { .. } => build_site(&config, &*load_content(&config)?),
        Commands::Serve { .. } => {
            load_content(&config)?;
            serve_site()
        }
        Commands::Query { text, tag, json } => report::print_query(
            &*load_content(&config)?,
            text.as_deref().unwrap_or_default(),
            tag.as_deref(),
            *json,
        ),
        Commands::Tags { version, top, json } => report::print_tags(
            &*load_content(&config)?,
            version.as_deref(),
            *top,
            *json,
        ),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let config = SiteConfig::load(cli)?;
    config.validate()?;
    Ok(config)
}

/// Load the content directory into the global store.
fn load_content(config: &SiteConfig) -> Result<Arc<ContentStore>> {
    init_store(&config.build.content).with_context(|| {
        format!(
            "Failed to load content from {}",
            config.build.content.display()
        )
    })
}
