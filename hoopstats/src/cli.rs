///
/// CLI interface for hoopstats: command parsing and the async `run` entrypoint.
///
/// All data access lives in `hoopstats-core`; this module only loads
/// configuration, calls into [`SiteData`], and prints JSON or plain text to
/// stdout. Logs go to stderr so output can be piped.
///
/// For programmatic/integration use, call [`run`] with a constructed [`Cli`].
use crate::load_config::load_config;
use anyhow::Result;
use clap::{Parser, Subcommand};
use hoopstats_core::contract::StoreBackend;
use hoopstats_core::keys::{SeasonId, DEFAULT_SEASON_TYPE};
use hoopstats_core::site::SiteData;
use serde::Serialize;
use std::path::PathBuf;

/// CLI for hoopstats: query the league index and season data behind the site.
#[derive(Parser)]
#[clap(
    name = "hoopstats",
    version,
    about = "Query NBA team stats artifacts published to the object store"
)]
pub struct Cli {
    /// Optional YAML config file; environment variables override it
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the league -> years index as JSON
    Leagues,
    /// Print every `<league>/<year>` season page path
    Paths,
    /// Print one season page's data as JSON
    Season {
        #[clap(long)]
        league: String,
        #[clap(long)]
        year: String,
        #[clap(long, default_value = DEFAULT_SEASON_TYPE)]
        season_type: String,
    },
    /// Print the date the artifacts were last published
    Updated,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    let config = load_config(cli.config.as_deref())?;
    let site = SiteData::from_config(config);
    execute(&site, cli.command).await
}

/// Run one command against an already built [`SiteData`].
pub async fn execute<B: StoreBackend>(site: &SiteData<B>, command: Commands) -> Result<()> {
    match command {
        Commands::Leagues => {
            tracing::info!(command = "leagues", "Building league index");
            let index = site.league_index().await.map_err(|e| {
                tracing::error!(command = "leagues", error = %e, "Listing leagues failed");
                anyhow::Error::new(e)
            })?;
            print_json(&index)
        }
        Commands::Paths => {
            tracing::info!(command = "paths", "Enumerating season paths");
            let paths = site.season_paths().await.map_err(|e| {
                tracing::error!(command = "paths", error = %e, "Enumerating paths failed");
                anyhow::Error::new(e)
            })?;
            for path in paths {
                println!("{path}");
            }
            Ok(())
        }
        Commands::Season {
            league,
            year,
            season_type,
        } => {
            let season = SeasonId::new(league, year, season_type);
            tracing::info!(command = "season", league = %season.league, year = %season.year, "Loading season page");
            match site.season_page_for(&season).await {
                Ok(Some(page)) => print_json(&page),
                Ok(None) => anyhow::bail!(
                    "season {}/{} ({}) not found",
                    season.league,
                    season.year,
                    season.season_type
                ),
                Err(e) => {
                    tracing::error!(command = "season", error = %e, "Loading season failed");
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::Updated => {
            let date = site.update_date().await.map_err(|e| {
                tracing::error!(command = "updated", error = %e, "Reading update date failed");
                anyhow::Error::new(e)
            })?;
            println!("{date}");
            Ok(())
        }
    }
}
