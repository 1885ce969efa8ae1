use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::ConfigLoader;
use crate::feed::{self, RecordStore};
use crate::prefs::PreferenceStore;

pub mod commands;

use self::commands::ListArgs;

#[derive(Parser, Debug)]
#[command(
    name = "pulsetui",
    version,
    about = "Terminal dashboard for product-update feeds"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over PULSETUI_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over PULSETUI_DATA)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// JSON feed to load (takes precedence over feed.path in the config)
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive dashboard (default)
    Tui,
    /// Print matching updates without entering the TUI
    List(ListArgs),
    /// Print the category tags derived from the feed
    Categories,
    /// Print the week buckets derived from the feed
    Weeks,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var("PULSETUI_CONFIG", path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var("PULSETUI_DATA", path);
    }

    let loader = ConfigLoader::discover()?;
    loader.paths().ensure_directories()?;
    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let config = loader.load_or_init()?;
    let prefs = PreferenceStore::open(&loader.paths().state_dir)?;

    let feed_path = cli.feed.clone().or_else(|| config.feed.path.clone());
    let store = resolve_store(feed_path.as_deref(), &prefs)?;

    let config = Arc::new(config);
    let command = cli.command.unwrap_or(Commands::Tui);
    match command {
        Commands::Tui => {
            let mut app = App::new(config, prefs, store, feed_path);
            commands::run_tui(&mut app)
        }
        Commands::List(args) => commands::list_updates(&store, args),
        Commands::Categories => commands::list_categories(&store),
        Commands::Weeks => commands::list_weeks(&store),
    }
}

/// Loads the feed from disk when a path is known, refreshing the cached
/// copy; otherwise falls back to the cache, then to an empty store.
fn resolve_store(feed_path: Option<&std::path::Path>, prefs: &PreferenceStore) -> Result<RecordStore> {
    if let Some(path) = feed_path {
        let records = feed::load_feed(path)?;
        if let Err(err) = prefs.cache_feed(&records) {
            tracing::warn!(?err, "failed to write the feed cache");
        }
        return Ok(RecordStore::new(records));
    }
    match prefs.cached_feed().context("reading the cached feed")? {
        Some(records) => {
            tracing::debug!(count = records.len(), "using cached feed");
            Ok(RecordStore::new(records))
        }
        None => Ok(RecordStore::default()),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}
