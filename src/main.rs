mod api;
mod cli;
mod config;
mod db;
mod models;
mod prayer_times;
mod tui;
mod utils;

use anyhow::{Context, Result};
use chrono::{Duration, Local};
use clap::Parser;
use log::debug;
use rusqlite::Connection;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;
use db::CacheRepo;
use db::migrations::run_migrations;

/// Cached timings older than this are dropped at startup.
const CACHE_RETENTION_DAYS: i64 = 7;

/// Open the timings cache, bring its schema up to date and drop stale days.
fn open_cache() -> Result<Connection> {
    AppConfig::ensure_data_dir()?;
    let path = AppConfig::db_path()?;
    let conn =
        Connection::open(&path).with_context(|| format!("Opening timings cache at {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;

    let cutoff = Local::now().date_naive() - Duration::days(CACHE_RETENTION_DAYS);
    let pruned = CacheRepo::prune_before(&conn, cutoff)?;
    if pruned > 0 {
        debug!("Pruned {} cached day(s) before {}", pruned, cutoff);
    }
    Ok(conn)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = AppConfig::load().context("Loading config")?;
    let conn = open_cache()?;

    match cli.command {
        Some(Commands::Times { offline, at }) => {
            handlers::handle_times(&conn, &config, offline, at.as_deref())?;
        }
        Some(Commands::Countdown { ticks, offline }) => {
            handlers::handle_countdown(&conn, &config, ticks, offline)?;
        }
        Some(Commands::Location { lat, lon, name }) => {
            handlers::handle_location(&mut config, lat, lon, name)?;
        }
        None => tui::app::run(conn, config)?,
    }

    Ok(())
}
