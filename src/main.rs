mod config;
mod db;
mod error;
mod export;
mod logging;
mod models;
mod run;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;

fn main() -> Result<()> {
    let args = config::Args::parse();
    logging::init();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut stdout = std::io::stdout();

    let target = config::resolve_database(&args, &mut input, &mut stdout)?;
    tracing::info!(database = %target, "opening database");
    let mut store = db::Store::open(&target, &args.store_options())
        .with_context(|| format!("Cannot connect to database: {target}"))?;

    let result = if args.command.is_empty() {
        run::as_repl(&mut input, &mut store, &mut stdout)
    } else {
        run::as_cli(&args.command, &mut store, &mut stdout)
    };

    let closed = store.close();
    result?;
    closed.context("Failed to close database")?;
    tracing::info!("database closed");
    Ok(())
}
