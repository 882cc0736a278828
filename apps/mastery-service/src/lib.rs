pub mod commands;
pub mod config;
pub mod db;
pub mod state;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServiceConfig;
use crate::db::SqliteMasteryStore;
use crate::state::AppState;

/// Read requests from stdin until EOF, answering each on stdout.
pub fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ServiceConfig::from_env().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    tracing::info!("Opening database at {}", config.db_path.display());
    let store = SqliteMasteryStore::open(&config.db_path)?;
    let state = AppState::new(store, config.scheduler)?;

    serve(&state, io::stdin().lock(), io::stdout().lock())
}

/// Line loop over arbitrary reader/writer pairs.
pub fn serve<R: BufRead, W: Write>(state: &AppState, input: R, mut output: W) -> anyhow::Result<()> {
    tracing::info!("Ready for requests");
    let mut handled = 0usize;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = commands::handle_line(state, &line);
        writeln!(output, "{response}")?;
        output.flush()?;
        handled += 1;
    }
    tracing::info!("Input closed after {} requests", handled);
    Ok(())
}
