mod app;
mod block_font;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::{Arc, Mutex},
};

use cinelink_core::{
    config::{self, AppConfig},
    load_dataset, ConnectionIndex, DatasetPaths, Movie, MovieIndex,
};
use rand::seq::SliceRandom;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let config_file = config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    info!(config = %config_file.display(), "Configuration loaded");

    let paths = DatasetPaths::from_config(&config).context("failed to locate the movie dataset")?;
    let (index, report) = load_dataset(&paths).with_context(|| {
        format!(
            "failed to load {} and {}",
            paths.movies.display(),
            paths.credits.display()
        )
    })?;

    let mut app = app::CinelinkApp::new(index.clone(), report, config);
    match pick_initial_movie(&index) {
        Some(movie) => {
            info!(movie = %movie, "Initial movie chosen");
            app.set_initial_movie(movie);
        }
        None => warn!("No movie in the dataset has a connection"),
    }
    app.run().await
}

/// Random movie that has at least one connected movie.
fn pick_initial_movie(index: &MovieIndex) -> Option<Arc<Movie>> {
    let candidates: Vec<Arc<Movie>> = index
        .all()
        .into_iter()
        .filter(|movie| !index.connected_to(movie).is_empty())
        .collect();
    candidates.choose(&mut rand::thread_rng()).cloned()
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join("cinelink.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the UI; logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
