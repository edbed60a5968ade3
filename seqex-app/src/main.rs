mod app;
mod input;

use std::path::PathBuf;

use anyhow::{Context, Result};
use seqex_experiment::ExperimentConfig;

use app::App;

fn main() -> Result<()> {
    init_tracing();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: seqex-app <config.json>")?;
    let config = ExperimentConfig::from_path(&path)
        .with_context(|| format!("could not load experiment config {}", path.display()))?;

    App::new(config).run()
}

// Logs go to stderr, stdout shows the screens.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}
