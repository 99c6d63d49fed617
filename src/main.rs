//! GaitSync viewer.
//!
//! Usage: `gaitsync [CONFIG.yaml|CONFIG.json]`. Without a config three
//! procedural walkers with different cadence are loaded. Set `RUST_LOG` to
//! change log verbosity (default `info`).

use gaitsync::{run_viewer, SyncConfig, SyncEngine};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match SyncConfig::load(&path) {
            Ok(cfg) => {
                info!(path = %path, characters = cfg.characters.len(), "loaded config");
                cfg
            }
            Err(e) => {
                error!(path = %path, error = %e, "invalid config");
                std::process::exit(2);
            }
        },
        None => SyncConfig::demo(),
    };

    let engine = match SyncEngine::from_config(config) {
        Ok(engine) => engine,
        Err(e) => {
            error!(error = %e, "could not set up characters");
            std::process::exit(2);
        }
    };

    if let Err(e) = run_viewer(engine, "GaitSync") {
        error!(error = %e, "viewer exited with an error");
        std::process::exit(1);
    }
}
