//! Application entry point for the Token Forest viewer.
//!
//! This binary parses the command line, sets up logging, loads the
//! configuration and delegates all interactive logic and rendering to
//! [`Viewer`] from the `viewer` module.

mod platform;
mod state;
mod viewer;

use std::path::{Path, PathBuf};

use clap::Parser;
use forest_core::{config::Config, usage::TokenCount};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use viewer::Viewer;

const DEFAULT_LOG_FILTER: &str = "token_forest=info,forest_core=info,warn";

/// Estimate the carbon footprint of AI token usage and grow a forest to match.
#[derive(Parser, Debug)]
#[command(name = "token-forest", version)]
struct Args {
    /// TOML file overriding the emissions, scene and usage constants.
    #[arg(short, long, env = "TOKEN_FOREST_CONFIG")]
    config: Option<PathBuf>,

    /// Skip the calculator and open the forest for this many tokens.
    #[arg(short, long)]
    tokens: Option<f64>,

    /// Seed for reproducible forest layouts.
    #[arg(long)]
    seed: Option<u64>,
}

/// Loads the config file if one was given, falling back to defaults on error.
fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    match Config::load(path) {
        Ok(cfg) => {
            tracing::info!(path = %path.display(), "using config file");
            cfg
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "falling back to default config");
            Config::default()
        }
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if eframe fails to create the native window or event loop.
fn main() -> eframe::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();

    let args = Args::parse();
    let cfg = load_config(args.config.as_deref());

    let mut viewer = Viewer::new(cfg, args.seed);
    if let Some(tokens) = args.tokens {
        match TokenCount::new(tokens) {
            Ok(tokens) => viewer.show_tokens(tokens),
            Err(err) => tracing::warn!(error = %err, "ignoring --tokens"),
        }
    }

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Token Forest",
        options,
        Box::new(|_cc| Ok(Box::new(viewer))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_all_flags() {
        let args = Args::try_parse_from([
            "token-forest",
            "--config",
            "forest.toml",
            "--tokens",
            "1000000",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some(Path::new("forest.toml")));
        assert_eq!(args.tokens, Some(1_000_000.0));
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(&dir.path().join("absent.toml")));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn invalid_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[scene]\nusable_fraction = 2.0\n").unwrap();
        assert_eq!(load_config(Some(&path)), Config::default());
    }

    #[test]
    fn valid_config_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forest.toml");
        std::fs::write(&path, "[emissions]\nco2_per_token_g = 0.0859\n").unwrap();
        assert_eq!(load_config(Some(&path)).emissions.co2_per_token_g, 0.0859);
    }
}
