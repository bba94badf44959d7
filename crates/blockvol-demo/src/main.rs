//! Demo binary that builds a block volume and exercises views, workers and
//! snapshots on it.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p blockvol-demo` for the default 16³ volume.
//! Run with `cargo run -p blockvol-demo -- --size 32,8,32 --global-palette` to override.

mod demos;

use std::path::PathBuf;
use std::sync::Arc;

use blockvol_config::{CliArgs, Config, PaletteKind, default_config_dir};
use blockvol_storage::{GlobalPalette, LocalPalette};
use clap::Parser;
use tracing::{error, info};

use crate::demos::DemoBlock;

fn main() {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(|| default_config_dir().ok())
        .unwrap_or_else(|| PathBuf::from(".blockvol"));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    let file_logging = cfg!(debug_assertions) || config.debug.log_to_file;
    blockvol_log::init_logging(Some(&log_dir), file_logging, Some(&config));

    info!(
        "Volume origin {:?}, size {:?}, {:?} palette",
        config.volume.origin, config.volume.size, config.volume.palette
    );

    let result = match config.volume.palette {
        PaletteKind::Local => {
            let palette = match config.volume.palette_limit {
                Some(limit) => LocalPalette::with_limit(limit),
                None => LocalPalette::new(),
            };
            demos::run(Arc::new(palette), &config.volume)
        }
        PaletteKind::Global => match GlobalPalette::from_states(DemoBlock::SOLID) {
            Ok(palette) => demos::run(Arc::new(palette), &config.volume),
            Err(e) => Err(e.into()),
        },
    };

    if let Err(e) = result {
        error!("Demo failed: {e}");
        std::process::exit(1);
    }
    info!("All demonstrations completed successfully");
}
