//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, PaletteKind};

/// blockvol command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "blockvol", about = "Palette-compressed block volume demo")]
pub struct CliArgs {
    /// Volume size as three comma-separated integers, e.g. `32,16,32`.
    #[arg(long, value_parser = parse_triple)]
    pub size: Option<[i32; 3]>,

    /// Volume origin as three comma-separated integers.
    #[arg(long, value_parser = parse_triple, allow_hyphen_values = true)]
    pub origin: Option<[i32; 3]>,

    /// Use the shared global palette instead of a growable local one.
    #[arg(long)]
    pub global_palette: bool,

    /// Seed for randomized fill patterns.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(size) = args.size {
            self.volume.size = size;
        }
        if let Some(origin) = args.origin {
            self.volume.origin = origin;
        }
        if args.global_palette {
            self.volume.palette = PaletteKind::Global;
        }
        if let Some(seed) = args.seed {
            self.volume.seed = seed;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

/// Parses `x,y,z` into three integers, rejecting any other count.
fn parse_triple(value: &str) -> Result<[i32; 3], String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<i32>().map_err(|e| format!("{part:?}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    let count = parts.len();
    parts
        .try_into()
        .map_err(|_| format!("expected 3 comma-separated integers, got {count}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overrides() -> CliArgs {
        CliArgs {
            size: None,
            origin: None,
            global_palette: false,
            seed: None,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            size: Some([32, 8, 32]),
            global_palette: true,
            log_level: Some("trace".to_string()),
            ..no_overrides()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.volume.size, [32, 8, 32]);
        assert_eq!(config.volume.palette, PaletteKind::Global);
        assert_eq!(config.debug.log_level, "trace");
        // Non-overridden fields retain defaults
        assert_eq!(config.volume.origin, [0, 0, 0]);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&no_overrides());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = CliArgs::parse_from([
            "blockvol",
            "--size",
            "4,5,6",
            "--origin",
            "-10,0,3",
            "--seed",
            "99",
        ]);
        let mut config = Config::default();
        config.apply_cli_overrides(&args);
        assert_eq!(config.volume.size, [4, 5, 6]);
        assert_eq!(config.volume.origin, [-10, 0, 3]);
        assert_eq!(config.volume.seed, 99);
    }

    #[test]
    fn test_wrong_component_count_is_rejected() {
        for bad in [["blockvol", "--size", "4,5"], ["blockvol", "--origin", "1,2,3,4"]] {
            assert!(CliArgs::try_parse_from(bad).is_err(), "{bad:?}");
        }
        assert!(CliArgs::try_parse_from(["blockvol", "--size", "4,x,6"]).is_err());
    }

    #[test]
    fn test_parse_triple() {
        assert_eq!(parse_triple("1, -2,3"), Ok([1, -2, 3]));
        assert!(parse_triple("").is_err());
        assert!(parse_triple("1,2").is_err());
    }
}
