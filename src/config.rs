//! Configuration resolution
//!
//! Settings resolve with CLI → environment → TOML file → compiled default
//! priority. The TOML file lives at `~/.config/mintytag/config.toml` unless
//! overridden with `--config`.

use crate::error::{Error, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default listen port
pub const DEFAULT_PORT: u16 = 5740;

/// Command-line arguments
#[derive(Debug, Parser)]
#[command(name = "mintytag", about = "Self-hosted audio tag editor", version)]
pub struct Args {
    /// Path to TOML config file
    #[arg(long, env = "MINTYTAG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listen port for the web UI
    #[arg(long, env = "MINTYTAG_PORT")]
    pub port: Option<u16>,

    /// Folder offered by the UI for folder scans
    #[arg(long, env = "MINTYTAG_MUSIC_FOLDER")]
    pub music_folder: Option<PathBuf>,

    /// Preferred destination for retagged files (download fallback when unset)
    #[arg(long, env = "MINTYTAG_OUTPUT_FOLDER")]
    pub output_folder: Option<PathBuf>,
}

/// Settings as they appear in the TOML config file. All keys optional.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    port: Option<u16>,
    music_folder: Option<PathBuf>,
    output_folder: Option<PathBuf>,
}

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub music_folder: Option<PathBuf>,
    pub output_folder: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from CLI args, environment, and TOML file.
    ///
    /// A missing config file is not an error (all settings have defaults);
    /// a present but malformed file is.
    pub fn resolve(args: &Args) -> Result<Self> {
        let file = match config_file_path(args) {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(&path)?;
                let parsed: TomlConfig = toml::from_str(&text)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
                info!("Loaded config from {}", path.display());
                parsed
            }
            Some(path) => {
                if args.config.is_some() {
                    // An explicitly named file that does not exist is a mistake
                    // worth surfacing; the default location is allowed to be absent.
                    warn!("Config file {} not found, using defaults", path.display());
                }
                TomlConfig::default()
            }
            None => TomlConfig::default(),
        };

        // clap has already folded the env tier into `args`
        let port = args.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let music_folder = args.music_folder.clone().or(file.music_folder);
        let output_folder = args.output_folder.clone().or(file.output_folder);

        if let Some(folder) = &output_folder {
            if !folder.is_dir() {
                warn!(
                    "Output folder {} does not exist; saves will fall back to downloads",
                    folder.display()
                );
            }
        }

        Ok(Config {
            port,
            music_folder,
            output_folder,
        })
    }
}

/// Config file location: `--config` wins, otherwise the platform config dir
fn config_file_path(args: &Args) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }
    dirs::config_dir().map(|d| d.join("mintytag").join("config.toml"))
}
