//! Config for camenum binary
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use crate::colour;
use crate::error::{Error, ErrorKind, Result};

const CONF_DIR: &str = "camenum";
const CONF_NAME: &str = "camenum.json";

/// Allows user supplied settings and colours, merged with CLI args
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields, default)]
pub struct Config {
    /// User supplied [`colour::ColourTheme`] - overrides default
    pub colours: colour::ColourTheme,
    /// Disable coloured output
    pub no_colour: bool,
    /// Do not wait for Enter before exiting
    pub no_pause: bool,
    /// Print serial numbers with devices
    pub verbose: bool,
}

impl Config {
    /// Default new
    pub fn new() -> Config {
        Config {
            ..Default::default()
        }
    }

    /// Attempt to read from .json format config at `file_path`
    pub fn from_file(file_path: &str) -> Result<Config> {
        let f = File::open(file_path)?;
        let mut br = BufReader::new(f);
        let mut data = String::new();

        br.read_to_string(&mut data)?;
        serde_json::from_str::<Config>(&data).map_err(|e| {
            Error::new(
                ErrorKind::Config,
                &format!("Failed to parse config {}: {}", file_path, e),
            )
        })
    }

    /// Path of the default config: `<config_dir>/camenum/camenum.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONF_DIR).join(CONF_NAME))
    }

    /// Config from the default path if it exists, otherwise [`Config::new`]
    pub fn sys() -> Result<Config> {
        match Config::default_path() {
            Some(p) if p.exists() => {
                log::info!("Using config at {}", p.display());
                Config::from_file(&p.to_string_lossy())
            }
            _ => {
                log::debug!("No system config found, using defaults");
                Ok(Config::new())
            }
        }
    }
}
