use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::data::filter::NullCasualtyPolicy;
use crate::data::loader::LoadOptions;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "nautilus.toml";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Parser)]
#[command(name = "nautilus", version, about = "Interactive maritime incident dashboard")]
pub struct Cli {
    /// Incident table to open on start-up (.csv, .tsv, .json or .parquet)
    pub data: Option<PathBuf>,

    /// Configuration file (defaults to ./nautilus.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Field delimiter for delimited text files
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Drop rows without a casualty count from every casualty range
    #[arg(long)]
    pub exclude_null_casualties: bool,
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("delimiter '{0}' is not a single-byte ASCII character")]
    InvalidDelimiter(char),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub data: DataConfig,
    pub filters: FilterConfig,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Table opened on start-up.
    pub path: Option<PathBuf>,
    pub delimiter: Option<char>,
    /// Extra `strftime` date patterns, tried after the built-in ones.
    pub date_formats: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    pub null_casualties: NullCasualtyPolicy,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            width: 1280.0,
            height: 860.0,
        }
    }
}

impl AppConfig {
    /// Read `path`, or `./nautilus.toml` if it exists, or fall back to
    /// defaults. An explicitly given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Command-line values win over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.data {
            self.data.path = Some(path.clone());
        }
        if let Some(delimiter) = cli.delimiter {
            self.data.delimiter = Some(delimiter);
        }
        if cli.exclude_null_casualties {
            self.filters.null_casualties = NullCasualtyPolicy::Exclude;
        }
    }

    pub fn load_options(&self) -> Result<LoadOptions, ConfigError> {
        let delimiter = self
            .data
            .delimiter
            .map(|c| {
                u8::try_from(c)
                    .ok()
                    .filter(u8::is_ascii)
                    .ok_or(ConfigError::InvalidDelimiter(c))
            })
            .transpose()?;
        Ok(LoadOptions {
            delimiter,
            date_formats: self.data.date_formats.clone(),
        })
    }
}
