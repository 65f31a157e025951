use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{bail, Result};
use basket_model::CsvOptions;
use log::LevelFilter;

pub const ENV_DATA_PATH: &str = "BASKET_DATA_PATH";
pub const ENV_LOG: &str = "BASKET_LOG";
pub const DEFAULT_DATA_PATH: &str = "data/detailed-data.csv";

#[derive(Clone, Debug)]
pub struct Config {
    pub data_path: PathBuf,
    pub csv: CsvOptions,
}

impl Config {
    /// Command-line flags win over the environment, which wins over the defaults.
    pub fn resolve(data: Option<PathBuf>, delimiter: char) -> Result<Self> {
        Ok(Self {
            data_path: resolve_data_path(data, std::env::var_os(ENV_DATA_PATH)),
            csv: CsvOptions {
                delimiter: delimiter_byte(delimiter)?,
            },
        })
    }
}

fn resolve_data_path(flag: Option<PathBuf>, env: Option<OsString>) -> PathBuf {
    flag.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got {delimiter:?}");
    }
    Ok(delimiter as u8)
}

/// Log to stderr so stdout carries only JSON. Filters come from `BASKET_LOG`, then `RUST_LOG`.
pub fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(LevelFilter::Info);
    if let Ok(filters) = std::env::var(ENV_LOG).or_else(|_| std::env::var("RUST_LOG")) {
        builder.parse_filters(&filters);
    }
    builder.target(env_logger::Target::Stderr);
    // A logger may already be installed when embedded in tests.
    let _ = builder.try_init();
}
