use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use strum_macros::Display;

use crate::config::{get_config_dir, get_data_dir};

fn get_current_dir() -> Option<PathBuf> {
    std::env::current_dir().ok()
}

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Path to a package directory containing a metadata manifest
    #[arg(default_value=get_current_dir().unwrap_or_default().into_os_string())]
    pub package_dir: PathBuf,

    /// Output format for the loaded manifest
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Load and validate the manifest without printing it
    #[arg(long)]
    pub check: bool,

    /// Manifest file name to look for inside the package directory
    #[arg(short, long, value_name = "FILE")]
    pub manifest_file: Option<String>,
}

#[derive(Debug, Default, Display, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const VERSION_MESSAGE: &str = env!("CARGO_PKG_VERSION");

pub fn version() -> String {
    let author = clap::crate_authors!();

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{VERSION_MESSAGE}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}
