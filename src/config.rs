use std::sync::LazyLock;
use std::{env, path::PathBuf};

use config::{Config, ConfigError, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

pub static PROJECT_NAME: LazyLock<String> =
    LazyLock::new(|| env!("CARGO_CRATE_NAME").to_uppercase().to_string());
static DATA_FOLDER: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    env::var(format!("{}_DATA", &*PROJECT_NAME))
        .ok()
        .map(PathBuf::from)
});
static CONFIG_FOLDER: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    env::var(format!("{}_CONFIG", &*PROJECT_NAME))
        .ok()
        .map(PathBuf::from)
});

pub const DEFAULT_MANIFEST_FILE: &str = "metadata.rb";

#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
    /// File name of the manifest looked for inside a package directory.
    pub manifest_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = get_config_dir();
        let mut builder =
            Config::builder().set_default("manifest_file", DEFAULT_MANIFEST_FILE)?;

        const CONFIG_FILES: [(&str, FileFormat); 4] = [
            ("config.json5", FileFormat::Json5),
            ("config.json", FileFormat::Json),
            ("config.yaml", FileFormat::Yaml),
            ("config.toml", FileFormat::Toml),
        ];

        for (file, format) in CONFIG_FILES.iter() {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(*format)
                    .required(false),
            );
        }

        builder.build()?.try_deserialize()
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(data_folder) = DATA_FOLDER.clone() {
        data_folder
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(config_folder) = CONFIG_FOLDER.clone() {
        config_folder
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "promet", env!("CARGO_PKG_NAME"))
}
