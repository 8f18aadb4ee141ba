//! Builds the reserve requirement constraints of a unit commitment optimisation model.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod build;
pub mod cli;
pub mod component;
pub mod export;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod settings;

#[cfg(test)]
mod fixture;

/// Name of the program's folder inside the user's config directory
const CONFIG_DIR_NAME: &str = "uc-reserve";

/// Get the directory where program-wide configuration files (e.g. `settings.toml`) are stored
pub fn get_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push(CONFIG_DIR_NAME);

    path
}
