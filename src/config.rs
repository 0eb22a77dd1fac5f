//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/bomtree/bomtree.toml`
//! 3. Explicit config file (`--config`)
//! 4. Environment variables: `BOMTREE_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};

/// How trees are printed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    /// One line per node, indented by level
    #[default]
    Outline,
    /// Box-drawing tree
    Tree,
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStyle::Outline => write!(f, "outline"),
            RenderStyle::Tree => write!(f, "tree"),
        }
    }
}

/// Printer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Label printed for nodes without an item
    pub empty_label: String,
    /// Marker repeated once per level in outline output
    pub indent: String,
    /// Output style
    pub style: RenderStyle,
    /// Print the link report around teardown
    pub show_links: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            empty_label: "err_empty".into(),
            indent: "- ".into(),
            style: RenderStyle::Outline,
            show_links: true,
        }
    }
}

/// Get the XDG config directory for bomtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "bomtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("bomtree.toml"))
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// A missing global config is skipped; a missing explicit `config_file`
    /// is an error.
    #[instrument(level = "debug")]
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        let global = global_config_path().filter(|p| p.exists());
        Self::load_from(global.as_deref(), config_file)
    }

    /// Load settings from explicit file layers, skipping the XDG lookup.
    pub fn load_from(global: Option<&Path>, config_file: Option<&Path>) -> ApplicationResult<Self> {
        let defaults = Settings::default();
        let mut builder = Config::builder()
            .set_default("empty_label", defaults.empty_label)
            .map_err(config_err)?
            .set_default("indent", defaults.indent)
            .map_err(config_err)?
            .set_default("style", defaults.style.to_string())
            .map_err(config_err)?
            .set_default("show_links", defaults.show_links)
            .map_err(config_err)?;

        if let Some(path) = global {
            debug!(path = %path.display(), "global config");
            builder = builder.add_source(File::from(path).required(false));
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                });
            }
            debug!(path = %path.display(), "config file");
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("BOMTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Effective settings as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }
}
