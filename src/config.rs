//! Application configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [server]
//! addr = "0.0.0.0:3000"
//!
//! [routing]
//! root = "/api"
//! append_leading_slash = true
//! append_trailing_slash = false
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub routing: RoutingConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// `host:port` to listen on.
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: "0.0.0.0:3000".to_owned() }
    }
}

/// Root path and slash policies for the top-level [`Router`](crate::Router).
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub root: String,
    pub append_leading_slash: bool,
    pub append_trailing_slash: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            root: String::new(),
            append_leading_slash: true,
            append_trailing_slash: false,
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let source = fs::read_to_string(path)?;
        Self::from_toml(&source)
    }
}
