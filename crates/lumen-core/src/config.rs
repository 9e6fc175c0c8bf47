// SPDX-License-Identifier: CEPL-1.0
//! Application configuration read from `lumen.toml`.
//!
//! Every key is optional. A missing file yields [`AppConfig::default`]; a file that exists
//! but does not parse is reported, never silently replaced by defaults.

use serde::Deserialize;
use std::{fs, io, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("could not parse config file {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub window: WindowSection,
    pub bootstrap: BootstrapSection,
    pub shaders: ShaderSection,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowSection {
    fn default() -> Self {
        WindowSection {
            title: "Vulkan demo".to_owned(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BootstrapSection {
    pub app_name: String,
    /// `None` leaves the decision to the build profile.
    pub diagnostics: Option<bool>,
    pub layers: Vec<String>,
    pub device_extensions: Vec<String>,
}

impl Default for BootstrapSection {
    fn default() -> Self {
        BootstrapSection {
            app_name: "Hello Triangle".to_owned(),
            diagnostics: None,
            layers: vec!["VK_LAYER_KHRONOS_validation".to_owned()],
            device_extensions: vec!["VK_KHR_swapchain".to_owned()],
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShaderSection {
    pub dir: String,
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderSection {
    fn default() -> Self {
        ShaderSection {
            dir: "shaders".to_owned(),
            vertex: "vert.spv".to_owned(),
            fragment: "frag.spv".to_owned(),
        }
    }
}

impl AppConfig {
    pub fn parse(src: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(src).map_err(|source| ConfigError::Parse {
            path: origin.to_owned(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let shown = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(s) => {
                let cfg = Self::parse(&s, &shown)?;
                tracing::debug!("loaded config from {shown}");
                Ok(cfg)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no config at {shown}, using defaults");
                Ok(AppConfig::default())
            }
            Err(source) => Err(ConfigError::Read { path: shown, source }),
        }
    }
}
