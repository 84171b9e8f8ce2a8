use crate::geometry::LengthUnit;
use crate::summary::DEFAULT_PADDING;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub geometry: GeometryConfig,
}

/// Which set of routes the process mounts.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// `/calculate` returns every artifact at once
    #[default]
    Combined,
    /// `/concave-hull` and `/optimal-point`
    Split,
}

impl ServiceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceMode::Combined => "combined",
            ServiceMode::Split => "split",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mode: ServiceMode,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            mode: ServiceMode::Combined,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeometryConfig {
    /// Degrees added around the point extent.
    pub padding: f64,
    /// Longest triangle edge kept in the concave hull, in `units`.
    pub max_edge: f64,
    pub units: LengthUnit,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            max_edge: 1.5,
            units: LengthUnit::Kilometers,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        if !g.padding.is_finite() || g.padding < 0.0 {
            bail!("geometry.padding must be a non-negative number, got {}", g.padding);
        }
        if !g.max_edge.is_finite() || g.max_edge <= 0.0 {
            bail!("geometry.max_edge must be a positive number, got {}", g.max_edge);
        }
        Ok(())
    }
}
