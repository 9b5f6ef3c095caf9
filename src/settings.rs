use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_CENTER, DEFAULT_ZOOM_LEVEL, TILE_URL};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding `data.json` and the `images/` folder
    pub data_dir: PathBuf,
    pub default_zoom: f64,
    pub center_lat: f64,
    pub center_lon: f64,
    #[serde(default)]
    pub clamp_opacity: bool,
    #[serde(default)]
    pub probe_images: bool,
    pub tile_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            default_zoom: DEFAULT_ZOOM_LEVEL,
            center_lat: DEFAULT_CENTER.0,
            center_lon: DEFAULT_CENTER.1,
            clamp_opacity: true,
            probe_images: false,
            tile_url: TILE_URL.to_string(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut settings = Settings::default();
        if !config_path.exists() {
            tracing::debug!("No settings file at {}, using defaults", config_path.display());
            return Ok(settings);
        }

        let file = File::open(config_path)
            .with_context(|| format!("Failed to open config file {}", config_path.display()))?;
        let reader = BufReader::new(file);
        let mut config_map = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from config")?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().to_string());
            }
        }

        if let Some(data_dir) = config_map.get("data_dir") {
            settings.data_dir = PathBuf::from(data_dir.trim_matches('"'));
        }
        if let Some(zoom) = config_map.get("default_zoom").and_then(|v| v.parse::<f64>().ok()) {
            if zoom.is_finite() {
                settings.default_zoom = zoom;
            }
        }
        if let Some(lat) = config_map.get("center_lat").and_then(|v| v.parse::<f64>().ok()) {
            settings.center_lat = lat;
        }
        if let Some(lon) = config_map.get("center_lon").and_then(|v| v.parse::<f64>().ok()) {
            settings.center_lon = lon;
        }
        if let Some(clamp) = config_map.get("clamp_opacity").and_then(|v| v.parse::<bool>().ok()) {
            settings.clamp_opacity = clamp;
        }
        if let Some(probe) = config_map.get("probe_images").and_then(|v| v.parse::<bool>().ok()) {
            settings.probe_images = probe;
        }
        if let Some(tile_url) = config_map.get("tile_url") {
            settings.tile_url = tile_url.trim_matches('"').to_string();
        }

        Ok(settings)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Creating config directory")?;
            }
        }

        let mut content = String::new();
        content.push_str("# DripMap Configuration File\n");
        content.push_str(&format!("data_dir = \"{}\"\n", self.data_dir.display()));
        content.push_str(&format!("default_zoom = {}\n", self.default_zoom));
        content.push_str(&format!("center_lat = {}\n", self.center_lat));
        content.push_str(&format!("center_lon = {}\n", self.center_lon));
        content.push_str(&format!("clamp_opacity = {}\n", self.clamp_opacity));
        content.push_str(&format!("probe_images = {}\n", self.probe_images));
        content.push_str(&format!("tile_url = \"{}\"\n", self.tile_url));

        std::fs::write(config_path, content).context("Failed to write to config file")?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push("dripmap.ini");
        path
    }
}
