use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

/// Canned questions offered by the preset picker.
const DEFAULT_PRESETS: &[&str] = &[
    "What can you help me with?",
    "Summarize our conversation so far.",
    "Explain Lightning Network payments in simple terms.",
    "Write a small Python example that calls a JSON API.",
];

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub backend_url: Option<String>,
    pub presets: Option<Vec<String>>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            backend_url: None,
            presets: None,
        }
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Write the current values out if no config file exists yet, so there
    /// is something on disk to edit.
    pub fn save_if_missing(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        if config_path.exists() {
            return Ok(());
        }
        self.save_to(&config_path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Backend base URL, in precedence order: CLI flag / env var (already
    /// folded together by clap), config file, built-in default.
    pub fn resolve_backend_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.backend_url.clone())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    pub fn presets(&self) -> Vec<String> {
        match &self.presets {
            Some(presets) if !presets.is_empty() => presets.clone(),
            _ => DEFAULT_PRESETS.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("satchat").join("config.json"))
    }
}
