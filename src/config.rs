//! Application configuration.
//!
//! Loaded from `config.json` in the data directory, falling back to
//! defaults (and writing them on first run). The Ollama base URL can be
//! overridden with the `OLLAMA_URL` environment variable after load.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub ollama_url: String,
    pub dialogue_model: String,
    pub vision_model: String,
    pub whisper_size: String,
    /// How many stars end a session with a celebration.
    pub stars_target: u32,
    pub sessions_dir: PathBuf,
    pub themes_dir: PathBuf,
    pub capture_wav_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = default_data_dir();
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            dialogue_model: "llama3.2:3b-instruct".to_string(),
            vision_model: "llava:7b".to_string(),
            whisper_size: "small".to_string(),
            stars_target: 5,
            sessions_dir: data.join("sessions"),
            themes_dir: data.join("themes"),
            capture_wav_path: crate::capture::audio::default_capture_path(),
        }
    }
}

impl AppConfig {
    pub fn load(app_data: &Path) -> Self {
        let config_path = app_data.join("config.json");
        let mut config = if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
                Err(_) => Self::default(),
            }
        } else {
            let c = Self::default();
            c.save(app_data);
            c
        };

        if let Ok(url) = std::env::var("OLLAMA_URL") {
            if !url.is_empty() {
                config.ollama_url = url;
            }
        }

        config
    }

    pub fn save(&self, app_data: &Path) {
        let config_path = app_data.join("config.json");
        if let Ok(content) = serde_json::to_string_pretty(self) {
            std::fs::write(config_path, content).ok();
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("lumo")
}
