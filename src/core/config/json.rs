use crate::core::services::broadcast::DEFAULT_FAN_OUT;
use crate::errors::MyError;
use serde::Deserialize;
use std::path::Path;

/// Tunables that live in `config.json`. Every field is optional.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct JsonConfig {
    pub footer: String,
    pub whisper_model: String,
    pub whisper_language: String,
    pub whisper_base_url: String,
    pub broadcast_fan_out: usize,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            footer: "Manage your subscriptions with /home".to_string(),
            whisper_model: "whisper-1".to_string(),
            whisper_language: "ru".to_string(),
            whisper_base_url: "https://api.openai.com/v1".to_string(),
            broadcast_fan_out: DEFAULT_FAN_OUT,
        }
    }
}

impl JsonConfig {
    pub fn get_footer(&self) -> &str {
        &self.footer
    }

    pub fn get_whisper_model(&self) -> &str {
        &self.whisper_model
    }

    pub fn get_whisper_language(&self) -> &str {
        &self.whisper_language
    }

    pub fn get_whisper_base_url(&self) -> &str {
        self.whisper_base_url.trim_end_matches('/')
    }

    pub fn get_broadcast_fan_out(&self) -> usize {
        self.broadcast_fan_out
    }
}

/// Reads `path`, falling back to defaults when the file does not exist.
pub fn read_json_config<P: AsRef<Path>>(path: P) -> Result<JsonConfig, MyError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(JsonConfig::default());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
