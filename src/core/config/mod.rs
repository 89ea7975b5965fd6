pub mod json;

use crate::core::config::json::{JsonConfig, read_json_config};
use crate::errors::MyError;
use dotenv::dotenv;
use std::time::Duration;
use teloxide::prelude::*;

pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 15 * 60;

#[derive(Clone)]
pub struct Config {
    bot: Bot,
    admin_password: String,
    superadmin_password: String,
    admin_group_id: ChatId,
    publish_timeout: Duration,
    openai_api_key: Option<String>,
    json_config: JsonConfig,
}

impl Config {
    /// Loads `.env`, the process environment and the optional `config.json`.
    pub fn from_env() -> Result<Self, MyError> {
        dotenv().ok();
        let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());
        let json_config = read_json_config(config_path)?;
        Self::from_lookup(|key| std::env::var(key).ok(), json_config)
    }

    pub fn from_lookup<F>(lookup: F, json_config: JsonConfig) -> Result<Self, MyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| MyError::Config(format!("{} expected", key)))
        };

        let bot_token = required("BOT_TOKEN")?;
        let admin_password = required("ADMIN_PASSWORD")?;
        let superadmin_password = required("SUPERADMIN_PASSWORD")?;
        let admin_group_id = required("ADMIN_GROUP_ID")?
            .trim()
            .parse::<i64>()
            .map_err(|e| MyError::Config(format!("ADMIN_GROUP_ID is not a chat id: {}", e)))?;

        let publish_timeout = match lookup("PUBLISH_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| MyError::Config(format!("PUBLISH_TIMEOUT_SECS: {}", e)))?,
            None => DEFAULT_PUBLISH_TIMEOUT_SECS,
        };
        if publish_timeout == 0 {
            return Err(MyError::Config(
                "PUBLISH_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());

        Ok(Config {
            bot: Bot::new(bot_token),
            admin_password,
            superadmin_password,
            admin_group_id: ChatId(admin_group_id),
            publish_timeout: Duration::from_secs(publish_timeout),
            openai_api_key,
            json_config,
        })
    }

    pub fn get_bot(&self) -> &Bot {
        &self.bot
    }

    pub fn get_admin_password(&self) -> &str {
        &self.admin_password
    }

    pub fn get_superadmin_password(&self) -> &str {
        &self.superadmin_password
    }

    pub fn get_admin_group_id(&self) -> ChatId {
        self.admin_group_id
    }

    pub fn get_publish_timeout(&self) -> Duration {
        self.publish_timeout
    }

    pub fn get_openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    pub fn get_json_config(&self) -> &JsonConfig {
        &self.json_config
    }
}
