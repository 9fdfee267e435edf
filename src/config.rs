use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

/// Fallback session-signing secret for local development. A deployment that
/// actually trusts its tokens must set SESSION_SECRET.
pub const DEV_SESSION_SECRET: &str = "devsecret";

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub telegram_bot_token: String,
    pub session_secret: String,
    pub webhook_secret: String,
    pub frontend_origins: Vec<String>,
    pub webapp_url: String,
    pub app_url: Option<String>,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            database_url: get_env("DATABASE_URL")?,
            // The bot token is the root of trust for WebApp auth; refusing to
            // start without it is deliberate.
            telegram_bot_token: get_env("TELEGRAM_BOT_TOKEN")?,
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| DEV_SESSION_SECRET.to_string()),
            webhook_secret: env::var("WEBHOOK_SECRET").unwrap_or_else(|_| "hook".to_string()),
            frontend_origins,
            webapp_url: get_env("WEBAPP_URL")?,
            app_url: env::var("APP_URL").ok(),
        })
    }

    pub fn session_secret_is_dev_default(&self) -> bool {
        self.session_secret == DEV_SESSION_SECRET
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
