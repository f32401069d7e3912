use anyhow::Context;
use dotenvy::dotenv;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// When unset the service runs on the in-memory record store.
    pub database_url: Option<String>,
    pub run_migrations: bool,

    // Rate limiting, 0 disables the limiter
    pub rate_api_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_string()),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            run_migrations: env::var("RUN_MIGRATIONS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .context("RUN_MIGRATIONS must be true or false")?,

            rate_api_per_min: env::var("RATE_API_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .context("RATE_API_PER_MIN must be a non-negative integer")?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }
}

#[cfg(test)]
impl Config {
    /// In-memory, unthrottled configuration for handler tests.
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            run_migrations: false,
            rate_api_per_min: 0,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}
