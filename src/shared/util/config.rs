//! Loads config from config.toml

use serde_derive::Deserialize;
use cached::proc_macro::cached;
use std::env;
use std::fs;
use std::process::exit;
use toml;
use sqlx::postgres::{PgPoolOptions, PgPool};

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_VAR: &str = "DIAGNOSEE_CONFIG";

#[derive(Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub database: Option<DatabaseConfig>
}

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub log: bool,
    #[serde(default = "default_replenish_ms")]
    pub request_quota_replenish_ms: u64,
    #[serde(default = "default_quota")]
    pub request_quota: u32
}

#[derive(Deserialize, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Postgres
}

#[derive(Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    /// Unset means records are never removed
    pub retention_seconds: Option<u64>,
    #[serde(default = "default_purge_interval")]
    pub purge_interval_seconds: u64
}

/// Largest window chrono can represent; longer settings are cut down to it
pub const MAX_RETENTION_SECONDS: u64 = (i64::MAX / 1000) as u64;

impl StorageConfig {
    /// How long jobs are kept, if an operator set a limit
    pub fn retention(&self) -> Option<chrono::Duration> {
        let seconds = self.retention_seconds?.min(MAX_RETENTION_SECONDS);
        Some(chrono::Duration::seconds(seconds as i64))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: default_backend(),
            retention_seconds: None,
            purge_interval_seconds: default_purge_interval()
        }
    }
}

#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
    pub ip: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_replenish_ms() -> u64 { 600 } // ~100 requests per minute
fn default_quota() -> u32 { 20 }
fn default_backend() -> StorageBackend { StorageBackend::Memory }
fn default_purge_interval() -> u64 { 300 }
fn default_max_connections() -> u32 { 5 }

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!("postgres://{}:{}@{}:{}/{}", // user:password / ip/db
            self.user,
            self.password,
            self.ip,
            self.port,
            self.name
        )
    }
}

pub async fn connect_pool(database: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(database.max_connections)
        .connect(database.url().as_str())
        .await
}

pub fn parse_config(contents: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(contents)
}

#[cached]
pub fn get_config() -> Config {
    let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| "config.toml".to_string());
    let contents = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => {
            eprintln!("Could not find {}, please create or ensure it's accessible", path);
            exit(1);
        }
    };

    match parse_config(&contents) {
        Ok(d) => d,
        Err(err) => {
            eprintln!("Unable to load data from config: {}", err);
            exit(1);
        }
    }
}
