use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// How create treats a generated id that is already taken.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Second-resolution ids; a same-second create overwrites the earlier record.
    #[default]
    Overwrite,
    /// Refuse the create with a conflict instead of overwriting.
    RejectDuplicate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub id_policy: IdPolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_store_path(), id_policy: IdPolicy::default() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_store_path() -> PathBuf {
    PathBuf::from("data/todos.redb")
}

fn default_log_format() -> String {
    "compact".into()
}

/// Load `CONFIG_PATH` (or `config.toml`). A missing file means defaults;
/// a file that exists but does not parse is an error.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file if present, otherwise defaults; env overrides applied on top.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply `SERVER_HOST`, `SERVER_PORT` and `TODO_DB_PATH` overrides.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(path) = lookup("TODO_DB_PATH") {
            self.storage.path = PathBuf::from(path);
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(anyhow!("storage.path is empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.storage.path, PathBuf::from("data/todos.redb"));
        assert_eq!(cfg.storage.id_policy, IdPolicy::Overwrite);
        assert_eq!(cfg.logging.format, "compact");
    }

    #[test]
    fn parses_all_sections() {
        let cfg = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000
            worker_threads = 2

            [storage]
            path = "/tmp/t.redb"
            id_policy = "reject_duplicate"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:9000");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.storage.id_policy, IdPolicy::RejectDuplicate);
        assert_eq!(cfg.logging.format, "json");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| match k {
            "SERVER_PORT" => Some("7070".into()),
            "TODO_DB_PATH" => Some("other.redb".into()),
            _ => None,
        });
        assert_eq!(cfg.server.port, 7070);
        assert_eq!(cfg.storage.path, PathBuf::from("other.redb"));
        assert_eq!(cfg.server.host, "0.0.0.0");
    }

    #[test]
    fn unparsable_port_override_is_ignored() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| (k == "SERVER_PORT").then(|| "http".to_string()));
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn validation_rejects_port_zero_and_empty_path() {
        let mut cfg = parse("[server]\nport = 0\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = parse("[storage]\npath = \"\"\n").unwrap();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn blank_host_and_zero_threads_are_normalized() {
        let mut cfg = parse("[server]\nhost = \" \"\nport = 1\nworker_threads = 0\n").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.worker_threads, None);
    }
}
