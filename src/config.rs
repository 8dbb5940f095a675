use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use serde_yaml;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "wordfeed")]
#[command(about = "Forwards words from typing-practice pages to a local collector", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
    /// Keep cursors in memory instead of the database.
    #[arg(long)]
    pub ephemeral: bool,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wordfeed")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Clone)]
pub struct App {
    #[serde(default = "default_database")]
    database: String,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_database() -> String {
    "wordfeed.db".to_string()
}

fn default_tick_interval() -> u64 {
    2000
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for App {
    fn default() -> Self {
        App {
            database: default_database(),
            tick_interval_ms: default_tick_interval(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Collector {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_status_path")]
    pub status_path: String,
    #[serde(default = "default_words_path")]
    pub words_path: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_status_path() -> String {
    "/parsing_status".to_string()
}

fn default_words_path() -> String {
    "/words".to_string()
}

impl Default for Collector {
    fn default() -> Self {
        Collector {
            base_url: default_base_url(),
            status_path: default_status_path(),
            words_path: default_words_path(),
        }
    }
}

impl Collector {
    pub fn status_url(&self) -> String {
        join_url(&self.base_url, &self.status_path)
    }

    pub fn words_url(&self) -> String {
        join_url(&self.base_url, &self.words_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Where the page comes from each tick. With `snapshot_path` the file is re-read and
/// `url` only names the page; without it `url` is fetched.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Page {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub snapshot_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SiteEntry {
    pub pattern: String,
    pub schema: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub collector: Collector,
    #[serde(default)]
    pub page: Page,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        let yaml_with_env = Config::substitute_env_vars(yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        Config::from_yaml(&yaml_str)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}
