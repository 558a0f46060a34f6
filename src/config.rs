use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "ZABBIX_REPORT_CONFIG";
pub const URL_ENV: &str = "ZABBIX_URL";
pub const USER_ENV: &str = "ZABBIX_USER";
pub const PASSWORD_ENV: &str = "ZABBIX_PASSWORD";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Full endpoint, e.g. `http://zabbix.example/api_jsonrpc.php`.
    pub url: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout; transport default when unset.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Hosts processed concurrently while assembling a report.
    pub jobs: usize,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    api: RawApi,
    #[serde(default)]
    report: RawReport,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawApi {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReport {
    jobs: Option<usize>,
    output_dir: Option<PathBuf>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zabbix-report").join("config.toml"))
}

/// Explicit path first, then `ZABBIX_REPORT_CONFIG`, then the per-user
/// default. Only the default is allowed to be missing.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if let Some(stripped) = env_path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return Some(home.join(stripped));
            }
        }
        return Some(PathBuf::from(env_path));
    }
    default_config_path().filter(|path| path.exists())
}

impl AppConfig {
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let contents = match resolve_config_path(explicit) {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {}", path.display()))?,
            None => String::new(),
        };
        Self::from_parts(&contents, |name| std::env::var(name).ok())
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        Self::from_parts(s, |_| None)
    }

    /// TOML first, then environment overrides, then validation.
    pub fn from_parts<F>(toml_text: &str, env: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = toml::from_str(toml_text).context("parsing config")?;
        let config = AppConfig {
            api: ApiConfig {
                url: env(URL_ENV).or(raw.api.url).unwrap_or_default(),
                username: env(USER_ENV).or(raw.api.username).unwrap_or_default(),
                password: env(PASSWORD_ENV).or(raw.api.password).unwrap_or_default(),
                timeout_secs: raw.api.timeout_secs,
            },
            report: ReportConfig {
                jobs: raw.report.jobs.unwrap_or(1),
                output_dir: raw.report.output_dir,
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.api.url.trim().is_empty(),
            "api.url must be set (config file or {URL_ENV})"
        );
        anyhow::ensure!(
            self.api.url.starts_with("http://") || self.api.url.starts_with("https://"),
            "api.url must be an http(s) URL, got {}",
            self.api.url
        );
        anyhow::ensure!(
            !self.api.username.is_empty(),
            "api.username must be set (config file or {USER_ENV})"
        );
        anyhow::ensure!(
            self.api.timeout_secs != Some(0),
            "api.timeout_secs must be > 0 when set"
        );
        anyhow::ensure!(
            self.report.jobs > 0,
            "report.jobs must be > 0, got {}",
            self.report.jobs
        );
        Ok(())
    }
}
