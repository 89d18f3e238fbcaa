use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use derive_more::From;
use serde::Deserialize;
use thiserror::Error;

use katnip_api::client::api::{DEFAULT_BLOCKS_LIMIT, MAX_BLOCKS_LIMIT};
use katnip_api::client::types::{InvalidUrl, Url};

use crate::poller::PollerConf;

/// Environment variable overriding the configured API base URL.
pub const API_URL_ENV: &str = "KATNIP_API_URI";
pub const DEFAULT_API_URL: &str = "http://localhost:8080/";

#[derive(Error, From, Debug)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(std::io::Error),
    #[error("invalid configuration file: {0}")]
    Yaml(serde_yaml::Error),
    #[error("invalid api url: {0}")]
    Url(InvalidUrl),
    #[error("invalid configuration: {0}")]
    Setting(InvalidSetting),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSetting {
    #[error("poll_interval_millis must be positive")]
    ZeroPollInterval,
    #[error("recent_blocks_limit must be within 1..={max}, got {0}", max = MAX_BLOCKS_LIMIT)]
    RecentBlocksLimit(u16),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    api_url: Option<Url>,
    pub http_client_timeout_duration_secs: u64,
    pub poll_interval_millis: u64,
    pub recent_blocks_limit: u16,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            http_client_timeout_duration_secs: 5,
            poll_interval_millis: 1000,
            recent_blocks_limit: DEFAULT_BLOCKS_LIMIT,
        }
    }
}

impl ExplorerConfig {
    /// Read the YAML file at `path`, or start from defaults when there is none,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let conf = match path {
            Some(path) => Self::from_yaml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        conf.with_overrides(|var| std::env::var(var).ok())
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let conf: Self = serde_yaml::from_str(raw)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<(), InvalidSetting> {
        if self.poll_interval_millis == 0 {
            return Err(InvalidSetting::ZeroPollInterval);
        }
        if !(1..=MAX_BLOCKS_LIMIT).contains(&self.recent_blocks_limit) {
            return Err(InvalidSetting::RecentBlocksLimit(self.recent_blocks_limit));
        }
        Ok(())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = Some(Url::from_str(raw.trim())?);
        }
        Ok(self)
    }

    pub fn api_url(&self) -> Result<Url, ConfigError> {
        match &self.api_url {
            Some(url) => Ok(url.clone()),
            None => Ok(Url::from_str(DEFAULT_API_URL)?),
        }
    }

    pub fn http_client_timeout(&self) -> Duration {
        Duration::from_secs(self.http_client_timeout_duration_secs)
    }

    pub fn poller_conf(&self) -> PollerConf {
        PollerConf {
            interval: Duration::from_millis(self.poll_interval_millis),
            limit: self.recent_blocks_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::{ConfigError, ExplorerConfig, InvalidSetting, API_URL_ENV};

    #[test]
    fn defaults() {
        let conf = ExplorerConfig::default();
        assert_eq!(conf.api_url().unwrap().as_str(), "http://localhost:8080/");
        assert_eq!(conf.poller_conf().interval, Duration::from_secs(1));
        assert_eq!(conf.poller_conf().limit, 10);
        assert_eq!(conf.http_client_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let conf = ExplorerConfig::from_yaml(
            "api_url: \"https://katnip.example/api/\"\npoll_interval_millis: 250\n",
        )
        .unwrap();
        assert_eq!(conf.api_url().unwrap().as_str(), "https://katnip.example/api/");
        assert_eq!(conf.poller_conf().interval, Duration::from_millis(250));
        assert_eq!(conf.recent_blocks_limit, 10);
    }

    #[test]
    fn invalid_url_in_yaml_is_rejected() {
        assert!(matches!(
            ExplorerConfig::from_yaml("api_url: \"not a url\"\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn out_of_range_poller_settings_are_rejected() {
        assert!(matches!(
            ExplorerConfig::from_yaml("poll_interval_millis: 0\n"),
            Err(ConfigError::Setting(InvalidSetting::ZeroPollInterval))
        ));
        assert!(matches!(
            ExplorerConfig::from_yaml("recent_blocks_limit: 500\n"),
            Err(ConfigError::Setting(InvalidSetting::RecentBlocksLimit(500)))
        ));
        assert!(matches!(
            ExplorerConfig::from_yaml("recent_blocks_limit: 0\n"),
            Err(ConfigError::Setting(InvalidSetting::RecentBlocksLimit(0)))
        ));
        assert!(ExplorerConfig::from_yaml("recent_blocks_limit: 100\npoll_interval_millis: 1\n").is_ok());
    }

    #[test]
    fn env_overrides_file() {
        let conf = ExplorerConfig::from_yaml("api_url: \"http://file.example/\"\n")
            .unwrap()
            .with_overrides(|var| (var == API_URL_ENV).then(|| "http://env.example:9000/".to_string()))
            .unwrap();
        assert_eq!(conf.api_url().unwrap().as_str(), "http://env.example:9000/");
        let bad = ExplorerConfig::default().with_overrides(|_| Some("::".to_string()));
        assert!(matches!(bad, Err(ConfigError::Url(_))));
    }
}
