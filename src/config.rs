use crate::application::scheduler::RefreshInterval;
use crate::error::Error;
use config::{Config, ConfigError, Environment, File};
use http::Uri;
use nutype::nutype;
use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Port number for the board's HTTP surface
#[nutype(
    validate(predicate = |port: &u16| *port > 0),
    derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRef, Display)
)]
pub struct Port(u16);

/// Upper bound on one feed request, in milliseconds
#[nutype(
    validate(greater = 0, less_or_equal = 300_000),
    derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, AsRef, Display)
)]
pub struct FeedTimeoutMillis(u64);

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub feed: FeedSettings,
    pub refresh: RefreshSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: Port,
    pub environment: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedSettings {
    /// Proxy endpoint serving the lap feed
    pub url: String,
    pub timeout_ms: FeedTimeoutMillis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    pub interval_minutes: RefreshInterval,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8080)?
            .set_default("application.environment", environment.clone())?
            .set_default("feed.url", "http://127.0.0.1:8787/laps")?
            .set_default("feed.timeout_ms", 10_000)?
            .set_default("refresh.interval_minutes", 10)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("LAP_BOARD").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Parsed feed endpoint; only plain `http` is supported
    pub fn feed_uri(&self) -> Result<Uri, Error> {
        let uri: Uri = self
            .feed
            .url
            .parse()
            .map_err(|e| Error::invalid_configuration("feed.url", e))?;
        match uri.scheme_str() {
            Some("http") if uri.host().is_some() => Ok(uri),
            _ => Err(Error::invalid_configuration(
                "feed.url",
                "expected an http:// URL with a host",
            )),
        }
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_millis(self.feed.timeout_ms.into_inner())
    }
}
