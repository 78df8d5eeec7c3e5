#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Gazette Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `GAZETTE_ENV`. The
//!    settings for that environment are then loaded from `config/${env}.yaml`,
//!    if it exists. The default environment is "development". A "production"
//!    environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration and secrets if desired.
//! 4. Environment variables that begin with `GAZETTE_` and use `__` as a level
//!    separator. For example, `Settings::newsapi::api_key` can be controlled
//!    from the environment variable `GAZETTE_NEWSAPI__API_KEY`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format
//! supported by the [config] crate can be used, including JSON and TOML. To
//! choose another format, simply use a different extension for your file, like
//! `config/local.toml`.

mod logging;

pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use std::{net::SocketAddr, time::Duration};

/// Top level settings object for Gazette.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[doc(inline)]
pub struct Settings {
    /// The environment Gazette is running in. Should only be set with the
    /// `GAZETTE_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application. This should not be
    /// set to true in production environments.
    pub debug: bool,

    /// URL to redirect curious users of the service to, such as a documentation
    /// page. If unset, a plain text description is served instead.
    pub public_documentation: Option<String>,

    /// Whether to log the caller's search query. Queries are user input, so
    /// they are redacted from logs unless this is set.
    pub log_full_request: bool,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Settings for authenticating inbound callers.
    pub auth: AuthSettings,

    /// Settings for the upstream news provider.
    pub newsapi: NewsApiSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// Statsd metrics settings.
    pub metrics: MetricsSettings,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

/// Settings for authenticating inbound callers.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthSettings {
    /// The shared secret callers must present in the `X-API-KEY` header.
    pub api_key: String,
}

/// Settings for the upstream news provider.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewsApiSettings {
    /// The base URL of the provider, such as "https://newsapi.org". The search
    /// path is joined onto this per request.
    pub server: String,

    /// The credential sent to the provider as the `apiKey` query parameter.
    pub api_key: String,

    /// Bound on how long one outbound search may take.
    #[serde_as(as = "DurationSeconds")]
    #[serde(rename = "timeout_sec")]
    pub timeout: Duration,
}

/// Settings for the statsd metrics sink.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// The host to send metrics datagrams to.
    pub sink_host: String,

    /// The port to send metrics datagrams to.
    pub sink_port: u16,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("GAZETTE_ENV").unwrap_or_else(|_| "development".to_string());

        Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            // Merge in an environment specific config.
            .add_source(File::with_name(&format!("./config/{}", env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("./config/local").required(false))
            // Add environment variables that start with "GAZETTE_" and have
            // "__" to separate levels. For example, `GAZETTE_HTTP__LISTEN`
            // maps to `Settings::http::listen`.
            .add_source(Environment::with_prefix("GAZETTE").separator("__"))
            .set_override("env", env.as_str())?
            .build()?
            .try_deserialize()
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` can make test specific adjustments to the loaded settings
    /// before they are used.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let config = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("../config/base"))
            // Merge in test specific config.
            .add_source(File::with_name("../config/test"))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("../config/local_test").required(false))
            .set_override("env", "test")
            .expect("Could not set env for tests")
            .build()
            .expect("Could not load settings for tests");

        let mut settings: Self = config
            .try_deserialize()
            .expect("Could not convert settings");
        changer(&mut settings);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;

    #[test]
    fn load_for_tests_uses_the_test_environment() {
        let settings = Settings::load_for_tests(|_| ());
        assert_eq!(settings.env, "test");
        assert!(!settings.auth.api_key.is_empty());
        assert!(!settings.newsapi.api_key.is_empty());
    }

    #[test]
    fn load_for_tests_applies_the_changer() {
        let settings = Settings::load_for_tests(|s| s.debug = false);
        assert!(!settings.debug);
    }
}
