// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node server configuration.
//!
//! The controller hands the node server its settings as custom parameters,
//! a flat map of strings:
//!
//! | Parameter | Required | Meaning |
//! |-----------|----------|---------|
//! | `ipaddress` | yes | Host or IP address of the Autelis interface |
//! | `username` | yes | Basic authentication user |
//! | `password` | yes | Basic authentication password |
//! | `pollinginterval` | no | Seconds between status polls (default 20) |
//! | `ignoresolar` | no | Drop the solar sensor and solar heat fields |

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::protocol::HttpConfig;

const PARAM_HOST: &str = "ipaddress";
const PARAM_USERNAME: &str = "username";
const PARAM_PASSWORD: &str = "password";
const PARAM_POLLING_INTERVAL: &str = "pollinginterval";
const PARAM_IGNORE_SOLAR: &str = "ignoresolar";

/// Configuration of one node server instance.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use std::time::Duration;
/// use autelis_nodeserver::config::NodeServerConfig;
///
/// let params = HashMap::from([
///     ("ipaddress".to_string(), "192.168.1.60".to_string()),
///     ("username".to_string(), "admin".to_string()),
///     ("password".to_string(), "admin".to_string()),
///     ("pollinginterval".to_string(), "30".to_string()),
/// ]);
///
/// let config = NodeServerConfig::from_custom_params(&params).unwrap();
/// assert_eq!(config.polling_interval(), Duration::from_secs(30));
/// assert!(!config.ignore_solar());
///
/// // Or built directly
/// let config = NodeServerConfig::new("192.168.1.60", "admin", "admin")
///     .with_ignore_solar(true)
///     .with_refresh_after_command(false);
/// assert!(config.ignore_solar());
/// ```
#[derive(Clone)]
pub struct NodeServerConfig {
    host: String,
    username: String,
    password: String,
    polling_interval: Duration,
    ignore_solar: bool,
    request_timeout: Duration,
    refresh_after_command: bool,
}

impl NodeServerConfig {
    /// Default time between status polls.
    pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(20);

    /// Creates a configuration with default optional settings.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            polling_interval: Self::DEFAULT_POLLING_INTERVAL,
            ignore_solar: false,
            request_timeout: HttpConfig::DEFAULT_TIMEOUT,
            refresh_after_command: true,
        }
    }

    /// Builds a configuration from the controller's custom parameters.
    ///
    /// Parameter names are matched case-insensitively. An unusable polling
    /// interval falls back to the default with a warning.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingParameter` if `ipaddress`, `username` or
    /// `password` is absent or blank, and `ConfigError::InvalidParameter` if
    /// `ignoresolar` is not a boolean.
    pub fn from_custom_params(params: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| {
            params
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
                .map(|(_, value)| value.trim())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| {
            lookup(name)
                .map(str::to_string)
                .ok_or(ConfigError::MissingParameter(name))
        };

        let mut config = Self::new(
            required(PARAM_HOST)?,
            required(PARAM_USERNAME)?,
            required(PARAM_PASSWORD)?,
        );

        if let Some(raw) = lookup(PARAM_POLLING_INTERVAL) {
            config.polling_interval = parse_polling_interval(raw);
        }
        if let Some(raw) = lookup(PARAM_IGNORE_SOLAR) {
            config.ignore_solar = parse_flag(PARAM_IGNORE_SOLAR, raw)?;
        }

        tracing::debug!(
            host = %config.host,
            polling_interval_secs = config.polling_interval.as_secs(),
            ignore_solar = config.ignore_solar,
            "Loaded custom parameters"
        );
        Ok(config)
    }

    /// Builds a configuration from the custom parameters as a JSON object.
    ///
    /// Values may be strings, numbers or booleans.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidParameter` if `value` is not an object of
    /// scalars, otherwise the errors of
    /// [`from_custom_params`](Self::from_custom_params).
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let raw: HashMap<String, ParamValue> =
            HashMap::deserialize(value).map_err(|e| ConfigError::InvalidParameter {
                name: "customParams",
                value: e.to_string(),
            })?;
        let params = raw
            .into_iter()
            .map(|(key, value)| (key, value.into_string()))
            .collect();
        Self::from_custom_params(&params)
    }

    /// Sets the time between status polls.
    ///
    /// A zero interval is replaced by the default.
    #[must_use]
    pub fn with_polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = if interval.is_zero() {
            Self::DEFAULT_POLLING_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Drops the solar fields from every snapshot when `ignore` is true.
    #[must_use]
    pub fn with_ignore_solar(mut self, ignore: bool) -> Self {
        self.ignore_solar = ignore;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enables or disables the re-poll after each successful command.
    #[must_use]
    pub fn with_refresh_after_command(mut self, refresh: bool) -> Self {
        self.refresh_after_command = refresh;
        self
    }

    /// Returns the appliance host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the basic authentication user.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the time between status polls.
    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }

    /// Returns true if solar fields are dropped.
    #[must_use]
    pub fn ignore_solar(&self) -> bool {
        self.ignore_solar
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns true if the dispatcher re-polls after a command.
    #[must_use]
    pub fn refresh_after_command(&self) -> bool {
        self.refresh_after_command
    }

    /// Returns the HTTP client configuration for the appliance.
    #[must_use]
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(self.host.clone())
            .with_credentials(self.username.clone(), self.password.clone())
            .with_timeout(self.request_timeout)
    }
}

impl std::fmt::Debug for NodeServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeServerConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"***")
            .field("polling_interval", &self.polling_interval)
            .field("ignore_solar", &self.ignore_solar)
            .field("request_timeout", &self.request_timeout)
            .field("refresh_after_command", &self.refresh_after_command)
            .finish()
    }
}

/// A custom parameter value as it may appear in JSON.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParamValue {
    Text(String),
    Flag(bool),
    Number(serde_json::Number),
}

impl ParamValue {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Flag(flag) => flag.to_string(),
            Self::Number(number) => number.to_string(),
        }
    }
}

fn parse_polling_interval(raw: &str) -> Duration {
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            let default = NodeServerConfig::DEFAULT_POLLING_INTERVAL;
            tracing::warn!(
                value = raw,
                default_secs = default.as_secs(),
                "Invalid polling interval, using default"
            );
            default
        }
    }
}

fn parse_flag(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidParameter {
            name,
            value: raw.to_string(),
        }),
    }
}
