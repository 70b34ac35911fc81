// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP client for the Autelis Pool Control interface.

use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;

use crate::command::Command;
use crate::error::{Error, ProtocolError, Result};
use crate::protocol::Appliance;
use crate::response::ApplianceStatus;

const STATUS_ENDPOINT: &str = "status.xml";
const COMMAND_ENDPOINT: &str = "set.cgi";

// ============================================================================
// HttpConfig
// ============================================================================

/// Connection parameters for the appliance.
///
/// # Examples
///
/// ```
/// use autelis_nodeserver::protocol::HttpConfig;
/// use std::time::Duration;
///
/// let config = HttpConfig::new("192.168.1.60")
///     .with_credentials("admin", "admin")
///     .with_timeout(Duration::from_secs(5));
/// assert_eq!(config.base_url(), "http://192.168.1.60");
///
/// let config = HttpConfig::new("https://pool.local:8443");
/// assert_eq!(config.base_url(), "https://pool.local:8443");
/// ```
#[derive(Debug, Clone)]
pub struct HttpConfig {
    host: String,
    use_https: bool,
    credentials: Option<(String, String)>,
    timeout: Duration,
}

impl HttpConfig {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3050);

    /// Creates a configuration for the appliance at `host`.
    ///
    /// `host` is an IP address or hostname, optionally with a port and an
    /// `http://` or `https://` scheme.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            use_https: false,
            credentials: None,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Uses HTTPS when `host` carries no scheme.
    #[must_use]
    pub fn with_https(mut self) -> Self {
        self.use_https = true;
        self
    }

    /// Sets basic authentication credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the host as configured.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the credentials if set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.credentials
            .as_ref()
            .map(|(u, p)| (u.as_str(), p.as_str()))
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the base URL from this configuration.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            let scheme = if self.use_https { "https" } else { "http" };
            format!("{scheme}://{host}")
        }
    }

    /// Creates an [`AutelisClient`] from this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidAddress` if the host is empty, or
    /// `ProtocolError::Http` if the HTTP client cannot be created.
    pub fn into_client(self) -> std::result::Result<AutelisClient, ProtocolError> {
        if self.host.trim().is_empty() {
            return Err(ProtocolError::InvalidAddress("host is required".to_string()));
        }

        let base_url = self.base_url();

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)?;

        let credentials = self
            .credentials
            .map(|(username, password)| Credentials { username, password });

        Ok(AutelisClient {
            base_url,
            client,
            credentials,
            timeout: self.timeout,
            request_guard: Mutex::new(()),
        })
    }
}

// ============================================================================
// AutelisClient
// ============================================================================

/// HTTP authentication credentials.
#[derive(Clone)]
pub struct Credentials {
    /// Username for authentication.
    pub username: String,
    /// Password for authentication.
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// HTTP client for the appliance.
///
/// Requests are serialized: the appliance copes badly with concurrent
/// connections, so a command issued while a poll is in flight waits for the
/// poll to finish. Waiting for the guard and the request itself are each
/// bounded by the configured timeout.
///
/// # Examples
///
/// ```no_run
/// use autelis_nodeserver::protocol::{Appliance, HttpConfig};
/// use autelis_nodeserver::command::PowerCommand;
///
/// # async fn example() -> autelis_nodeserver::Result<()> {
/// let client = HttpConfig::new("192.168.1.60")
///     .with_credentials("admin", "admin")
///     .into_client()?;
///
/// let status = client.fetch_status().await?;
/// println!("pool: {:?}", status.value("pooltemp"));
///
/// client.send_command(&PowerCommand::on("circuit1")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct AutelisClient {
    base_url: String,
    client: Client,
    credentials: Option<Credentials>,
    timeout: Duration,
    request_guard: Mutex<()>,
}

impl AutelisClient {
    /// Returns the base URL of the appliance.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn timeout_millis(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Builds the URL for an endpoint and optional query string.
    fn build_url(&self, endpoint: &str, query: Option<&str>) -> String {
        match query {
            Some(query) => format!("{}/{endpoint}?{query}", self.base_url),
            None => format!("{}/{endpoint}", self.base_url),
        }
    }

    async fn get(&self, url: &str) -> Result<String> {
        let _guard = tokio::time::timeout(self.timeout, self.request_guard.lock())
            .await
            .map_err(|_| ProtocolError::Timeout(self.timeout_millis()))?;

        tracing::debug!(url = %url, "Sending HTTP request");

        let mut request = self.client.get(url);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Auth);
        }

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            ))
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        tracing::trace!(body = %body, "Received HTTP response");

        Ok(body)
    }

    fn transport_error(&self, error: reqwest::Error) -> ProtocolError {
        if error.is_timeout() {
            ProtocolError::Timeout(self.timeout_millis())
        } else if error.is_connect() {
            ProtocolError::ConnectionFailed(error.to_string())
        } else {
            ProtocolError::Http(error)
        }
    }
}

impl Appliance for AutelisClient {
    async fn fetch_status(&self) -> Result<ApplianceStatus> {
        let url = self.build_url(STATUS_ENDPOINT, None);
        let body = self.get(&url).await?;

        ApplianceStatus::parse(&body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Appliance returned an invalid status document");
            Error::Parse(e)
        })
    }

    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<()> {
        let url = self.build_url(COMMAND_ENDPOINT, Some(&command.to_query()));
        let body = self.get(&url).await?;

        tracing::debug!(
            element = command.element(),
            label = command.label(),
            value = command.value(),
            response = %body.trim(),
            "Appliance accepted command"
        );

        Ok(())
    }
}
