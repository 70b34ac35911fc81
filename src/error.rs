// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the node server.
//!
//! Appliance failures fall into three groups: the device could not be
//! reached ([`Error::Connectivity`]), it rejected the credentials
//! ([`Error::Auth`]), or it answered with something that is not a status
//! document ([`Error::Parse`]). Command handling adds [`Error::UnknownNode`]
//! and [`Error::UnsupportedAction`].

use thiserror::Error;

use crate::types::NodeAddress;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The appliance could not be reached or did not answer in time.
    #[error("connectivity error: {0}")]
    Connectivity(#[from] ProtocolError),

    /// The appliance rejected the configured credentials.
    #[error("authentication failed: the appliance rejected the configured credentials")]
    Auth,

    /// The appliance answered with an unexpected response body.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A command targeted an address that no poll has ever reported.
    #[error("unknown node: {0}")]
    UnknownNode(NodeAddress),

    /// The requested action is not supported for the target node.
    #[error("action {action} is not supported by node {address}")]
    UnsupportedAction {
        /// The targeted node address.
        address: NodeAddress,
        /// The action as received from the controller.
        action: String,
    },

    /// The configuration supplied by the controller is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Returns true if the error is a network or timeout failure.
    #[must_use]
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }

    /// Returns true if the error came from a command the dispatcher refused
    /// before reaching the appliance.
    #[must_use]
    pub fn is_rejected_command(&self) -> bool {
        matches!(self, Self::UnknownNode(_) | Self::UnsupportedAction { .. })
    }
}

/// Transport-level failures talking to the appliance.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection to the appliance failed or it answered with an error status.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Request timed out.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Errors related to parsing the appliance status document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The body is not well-formed XML.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document root is not `<response>`.
    #[error("unexpected root element: {0}")]
    UnexpectedRoot(String),

    /// The document ended before all elements were closed.
    #[error("truncated document: <{0}> is never closed")]
    Truncated(String),

    /// Failed to parse a specific value.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The field that failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors in the node server configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required custom parameter is absent or empty.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// A parameter is present but cannot be used.
    #[error("invalid value {value:?} for parameter {name}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_node_display() {
        let err = Error::UnknownNode(NodeAddress::from_field("circuit9"));
        assert_eq!(err.to_string(), "unknown node: circuit9");
    }

    #[test]
    fn unsupported_action_display() {
        let err = Error::UnsupportedAction {
            address: NodeAddress::from_field("circuit1"),
            action: "BRT".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "action BRT is not supported by node circuit1"
        );
    }

    #[test]
    fn error_from_protocol_error_is_connectivity() {
        let err: Error = ProtocolError::Timeout(3050).into();
        assert!(err.is_connectivity());
        assert!(!err.is_rejected_command());
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingParameter("ipaddress");
        assert_eq!(err.to_string(), "missing required parameter: ipaddress");
    }
}
