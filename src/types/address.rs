// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node addresses.

use std::fmt;

/// Address of a controller node.
///
/// Addresses are derived from the status field name: lowercased, reduced to
/// ASCII alphanumerics and truncated to [`NodeAddress::MAX_LEN`] characters,
/// the longest address Polyglot v2 accepts. The same field name always maps
/// to the same address.
///
/// # Examples
///
/// ```
/// use autelis_nodeserver::types::NodeAddress;
///
/// let addr = NodeAddress::from_field("Circuit1");
/// assert_eq!(addr.as_str(), "circuit1");
///
/// let addr = NodeAddress::from_field("pool_temp");
/// assert_eq!(addr.as_str(), "pooltemp");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeAddress(String);

impl NodeAddress {
    /// Longest address accepted by the controller.
    pub const MAX_LEN: usize = 14;

    /// Derives the address for a status field.
    #[must_use]
    pub fn from_field(field: &str) -> Self {
        let address = field
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .take(Self::MAX_LEN)
            .collect();
        Self(address)
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the field name contained no usable characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeAddress {
    fn from(value: &str) -> Self {
        Self::from_field(value)
    }
}
