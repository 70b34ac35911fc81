// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node event types.

use crate::state::{NodeRecord, NodeUpdate};
use crate::types::{NodeAddress, TempUnit};

/// Events emitted by the node server.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum NodeEvent {
    /// A field reported a value for the first time; the controller should
    /// create the node.
    NodeAdded {
        /// The new node, with its initial value.
        node: NodeRecord,
    },

    /// A node's value changed between two polls.
    ValueChanged {
        /// The change.
        update: NodeUpdate,
    },

    /// A node was queried; its current value should be reported even if
    /// unchanged.
    Reported {
        /// The queried node.
        node: NodeRecord,
    },

    /// The appliance switched its temperature display unit. Temperature
    /// nodes change their unit of measure; heat nodes change their node
    /// definition.
    TempUnitChanged {
        /// Previous unit.
        from: TempUnit,
        /// New unit.
        to: TempUnit,
    },

    /// Reachability of the appliance changed.
    ConnectionChanged {
        /// Whether the last poll succeeded.
        connected: bool,
        /// Error message if the appliance became unreachable.
        error: Option<String>,
    },
}

impl NodeEvent {
    /// Returns the node address this event concerns, if any.
    #[must_use]
    pub fn address(&self) -> Option<&NodeAddress> {
        match self {
            Self::NodeAdded { node } | Self::Reported { node } => Some(&node.address),
            Self::ValueChanged { update } => Some(&update.address),
            Self::TempUnitChanged { .. } | Self::ConnectionChanged { .. } => None,
        }
    }

    /// Returns `true` if this is a value change event.
    #[must_use]
    pub fn is_value_change(&self) -> bool {
        matches!(self, Self::ValueChanged { .. })
    }

    /// Returns `true` if this is a connection event.
    #[must_use]
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::ConnectionChanged { .. })
    }

    /// Creates a connected event.
    #[must_use]
    pub fn connected() -> Self {
        Self::ConnectionChanged {
            connected: true,
            error: None,
        }
    }

    /// Creates a disconnected event with an error.
    #[must_use]
    pub fn disconnected_with_error(error: impl Into<String>) -> Self {
        Self::ConnectionChanged {
            connected: false,
            error: Some(error.into()),
        }
    }
}
