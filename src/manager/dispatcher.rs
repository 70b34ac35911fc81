// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation of controller commands into appliance requests.

use std::sync::Arc;

use crate::command::{Command, HeatSettingCommand, NodeAction, PowerCommand, SetpointCommand};
use crate::error::{Error, Result};
use crate::event::{EventBus, NodeEvent};
use crate::protocol::Appliance;
use crate::state::{NodeRecord, NodeRegistry};
use crate::types::{HeaterSetting, NodeAddress, PowerState};

use super::{PollOutcome, SyncLoop};

/// Acknowledgement of a handled command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandAck {
    /// The targeted node.
    pub address: NodeAddress,
    /// The action that was carried out.
    pub action: NodeAction,
    /// Whether a confirming poll was applied after the command.
    ///
    /// False when the re-poll is disabled or failed. A scheduled poll that
    /// was in flight when the command finished is waited for and followed
    /// by a fresh one, so the confirmation never comes from a request that
    /// predates the command.
    pub refreshed: bool,
}

/// Routes controller commands to the appliance.
///
/// Commands are validated before anything is sent: the action must be in
/// the supported vocabulary, the address must belong to a known node and the
/// node kind must accept the action. Registry values are never changed here;
/// the follow-up poll confirms what the appliance actually did.
#[derive(Debug)]
pub struct CommandDispatcher<A> {
    appliance: Arc<A>,
    registry: Arc<NodeRegistry>,
    sync: SyncLoop<A>,
    events: EventBus,
    refresh_after_command: bool,
}

impl<A: Appliance> CommandDispatcher<A> {
    /// Creates a dispatcher sharing the sync loop's appliance and registry.
    #[must_use]
    pub fn new(
        appliance: Arc<A>,
        registry: Arc<NodeRegistry>,
        sync: SyncLoop<A>,
        events: EventBus,
        refresh_after_command: bool,
    ) -> Self {
        Self {
            appliance,
            registry,
            sync,
            events,
            refresh_after_command,
        }
    }

    /// Handles one controller command.
    ///
    /// `command` is the controller command name (`DON`, `DOF`, `QUERY`,
    /// `SET_SPH`, `SET_MODE`) and `value` its optional parameter.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedAction` for commands outside the vocabulary
    /// or not accepted by the node kind, `Error::UnknownNode` for addresses no
    /// poll has reported, and the appliance error if the request fails.
    pub async fn handle(
        &self,
        address: &str,
        command: &str,
        value: Option<&str>,
    ) -> Result<CommandAck> {
        let address = NodeAddress::from(address);
        let action = NodeAction::parse(command, value).ok_or_else(|| {
            let action = match value {
                Some(value) => format!("{command} {value}"),
                None => command.to_string(),
            };
            tracing::warn!(address = %address, action = %action, "Unsupported command");
            Error::UnsupportedAction {
                address: address.clone(),
                action,
            }
        })?;

        let node = self.registry.get(&address).ok_or_else(|| {
            tracing::warn!(address = %address, action = %action, "Command for unknown node");
            Error::UnknownNode(address.clone())
        })?;

        if !action.is_supported_by(node.kind) {
            tracing::warn!(address = %address, kind = ?node.kind, action = %action, "Action not supported by node");
            return Err(Error::UnsupportedAction {
                address,
                action: action.to_string(),
            });
        }

        self.execute(&node, action).await?;

        let refreshed = self.refresh_after_command && self.refresh().await;

        if action == NodeAction::Query {
            let node = self.registry.get(&address).unwrap_or(node);
            self.events.publish(NodeEvent::Reported { node });
        }

        Ok(CommandAck {
            address,
            action,
            refreshed,
        })
    }

    async fn execute(&self, node: &NodeRecord, action: NodeAction) -> Result<()> {
        match action {
            NodeAction::Query => Ok(()),
            NodeAction::On => self.send(node, PowerCommand::new(&node.field, PowerState::On)).await,
            NodeAction::Off => self.send(node, PowerCommand::new(&node.field, PowerState::Off)).await,
            NodeAction::SetSetpoint(degrees) => {
                let element = setpoint_element(&node.field).ok_or_else(|| {
                    Error::UnsupportedAction {
                        address: node.address.clone(),
                        action: action.to_string(),
                    }
                })?;
                self.send(node, SetpointCommand::new(element, degrees)).await
            }
            NodeAction::SetMode(mode) => {
                let setting = HeaterSetting::from(mode);
                self.send(node, HeatSettingCommand::new(&node.field, setting))
                    .await
            }
        }
    }

    async fn send<C: Command + Sync>(&self, node: &NodeRecord, command: C) -> Result<()> {
        match self.appliance.send_command(&command).await {
            Ok(()) => {
                tracing::info!(
                    address = %node.address,
                    element = command.element(),
                    value = command.value(),
                    "Command sent"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(address = %node.address, error = %e, "Command failed");
                Err(e)
            }
        }
    }

    /// Re-polls so the controller sees the result of the command.
    async fn refresh(&self) -> bool {
        matches!(
            self.sync.poll_fresh().await,
            Ok(PollOutcome::Completed { .. })
        )
    }
}

/// Returns the setpoint element belonging to a heat source element.
fn setpoint_element(heat_field: &str) -> Option<&'static str> {
    match heat_field {
        "poolht" => Some("poolsp"),
        "poolht2" => Some("poolsp2"),
        "spaht" => Some("spasp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setpoint_elements() {
        assert_eq!(setpoint_element("poolht"), Some("poolsp"));
        assert_eq!(setpoint_element("poolht2"), Some("poolsp2"));
        assert_eq!(setpoint_element("spaht"), Some("spasp"));
        assert_eq!(setpoint_element("circuit1"), None);
    }
}
