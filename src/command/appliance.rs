// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Appliance `set.cgi` commands.

use crate::command::Command;
use crate::types::{HeaterSetting, PowerState};

/// Switches a circuit or feature on or off.
///
/// # Examples
///
/// ```
/// use autelis_nodeserver::command::{Command, PowerCommand};
/// use autelis_nodeserver::types::PowerState;
///
/// let cmd = PowerCommand::off("circuit3");
/// assert_eq!(cmd.element(), "circuit3");
/// assert_eq!(cmd.label(), "value");
/// assert_eq!(cmd.value(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PowerCommand {
    element: String,
    state: PowerState,
}

impl PowerCommand {
    /// Creates a command setting `element` to `state`.
    #[must_use]
    pub fn new(element: impl Into<String>, state: PowerState) -> Self {
        Self {
            element: element.into(),
            state,
        }
    }

    /// Creates a command to turn `element` on.
    #[must_use]
    pub fn on(element: impl Into<String>) -> Self {
        Self::new(element, PowerState::On)
    }

    /// Creates a command to turn `element` off.
    #[must_use]
    pub fn off(element: impl Into<String>) -> Self {
        Self::new(element, PowerState::Off)
    }

    /// Returns the requested state.
    #[must_use]
    pub fn state(&self) -> PowerState {
        self.state
    }
}

impl Command for PowerCommand {
    fn element(&self) -> &str {
        &self.element
    }

    fn label(&self) -> &'static str {
        "value"
    }

    fn value(&self) -> i64 {
        self.state.as_num()
    }
}

/// Sets a heat setpoint, in the appliance's current display unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetpointCommand {
    element: String,
    degrees: i64,
}

impl SetpointCommand {
    /// Creates a command setting setpoint `element` to `degrees`.
    #[must_use]
    pub fn new(element: impl Into<String>, degrees: i64) -> Self {
        Self {
            element: element.into(),
            degrees,
        }
    }
}

impl Command for SetpointCommand {
    fn element(&self) -> &str {
        &self.element
    }

    fn label(&self) -> &'static str {
        "temp"
    }

    fn value(&self) -> i64 {
        self.degrees
    }
}

/// Selects the heat source of a pool or spa heat element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeatSettingCommand {
    element: String,
    setting: HeaterSetting,
}

impl HeatSettingCommand {
    /// Creates a command selecting `setting` for heat element `element`.
    #[must_use]
    pub fn new(element: impl Into<String>, setting: HeaterSetting) -> Self {
        Self {
            element: element.into(),
            setting,
        }
    }
}

impl Command for HeatSettingCommand {
    fn element(&self) -> &str {
        &self.element
    }

    fn label(&self) -> &'static str {
        "hval"
    }

    fn value(&self) -> i64 {
        self.setting.as_num()
    }
}
