// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller command vocabulary.

use std::fmt;

use crate::state::NodeKind;
use crate::types::ThermostatMode;

/// A node command as received from the controller.
///
/// Only binary switching is supported for equipment: a `DON` carrying a
/// level, and any dimming, color, speed or fast on/off command, does not
/// parse.
///
/// # Examples
///
/// ```
/// use autelis_nodeserver::command::NodeAction;
///
/// assert_eq!(NodeAction::parse("DON", None), Some(NodeAction::On));
/// assert_eq!(NodeAction::parse("SET_SPH", Some("84")), Some(NodeAction::SetSetpoint(84)));
/// assert_eq!(NodeAction::parse("DON", Some("50")), None);
/// assert_eq!(NodeAction::parse("BRT", None), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeAction {
    /// `DON`: switch on.
    On,
    /// `DOF`: switch off.
    Off,
    /// `QUERY`: refresh and report the node.
    Query,
    /// `SET_SPH`: set the heat setpoint, in the current display unit.
    SetSetpoint(i64),
    /// `SET_MODE`: select the heat source by thermostat mode.
    SetMode(ThermostatMode),
}

impl NodeAction {
    /// Parses a controller command name and its optional value.
    ///
    /// Returns `None` for anything outside the supported vocabulary.
    #[must_use]
    pub fn parse(command: &str, value: Option<&str>) -> Option<Self> {
        let value = value.map(str::trim).filter(|v| !v.is_empty());
        match (command.trim().to_ascii_uppercase().as_str(), value) {
            ("DON", None) => Some(Self::On),
            ("DOF", None) => Some(Self::Off),
            ("QUERY", None) => Some(Self::Query),
            ("SET_SPH", Some(v)) => parse_number(v).map(Self::SetSetpoint),
            ("SET_MODE", Some(v)) => {
                parse_number(v).map(|n| Self::SetMode(ThermostatMode::from_num(n)))
            }
            _ => None,
        }
    }

    /// Returns the controller command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::On => "DON",
            Self::Off => "DOF",
            Self::Query => "QUERY",
            Self::SetSetpoint(_) => "SET_SPH",
            Self::SetMode(_) => "SET_MODE",
        }
    }

    /// Returns true if a node of `kind` accepts this action.
    #[must_use]
    pub const fn is_supported_by(&self, kind: NodeKind) -> bool {
        match self {
            Self::Query => true,
            Self::On | Self::Off => kind.is_switchable(),
            Self::SetSetpoint(_) | Self::SetMode(_) => kind.is_heat(),
        }
    }

    /// Returns true if the action sends a request to the appliance.
    #[must_use]
    pub const fn reaches_appliance(&self) -> bool {
        !matches!(self, Self::Query)
    }
}

impl fmt::Display for NodeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetSetpoint(degrees) => write!(f, "{} {degrees}", self.name()),
            Self::SetMode(mode) => write!(f, "{} {}", self.name(), mode.as_num()),
            _ => f.write_str(self.name()),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn parse_number(value: &str) -> Option<i64> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    // The controller sends driver values with a decimal part at times.
    value
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}
