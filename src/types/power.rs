// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off state of circuits and features.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Represents the state of a circuit or feature.
///
/// The appliance reports and accepts these as `1` and `0`.
///
/// # Examples
///
/// ```
/// use autelis_nodeserver::types::PowerState;
///
/// assert_eq!("1".parse::<PowerState>().unwrap(), PowerState::On);
/// assert_eq!(PowerState::Off.as_num(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerState {
    /// Equipment is off.
    Off,
    /// Equipment is on.
    On,
}

impl PowerState {
    /// Returns the controller-facing name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Returns the numeric value used by the appliance.
    #[must_use]
    pub const fn as_num(&self) -> i64 {
        match self {
            Self::Off => 0,
            Self::On => 1,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "0" | "OFF" | "FALSE" => Ok(Self::Off),
            "1" | "ON" | "TRUE" => Ok(Self::On),
            _ => Err(ParseError::InvalidValue {
                field: "power state".to_string(),
                message: format!("{s:?} is neither on nor off"),
            }),
        }
    }
}

impl From<bool> for PowerState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}
