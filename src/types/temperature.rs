// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature display units.
//!
//! The appliance reports every temperature as a whole number in its current
//! display unit (`<tempunits>`). When the unit is toggled on the device the
//! same water temperature shows up as a different number, so readings taken
//! in different units are compared through [`TempUnit::same_reading`].

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Display unit of the appliance's temperature readings.
///
/// # Examples
///
/// ```
/// use autelis_nodeserver::types::TempUnit;
///
/// let unit: TempUnit = "C".parse().unwrap();
/// assert_eq!(unit, TempUnit::Celsius);
/// assert!((TempUnit::Fahrenheit.convert(212.0, TempUnit::Celsius) - 100.0).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum TempUnit {
    /// Degrees Fahrenheit (the appliance default).
    #[default]
    Fahrenheit,
    /// Degrees Celsius.
    Celsius,
}

impl TempUnit {
    /// Returns the indicator letter used by the appliance.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fahrenheit => "F",
            Self::Celsius => "C",
        }
    }

    /// Returns the ISY unit-of-measure code for temperatures in this unit.
    #[must_use]
    pub const fn isy_uom(&self) -> u8 {
        match self {
            Self::Fahrenheit => 17,
            Self::Celsius => 4,
        }
    }

    /// Converts a reading in this unit into `target`.
    #[must_use]
    pub fn convert(self, value: f64, target: Self) -> f64 {
        match (self, target) {
            (Self::Fahrenheit, Self::Celsius) => (value - 32.0) * 5.0 / 9.0,
            (Self::Celsius, Self::Fahrenheit) => value * 9.0 / 5.0 + 32.0,
            _ => value,
        }
    }

    /// Size of one degree of this unit expressed in `target` degrees.
    fn degree_in(self, target: Self) -> f64 {
        match (self, target) {
            (Self::Fahrenheit, Self::Celsius) => 5.0 / 9.0,
            (Self::Celsius, Self::Fahrenheit) => 9.0 / 5.0,
            _ => 1.0,
        }
    }

    /// Returns true if `old` (in `self`) and `new` (in `new_unit`) can be the
    /// same physical temperature given that both were rounded to whole
    /// degrees by the appliance.
    #[must_use]
    pub fn same_reading(self, old: f64, new_unit: Self, new: f64) -> bool {
        if self == new_unit {
            return (old - new).abs() < f64::EPSILON;
        }
        let tolerance = 0.5 * self.degree_in(new_unit) + 0.5;
        (self.convert(old, new_unit) - new).abs() <= tolerance
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TempUnit {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "F" | "f" => Ok(Self::Fahrenheit),
            "C" | "c" => Ok(Self::Celsius),
            other => Err(ParseError::InvalidValue {
                field: "tempunits".to_string(),
                message: format!("unknown temperature unit {other:?}"),
            }),
        }
    }
}
