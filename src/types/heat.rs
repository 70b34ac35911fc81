// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heat source settings for the pool and spa heat nodes.
//!
//! The controller speaks ISY thermostat modes; the Pentair controller speaks
//! heater settings. The two are mapped one to one, with every unknown
//! thermostat mode falling back to [`HeaterSetting::Off`].

use crate::error::ParseError;

/// Pentair heat source selection, as found in `<poolht>` / `<spaht>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeaterSetting {
    /// Heating disabled.
    #[default]
    Off,
    /// Gas or electric heater.
    Heater,
    /// Solar first, heater as backup.
    SolarPreferred,
    /// Solar only.
    SolarOnly,
}

impl HeaterSetting {
    /// Returns the value sent as `hval` to the appliance.
    #[must_use]
    pub const fn as_num(&self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Heater => 1,
            Self::SolarPreferred => 2,
            Self::SolarOnly => 3,
        }
    }

    /// Parses the appliance's numeric heater setting.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if the value is not 0 through 3.
    pub fn from_raw(raw: &str) -> Result<Self, ParseError> {
        match raw.trim() {
            "0" => Ok(Self::Off),
            "1" => Ok(Self::Heater),
            "2" => Ok(Self::SolarPreferred),
            "3" => Ok(Self::SolarOnly),
            other => Err(ParseError::InvalidValue {
                field: "heater setting".to_string(),
                message: format!("{other:?} is not a heater setting"),
            }),
        }
    }
}

/// ISY thermostat mode (`CLIMD` driver).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThermostatMode {
    /// Off (0).
    #[default]
    Off,
    /// Heat (1).
    Heat,
    /// Auto (3).
    Auto,
    /// Aux / emergency heat (4).
    AuxHeat,
}

impl ThermostatMode {
    /// Returns the ISY mode index.
    #[must_use]
    pub const fn as_num(&self) -> i64 {
        match self {
            Self::Off => 0,
            Self::Heat => 1,
            Self::Auto => 3,
            Self::AuxHeat => 4,
        }
    }

    /// Maps an ISY mode index; unknown indexes mean off.
    #[must_use]
    pub const fn from_num(value: i64) -> Self {
        match value {
            1 => Self::Heat,
            3 => Self::Auto,
            4 => Self::AuxHeat,
            _ => Self::Off,
        }
    }
}

impl From<ThermostatMode> for HeaterSetting {
    fn from(mode: ThermostatMode) -> Self {
        match mode {
            ThermostatMode::Off => Self::Off,
            ThermostatMode::Heat => Self::Heater,
            ThermostatMode::Auto => Self::SolarPreferred,
            ThermostatMode::AuxHeat => Self::SolarOnly,
        }
    }
}

impl From<HeaterSetting> for ThermostatMode {
    fn from(setting: HeaterSetting) -> Self {
        match setting {
            HeaterSetting::Off => Self::Off,
            HeaterSetting::Heater => Self::Heat,
            HeaterSetting::SolarPreferred => Self::Auto,
            HeaterSetting::SolarOnly => Self::AuxHeat,
        }
    }
}

/// Heat/cool state of a heat node (`CLIHCS` driver), decoded from `<htstatus>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HeatingState {
    /// Not heating.
    #[default]
    Idle,
    /// Heater running.
    Heating,
    /// Solar running.
    AuxHeat,
}

impl HeatingState {
    const POOL_HEAT: u8 = 0b0001;
    const SPA_HEAT: u8 = 0b0010;
    const POOL_SOLAR: u8 = 0b0100;
    const SPA_SOLAR: u8 = 0b1000;

    /// Decodes `htstatus` for the pool (`spa == false`) or spa body of water.
    #[must_use]
    pub const fn from_status_bits(bits: u8, spa: bool) -> Self {
        let (heat, solar) = if spa {
            (Self::SPA_HEAT, Self::SPA_SOLAR)
        } else {
            (Self::POOL_HEAT, Self::POOL_SOLAR)
        };
        if bits & heat != 0 {
            Self::Heating
        } else if bits & solar != 0 {
            Self::AuxHeat
        } else {
            Self::Idle
        }
    }

    /// Returns the ISY heat/cool state index.
    #[must_use]
    pub const fn as_num(&self) -> i64 {
        match self {
            Self::Idle => 0,
            Self::Heating => 1,
            Self::AuxHeat => 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thermostat_mode_maps_to_heater_setting() {
        assert_eq!(HeaterSetting::from(ThermostatMode::Heat), HeaterSetting::Heater);
        assert_eq!(
            HeaterSetting::from(ThermostatMode::Auto),
            HeaterSetting::SolarPreferred
        );
        assert_eq!(
            HeaterSetting::from(ThermostatMode::AuxHeat),
            HeaterSetting::SolarOnly
        );
        assert_eq!(HeaterSetting::from(ThermostatMode::from_num(2)), HeaterSetting::Off);
    }

    #[test]
    fn heater_setting_round_trips_through_mode() {
        for raw in ["0", "1", "2", "3"] {
            let setting = HeaterSetting::from_raw(raw).unwrap();
            assert_eq!(HeaterSetting::from(ThermostatMode::from(setting)), setting);
        }
        assert!(HeaterSetting::from_raw("4").is_err());
    }

    #[test]
    fn heating_state_prefers_heater_over_solar() {
        assert_eq!(HeatingState::from_status_bits(0b0101, false), HeatingState::Heating);
        assert_eq!(HeatingState::from_status_bits(0b0100, false), HeatingState::AuxHeat);
        assert_eq!(HeatingState::from_status_bits(0b0001, true), HeatingState::Idle);
        assert_eq!(HeatingState::from_status_bits(0b1000, true), HeatingState::AuxHeat);
        assert_eq!(HeatingState::AuxHeat.as_num(), 7);
    }
}
