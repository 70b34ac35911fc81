// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node records and their kinds.

use crate::response::Section;
use crate::types::{HeaterSetting, NodeAddress, PowerState, TempUnit, ThermostatMode};

/// What a node represents, which decides the commands it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum NodeKind {
    /// Switchable circuit or other equipment (`circuitN`, `pump`, `cleaner`).
    Circuit,
    /// Switchable feature (`featureN`).
    Feature,
    /// Pool heat source selection (`poolht`, `poolht2`).
    PoolHeat,
    /// Spa heat source selection (`spaht`).
    SpaHeat,
    /// Measured temperature (`pooltemp`, `spatemp`, `airtemp`, `soltemp`).
    TemperatureSensor,
    /// Heat setpoint (`poolsp`, `poolsp2`, `spasp`).
    Setpoint,
    /// Controller status value (`runstate`, `opmode`, `freeze`, `sensorN`, `htstatus`).
    System,
}

impl NodeKind {
    /// Classifies a status field, or returns `None` for fields that never
    /// become nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use autelis_nodeserver::response::Section;
    /// use autelis_nodeserver::state::NodeKind;
    ///
    /// assert_eq!(NodeKind::classify(Section::Equipment, "circuit4"), Some(NodeKind::Circuit));
    /// assert_eq!(NodeKind::classify(Section::Temp, "spaht"), Some(NodeKind::SpaHeat));
    /// assert_eq!(NodeKind::classify(Section::Temp, "tempunits"), None);
    /// ```
    #[must_use]
    pub fn classify(section: Section, field: &str) -> Option<Self> {
        match section {
            Section::Equipment if field.starts_with("feature") => Some(Self::Feature),
            Section::Equipment => Some(Self::Circuit),
            Section::Temp => match field {
                "tempunits" => None,
                "poolht" | "poolht2" => Some(Self::PoolHeat),
                "spaht" => Some(Self::SpaHeat),
                "poolsp" | "poolsp2" | "spasp" => Some(Self::Setpoint),
                "htstatus" => Some(Self::System),
                f if f.ends_with("temp") || f.ends_with("temp2") => Some(Self::TemperatureSensor),
                _ => None,
            },
            Section::System => Some(Self::System),
            Section::Other => None,
        }
    }

    /// Returns true for kinds whose value is a temperature in the appliance's
    /// display unit.
    #[must_use]
    pub const fn is_temperature(&self) -> bool {
        matches!(self, Self::TemperatureSensor | Self::Setpoint)
    }

    /// Returns true for kinds that accept on/off commands.
    #[must_use]
    pub const fn is_switchable(&self) -> bool {
        matches!(self, Self::Circuit | Self::Feature)
    }

    /// Returns true for heat source nodes.
    #[must_use]
    pub const fn is_heat(&self) -> bool {
        matches!(self, Self::PoolHeat | Self::SpaHeat)
    }

    /// Returns the controller node definition id for this kind.
    #[must_use]
    pub const fn node_def_id(&self, unit: TempUnit) -> &'static str {
        match self {
            Self::Circuit | Self::Feature => "EQUIPMENT",
            Self::PoolHeat | Self::SpaHeat => match unit {
                TempUnit::Fahrenheit => "TEMP_CONTROL",
                TempUnit::Celsius => "TEMP_CONTROL_C",
            },
            Self::TemperatureSensor | Self::Setpoint => "TEMP_SENSOR",
            Self::System => "STATUS",
        }
    }
}

/// A controller-visible node and its last reported value.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NodeRecord {
    /// Node address, derived from the field name.
    pub address: NodeAddress,
    /// Name of the status field the node mirrors.
    pub field: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Last value reported by the appliance.
    pub value: String,
    /// Display unit of `value`, set for temperature kinds only.
    pub temp_unit: Option<TempUnit>,
}

impl NodeRecord {
    /// Parses the value as a number, if it is one.
    #[must_use]
    pub fn numeric_value(&self) -> Option<f64> {
        self.value.trim().parse().ok()
    }

    /// Returns the on/off state of a circuit or feature node.
    #[must_use]
    pub fn power_state(&self) -> Option<PowerState> {
        if !self.kind.is_switchable() {
            return None;
        }
        self.value.parse().ok()
    }

    /// Returns the thermostat mode of a heat node.
    #[must_use]
    pub fn thermostat_mode(&self) -> Option<ThermostatMode> {
        if !self.kind.is_heat() {
            return None;
        }
        HeaterSetting::from_raw(&self.value).ok().map(ThermostatMode::from)
    }

    /// Returns the controller unit of measure for a temperature node.
    #[must_use]
    pub fn uom(&self) -> Option<u8> {
        self.temp_unit.map(|unit| unit.isy_uom())
    }
}

/// A changed field to push to the controller.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NodeUpdate {
    /// Address of the changed node.
    pub address: NodeAddress,
    /// Node kind.
    pub kind: NodeKind,
    /// Value before this poll.
    pub previous: String,
    /// Value reported by this poll.
    pub value: String,
    /// Display unit of `value`, set for temperature kinds only.
    pub temp_unit: Option<TempUnit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_equipment() {
        assert_eq!(
            NodeKind::classify(Section::Equipment, "feature2"),
            Some(NodeKind::Feature)
        );
        assert_eq!(
            NodeKind::classify(Section::Equipment, "cleaner"),
            Some(NodeKind::Circuit)
        );
    }

    #[test]
    fn classify_temperatures() {
        assert_eq!(
            NodeKind::classify(Section::Temp, "pooltemp"),
            Some(NodeKind::TemperatureSensor)
        );
        assert_eq!(
            NodeKind::classify(Section::Temp, "soltemp"),
            Some(NodeKind::TemperatureSensor)
        );
        assert_eq!(
            NodeKind::classify(Section::Temp, "poolsp2"),
            Some(NodeKind::Setpoint)
        );
        assert_eq!(
            NodeKind::classify(Section::Temp, "poolht2"),
            Some(NodeKind::PoolHeat)
        );
        assert_eq!(
            NodeKind::classify(Section::Temp, "htstatus"),
            Some(NodeKind::System)
        );
    }

    #[test]
    fn classify_ignored_fields() {
        assert_eq!(NodeKind::classify(Section::Temp, "tempunits"), None);
        assert_eq!(NodeKind::classify(Section::Other, "version"), None);
    }

    fn record(field: &str, kind: NodeKind, value: &str) -> NodeRecord {
        NodeRecord {
            address: NodeAddress::from_field(field),
            field: field.to_string(),
            kind,
            value: value.to_string(),
            temp_unit: kind.is_temperature().then_some(TempUnit::Celsius),
        }
    }

    #[test]
    fn driver_values() {
        let circuit = record("circuit1", NodeKind::Circuit, "1");
        assert_eq!(circuit.power_state(), Some(PowerState::On));
        assert_eq!(circuit.thermostat_mode(), None);
        assert_eq!(circuit.uom(), None);

        let heat = record("spaht", NodeKind::SpaHeat, "2");
        assert_eq!(heat.thermostat_mode(), Some(ThermostatMode::Auto));
        assert_eq!(heat.power_state(), None);

        let temp = record("airtemp", NodeKind::TemperatureSensor, "21");
        assert_eq!(temp.uom(), Some(4));
        assert_eq!(temp.numeric_value(), Some(21.0));
    }

    #[test]
    fn node_def_follows_unit() {
        assert_eq!(
            NodeKind::SpaHeat.node_def_id(TempUnit::Celsius),
            "TEMP_CONTROL_C"
        );
        assert_eq!(
            NodeKind::PoolHeat.node_def_id(TempUnit::Fahrenheit),
            "TEMP_CONTROL"
        );
        assert_eq!(NodeKind::Feature.node_def_id(TempUnit::Celsius), "EQUIPMENT");
    }
}
