// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the appliance client, the registry and the
//! command dispatcher.
//!
//! # Types
//!
//! - [`NodeAddress`] - Controller-visible address derived from a status field name
//! - [`PowerState`] - On/Off state of a circuit or feature
//! - [`TempUnit`] - Display unit reported by the appliance (`F` or `C`)
//! - [`ThermostatMode`] / [`HeaterSetting`] - Controller and Pentair views of a heat source
//! - [`HeatingState`] - Decoded `htstatus` bits for a heat node

mod address;
mod heat;
mod power;
mod temperature;

pub use address::NodeAddress;
pub use heat::{HeaterSetting, HeatingState, ThermostatMode};
pub use power::PowerState;
pub use temperature::TempUnit;
