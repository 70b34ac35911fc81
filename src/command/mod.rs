// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command definitions.
//!
//! Two vocabularies meet here. The controller sends node commands
//! ([`NodeAction`]: `DON`, `DOF`, `QUERY`, `SET_SPH`, `SET_MODE`), and the
//! appliance accepts `set.cgi` requests ([`Command`] implementors) that set
//! one attribute of one element.
//!
//! # Available Appliance Commands
//!
//! | Command Type | Purpose | Request |
//! |-------------|---------|---------|
//! | [`PowerCommand`] | Switch a circuit or feature | `name=circuit1&value=1` |
//! | [`SetpointCommand`] | Change a heat setpoint | `name=poolsp&temp=82` |
//! | [`HeatSettingCommand`] | Select a heat source | `name=spaht&hval=2` |
//!
//! # Examples
//!
//! ```
//! use autelis_nodeserver::command::{Command, PowerCommand};
//! use autelis_nodeserver::types::PowerState;
//!
//! let cmd = PowerCommand::new("circuit1", PowerState::On);
//! assert_eq!(cmd.to_query(), "name=circuit1&value=1");
//! ```

mod action;
mod appliance;

pub use action::NodeAction;
pub use appliance::{HeatSettingCommand, PowerCommand, SetpointCommand};

/// A command the appliance accepts on its `set.cgi` endpoint.
///
/// Every command sets one attribute (`label`) of one element to a numeric
/// value.
pub trait Command {
    /// Returns the element name, e.g. `"circuit1"` or `"poolsp"`.
    fn element(&self) -> &str;

    /// Returns the attribute to set: `"value"`, `"temp"` or `"hval"`.
    fn label(&self) -> &'static str;

    /// Returns the value to set.
    fn value(&self) -> i64;

    /// Returns the URL query string for `set.cgi`.
    fn to_query(&self) -> String {
        format!(
            "name={}&{}={}",
            urlencoding::encode(self.element()),
            self.label(),
            self.value()
        )
    }
}
