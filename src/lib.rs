// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Autelis node server - Pentair pool equipment for Polyglot v2 controllers.
//!
//! An Autelis Pool Control interface exposes a Pentair `EasyTouch` or
//! `IntelliTouch` system over HTTP. This library polls its status document,
//! mirrors every reported circuit, feature, heat source, setpoint and
//! temperature as a controller node, and turns controller commands back into
//! appliance requests.
//!
//! # Supported Features
//!
//! - **Switching**: circuits and features on/off (`DON`/`DOF`)
//! - **Heat control**: heat setpoints (`SET_SPH`) and heat source selection (`SET_MODE`)
//! - **Sensors**: pool, spa, air and solar temperatures in the appliance's display unit
//! - **Change tracking**: only changed values are pushed; a display unit toggle
//!   alone does not count as a temperature change
//!
//! # Quick Start
//!
//! ```no_run
//! use std::collections::HashMap;
//! use autelis_nodeserver::config::NodeServerConfig;
//! use autelis_nodeserver::manager::NodeServer;
//!
//! #[tokio::main]
//! async fn main() -> autelis_nodeserver::Result<()> {
//!     let params = HashMap::from([
//!         ("ipaddress".to_string(), "192.168.1.60".to_string()),
//!         ("username".to_string(), "admin".to_string()),
//!         ("password".to_string(), "admin".to_string()),
//!     ]);
//!     let server = NodeServer::connect(NodeServerConfig::from_custom_params(&params)?)?;
//!
//!     // Populate the registry, then switch a circuit
//!     server.poll_now().await?;
//!     server.handle_command("circuit1", "DON", None).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod manager;
pub mod protocol;
pub mod response;
pub mod state;
pub mod types;

pub use command::{Command, NodeAction};
pub use config::NodeServerConfig;
pub use error::{ConfigError, Error, ParseError, ProtocolError, Result};
pub use event::{EventBus, NodeEvent};
pub use manager::{CommandAck, NodeServer, PollOutcome};
pub use protocol::{Appliance, AutelisClient, HttpConfig};
pub use response::ApplianceStatus;
pub use state::{NodeKind, NodeRecord, NodeRegistry, NodeUpdate};
pub use types::{NodeAddress, PowerState, TempUnit};
