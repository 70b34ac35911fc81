// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Events pushed to the controller.
//!
//! Everything the node server has to tell the controller (node creation,
//! value changes, query reports, unit toggles and connectivity) travels as a
//! [`NodeEvent`] over the [`EventBus`]. The controller bridge subscribes and
//! translates each event into node protocol calls.
//!
//! # Examples
//!
//! ```
//! use autelis_nodeserver::event::{EventBus, NodeEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(NodeEvent::connected());
//! assert!(rx.try_recv().unwrap().is_connection());
//! ```

mod event_bus;
mod node_event;

pub use event_bus::EventBus;
pub use node_event::NodeEvent;
