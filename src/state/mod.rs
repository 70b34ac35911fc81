// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node state tracking.
//!
//! The [`NodeRegistry`] keeps one [`NodeRecord`] per reporting field and
//! diffs every status snapshot against them. Each difference becomes a
//! [`NodeUpdate`] to push to the controller.
//!
//! # Examples
//!
//! ```
//! use autelis_nodeserver::response::{ApplianceStatus, Section};
//! use autelis_nodeserver::state::NodeRegistry;
//!
//! let registry = NodeRegistry::new();
//!
//! let mut status = ApplianceStatus::new();
//! status.insert(Section::Equipment, "circuit1", "1");
//! let first = registry.reconcile(&status).unwrap();
//! assert_eq!(first.added.len(), 1);
//!
//! status.insert(Section::Equipment, "circuit1", "0");
//! let second = registry.reconcile(&status).unwrap();
//! assert_eq!(second.changed.len(), 1);
//! assert_eq!(second.changed[0].value, "0");
//! ```

mod node;
mod registry;

pub use node::{NodeKind, NodeRecord, NodeUpdate};
pub use registry::{NodeRegistry, Reconciliation};
