// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polling and command handling.
//!
//! The [`NodeServer`] ties the parts together:
//!
//! - [`SyncLoop`] fetches a status snapshot on every tick, reconciles it with
//!   the node registry and publishes node events
//! - [`CommandDispatcher`] validates controller commands and turns them into
//!   appliance requests, followed by a confirming poll
//!
//! Both share one appliance client, so a command and a poll never hit the
//! appliance at the same time.

mod dispatcher;
mod node_server;
mod sync_loop;

pub use dispatcher::{CommandAck, CommandDispatcher};
pub use node_server::NodeServer;
pub use sync_loop::{PollOutcome, PollStats, SyncLoop, SyncState};
