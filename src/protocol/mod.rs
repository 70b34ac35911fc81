// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Communication with the Autelis Pool Control interface.
//!
//! The appliance exposes two HTTP endpoints: `status.xml`, which returns the
//! whole equipment state, and `set.cgi`, which changes one attribute of one
//! element. [`AutelisClient`] implements both on top of `reqwest`; the sync
//! loop and the command dispatcher only depend on the [`Appliance`] trait.

mod http;

pub use http::{AutelisClient, Credentials, HttpConfig};

use crate::command::Command;
use crate::error::Result;
use crate::response::ApplianceStatus;

/// Trait for clients that can read and drive the pool appliance.
#[allow(async_fn_in_trait)]
pub trait Appliance {
    /// Fetches and parses the current status snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connectivity` if the appliance cannot be reached,
    /// `Error::Auth` if it rejects the credentials, or `Error::Parse` if the
    /// body is not a status document.
    async fn fetch_status(&self) -> Result<ApplianceStatus>;

    /// Sends a command to the appliance.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connectivity` or `Error::Auth` as for
    /// [`fetch_status`](Self::fetch_status).
    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<()>;
}
