// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node server facade.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::config::NodeServerConfig;
use crate::error::Result;
use crate::event::{EventBus, NodeEvent};
use crate::protocol::{Appliance, AutelisClient};
use crate::state::NodeRegistry;

use super::{CommandAck, CommandDispatcher, PollOutcome, PollStats, SyncLoop};

/// One node server instance bound to one Autelis interface.
///
/// Owns the node registry and event bus, and wires the sync loop and the
/// command dispatcher to a shared appliance client.
///
/// # Examples
///
/// ```no_run
/// use autelis_nodeserver::config::NodeServerConfig;
/// use autelis_nodeserver::manager::NodeServer;
///
/// #[tokio::main]
/// async fn main() -> autelis_nodeserver::Result<()> {
///     let config = NodeServerConfig::new("192.168.1.60", "admin", "admin");
///     let server = NodeServer::connect(config)?;
///     let mut events = server.subscribe();
///
///     tokio::select! {
///         () = server.run(async { let _ = tokio::signal::ctrl_c().await; }) => {}
///         _ = async {
///             while let Ok(event) = events.recv().await {
///                 println!("{event:?}");
///             }
///         } => {}
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct NodeServer<A> {
    config: NodeServerConfig,
    registry: Arc<NodeRegistry>,
    events: EventBus,
    sync: SyncLoop<A>,
    dispatcher: CommandDispatcher<A>,
}

impl NodeServer<AutelisClient> {
    /// Creates a node server talking HTTP to the configured appliance.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connectivity` if the host is empty or the HTTP client
    /// cannot be created.
    pub fn connect(config: NodeServerConfig) -> Result<Self> {
        let client = config.http_config().into_client()?;
        Ok(Self::new(config, client))
    }
}

impl<A: Appliance> NodeServer<A> {
    /// Creates a node server over any appliance client.
    #[must_use]
    pub fn new(config: NodeServerConfig, appliance: A) -> Self {
        let appliance = Arc::new(appliance);
        let registry = Arc::new(NodeRegistry::new());
        let events = EventBus::new();
        let sync = SyncLoop::new(
            Arc::clone(&appliance),
            Arc::clone(&registry),
            events.clone(),
            config.ignore_solar(),
        );
        let dispatcher = CommandDispatcher::new(
            appliance,
            Arc::clone(&registry),
            sync.clone(),
            events.clone(),
            config.refresh_after_command(),
        );

        Self {
            config,
            registry,
            events,
            sync,
            dispatcher,
        }
    }

    /// Subscribes to node events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    /// Returns the node registry.
    #[must_use]
    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &NodeServerConfig {
        &self.config
    }

    /// Returns the poll counters.
    #[must_use]
    pub fn stats(&self) -> &PollStats {
        self.sync.stats()
    }

    /// Returns the sync loop.
    #[must_use]
    pub fn sync_loop(&self) -> &SyncLoop<A> {
        &self.sync
    }

    /// Handles a command from the controller.
    ///
    /// # Errors
    ///
    /// See [`CommandDispatcher::handle`].
    pub async fn handle_command(
        &self,
        address: &str,
        command: &str,
        value: Option<&str>,
    ) -> Result<CommandAck> {
        self.dispatcher.handle(address, command, value).await
    }

    /// Polls the appliance immediately.
    ///
    /// # Errors
    ///
    /// See [`SyncLoop::poll_once`].
    pub async fn poll_now(&self) -> Result<PollOutcome> {
        self.sync.poll_once().await
    }

    /// Polls on the configured interval until `shutdown` completes.
    ///
    /// The first poll runs immediately. Ticks missed while a slow poll is
    /// outstanding are skipped rather than bunched up.
    pub async fn run<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let interval = self.config.polling_interval();
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        tracing::info!(
            host = self.config.host(),
            interval_secs = interval.as_secs(),
            "Node server started"
        );

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Ok(PollOutcome::Skipped) = self.sync.poll_once().await {
                        tracing::debug!("Tick skipped, poll in flight");
                    }
                }
            }
        }

        tracing::info!(
            successful = self.stats().successful(),
            failed = self.stats().failed(),
            skipped = self.stats().skipped(),
            "Node server stopped"
        );
    }
}
