// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Periodic status polling.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::Result;
use crate::event::{EventBus, NodeEvent};
use crate::protocol::Appliance;
use crate::state::{NodeRegistry, Reconciliation};

/// Whether a poll is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Waiting for the next tick.
    Idle,
    /// A status request is outstanding.
    Polling,
}

/// Result of one poll request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Another poll was in flight; nothing was sent.
    Skipped,
    /// The snapshot was fetched and applied.
    Completed {
        /// Number of nodes created.
        added: usize,
        /// Number of value updates pushed.
        changed: usize,
    },
}

/// Poll counters kept for diagnostics.
#[derive(Debug, Default)]
pub struct PollStats {
    successful: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

impl PollStats {
    /// Returns the number of polls that fetched and applied a snapshot.
    #[must_use]
    pub fn successful(&self) -> u64 {
        self.successful.load(Ordering::Relaxed)
    }

    /// Returns the number of polls that ended in an error.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Returns the number of polls dropped because one was in flight.
    #[must_use]
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }
}

/// Clears the in-flight flag when the poll ends, including on cancellation,
/// and wakes everyone waiting for the loop to become idle.
struct InFlight<'a> {
    flag: &'a AtomicBool,
    idle: &'a Notify,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, idle: &'a Notify) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, idle })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
        self.idle.notify_waiters();
    }
}

#[derive(Debug)]
struct Shared<A> {
    appliance: Arc<A>,
    registry: Arc<NodeRegistry>,
    events: EventBus,
    ignore_solar: bool,
    in_flight: AtomicBool,
    idle: Notify,
    /// Reachability after the last finished poll, `None` before the first.
    connected: Mutex<Option<bool>>,
    stats: PollStats,
}

/// Fetches status snapshots and applies them to the node registry.
///
/// At most one poll is in flight at a time: a poll requested while another
/// is outstanding returns [`PollOutcome::Skipped`] without contacting the
/// appliance, while [`poll_fresh`](Self::poll_fresh) waits and polls again.
/// Failures are logged and counted; node values stay as they were and the
/// next tick simply tries again.
///
/// Cloning is cheap and clones share the in-flight flag and counters.
#[derive(Debug)]
pub struct SyncLoop<A> {
    shared: Arc<Shared<A>>,
}

impl<A: Appliance> SyncLoop<A> {
    /// Creates a sync loop over a shared appliance client and registry.
    #[must_use]
    pub fn new(
        appliance: Arc<A>,
        registry: Arc<NodeRegistry>,
        events: EventBus,
        ignore_solar: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                appliance,
                registry,
                events,
                ignore_solar,
                in_flight: AtomicBool::new(false),
                idle: Notify::new(),
                connected: Mutex::new(None),
                stats: PollStats::default(),
            }),
        }
    }

    /// Polls the appliance once and publishes the resulting events.
    ///
    /// # Errors
    ///
    /// Returns the appliance or parse error of a failed poll. The registry is
    /// not modified in that case.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let shared = &*self.shared;
        let Some(_in_flight) = InFlight::acquire(&shared.in_flight, &shared.idle) else {
            shared.stats.skipped.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Poll already in flight, skipping");
            return Ok(PollOutcome::Skipped);
        };

        match self.fetch_and_reconcile().await {
            Ok(reconciliation) => {
                shared.stats.successful.fetch_add(1, Ordering::Relaxed);
                self.set_connected(true, None);

                let outcome = PollOutcome::Completed {
                    added: reconciliation.added.len(),
                    changed: reconciliation.changed.len(),
                };
                self.publish(reconciliation);
                Ok(outcome)
            }
            Err(e) => {
                shared.stats.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(error = %e, "Status poll failed, node values left stale");
                self.set_connected(false, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Polls once with a request issued after this call.
    ///
    /// If a poll is in flight, waits for it to finish and then polls again,
    /// since the in-flight request may predate whatever the caller just
    /// changed on the appliance.
    ///
    /// # Errors
    ///
    /// Returns the error of the fresh poll, as [`poll_once`](Self::poll_once).
    pub async fn poll_fresh(&self) -> Result<PollOutcome> {
        loop {
            // Registered before the check so a poll ending in between still wakes us.
            let idle = self.shared.idle.notified();
            match self.poll_once().await? {
                PollOutcome::Skipped => idle.await,
                completed @ PollOutcome::Completed { .. } => return Ok(completed),
            }
        }
    }

    async fn fetch_and_reconcile(&self) -> Result<Reconciliation> {
        let mut status = self.shared.appliance.fetch_status().await?;
        if self.shared.ignore_solar {
            status = status.without_solar();
        }
        Ok(self.shared.registry.reconcile(&status)?)
    }

    fn publish(&self, reconciliation: Reconciliation) {
        let events = &self.shared.events;

        if let Some((from, to)) = reconciliation.unit_change {
            tracing::info!(from = from.as_str(), to = to.as_str(), "Temperature unit changed");
            events.publish(NodeEvent::TempUnitChanged { from, to });
        }
        for node in reconciliation.added {
            tracing::info!(address = %node.address, kind = ?node.kind, value = %node.value, "Adding node");
            events.publish(NodeEvent::NodeAdded { node });
        }
        for update in reconciliation.changed {
            tracing::debug!(
                address = %update.address,
                previous = %update.previous,
                value = %update.value,
                "Node value changed"
            );
            events.publish(NodeEvent::ValueChanged { update });
        }
    }

    fn set_connected(&self, connected: bool, error: Option<String>) {
        let previous = self.shared.connected.lock().replace(connected);
        if previous == Some(connected) {
            return;
        }
        if connected {
            tracing::info!("Appliance reachable");
        }
        self.shared
            .events
            .publish(NodeEvent::ConnectionChanged { connected, error });
    }
}

impl<A> SyncLoop<A> {
    /// Returns whether a poll is in flight.
    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.shared.in_flight.load(Ordering::Acquire) {
            SyncState::Polling
        } else {
            SyncState::Idle
        }
    }

    /// Returns the poll counters.
    #[must_use]
    pub fn stats(&self) -> &PollStats {
        &self.shared.stats
    }

    /// Returns reachability after the last finished poll, `None` before the
    /// first one.
    #[must_use]
    pub fn is_connected(&self) -> Option<bool> {
        *self.shared.connected.lock()
    }
}

impl<A> Clone for SyncLoop<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}
