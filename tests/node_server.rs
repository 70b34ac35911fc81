// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sync loop and command dispatch tests against a scripted appliance.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use autelis_nodeserver::command::Command;
use autelis_nodeserver::config::NodeServerConfig;
use autelis_nodeserver::manager::{NodeServer, PollOutcome, SyncState};
use autelis_nodeserver::protocol::Appliance;
use autelis_nodeserver::response::{ApplianceStatus, Section};
use autelis_nodeserver::types::{NodeAddress, TempUnit};
use autelis_nodeserver::{Error, NodeAction, NodeEvent, ProtocolError, Result};
use tokio::sync::broadcast;

// ============================================================================
// Scripted appliance
// ============================================================================

#[derive(Default)]
struct Script {
    responses: Mutex<VecDeque<Result<ApplianceStatus>>>,
    last: Mutex<Option<ApplianceStatus>>,
    commands: Mutex<Vec<String>>,
    fetches: AtomicUsize,
    fetch_delay: Mutex<Duration>,
}

/// Appliance that answers polls from a queue and repeats the last good
/// snapshot once the queue is empty.
#[derive(Clone, Default)]
struct FakeAppliance(Arc<Script>);

impl FakeAppliance {
    fn respond(&self, response: Result<ApplianceStatus>) {
        self.0.responses.lock().unwrap().push_back(response);
    }

    fn with_delay(self, delay: Duration) -> Self {
        *self.0.fetch_delay.lock().unwrap() = delay;
        self
    }

    fn fetches(&self) -> usize {
        self.0.fetches.load(Ordering::SeqCst)
    }

    fn commands(&self) -> Vec<String> {
        self.0.commands.lock().unwrap().clone()
    }
}

impl Appliance for FakeAppliance {
    async fn fetch_status(&self) -> Result<ApplianceStatus> {
        self.0.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.0.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let next = self.0.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(status)) => {
                *self.0.last.lock().unwrap() = Some(status.clone());
                Ok(status)
            }
            Some(Err(e)) => Err(e),
            None => self
                .0
                .last
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ProtocolError::ConnectionFailed("no status scripted".into()).into()),
        }
    }

    async fn send_command<C: Command + Sync>(&self, command: &C) -> Result<()> {
        self.0.commands.lock().unwrap().push(command.to_query());
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn snapshot(circuit1: &str, pooltemp: &str, unit: &str) -> ApplianceStatus {
    let mut status = ApplianceStatus::new();
    status.insert(Section::Equipment, "circuit1", circuit1);
    status.insert(Section::Equipment, "feature1", "0");
    status.insert(Section::Temp, "poolht", "1");
    status.insert(Section::Temp, "poolsp", "82");
    status.insert(Section::Temp, "pooltemp", pooltemp);
    status.insert(Section::Temp, "tempunits", unit);
    status
}

fn config() -> NodeServerConfig {
    NodeServerConfig::new("192.168.1.60", "admin", "admin")
}

fn server_with(appliance: &FakeAppliance, config: NodeServerConfig) -> NodeServer<FakeAppliance> {
    NodeServer::new(config, appliance.clone())
}

fn drain(rx: &mut broadcast::Receiver<NodeEvent>) -> Vec<NodeEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

fn timeout() -> Error {
    ProtocolError::Timeout(3050).into()
}

// ============================================================================
// Sync loop
// ============================================================================

mod sync {
    use super::*;

    #[tokio::test]
    async fn equal_values_push_nothing() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(&appliance, config());

        server.poll_now().await.unwrap();
        let mut events = server.subscribe();
        let outcome = server.poll_now().await.unwrap();

        assert_eq!(outcome, PollOutcome::Completed { added: 0, changed: 0 });
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn one_changed_field_pushes_one_update() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        appliance.respond(Ok(snapshot("0", "78", "F")));
        let server = server_with(&appliance, config());

        server.poll_now().await.unwrap();
        let mut events = server.subscribe();
        server.poll_now().await.unwrap();

        let events = drain(&mut events);
        assert_eq!(events.len(), 1);
        match &events[0] {
            NodeEvent::ValueChanged { update } => {
                assert_eq!(update.address.as_str(), "circuit1");
                assert_eq!(update.previous, "1");
                assert_eq!(update.value, "0");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_poll_adds_every_reported_field() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(&appliance, config());
        let mut events = server.subscribe();

        server.poll_now().await.unwrap();

        let added: Vec<_> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                NodeEvent::NodeAdded { node } => Some(node.address.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(
            added,
            ["circuit1", "feature1", "poolht", "poolsp", "pooltemp"]
        );
    }

    #[tokio::test]
    async fn unit_toggle_alone_pushes_no_update() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let mut celsius = snapshot("1", "26", "C");
        celsius.insert(Section::Temp, "poolsp", "28");
        appliance.respond(Ok(celsius));
        let server = server_with(&appliance, config());

        server.poll_now().await.unwrap();
        let mut events = server.subscribe();
        server.poll_now().await.unwrap();

        let events = drain(&mut events);
        assert_eq!(
            events,
            vec![NodeEvent::TempUnitChanged {
                from: TempUnit::Fahrenheit,
                to: TempUnit::Celsius,
            }]
        );
        let pool = server.registry().get(&NodeAddress::from_field("pooltemp")).unwrap();
        assert_eq!(pool.value, "26");
        assert_eq!(pool.uom(), Some(4));
    }

    #[tokio::test]
    async fn timeout_then_unchanged_poll_pushes_nothing() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        appliance.respond(Err(timeout()));
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(&appliance, config());

        server.poll_now().await.unwrap();
        let mut events = server.subscribe();

        let err = server.poll_now().await.unwrap_err();
        assert!(err.is_connectivity());
        server.poll_now().await.unwrap();

        assert_eq!(server.stats().failed(), 1);
        assert_eq!(server.stats().successful(), 2);
        let events = drain(&mut events);
        assert!(events.iter().all(NodeEvent::is_connection));
        assert_eq!(
            events,
            vec![
                NodeEvent::disconnected_with_error(err.to_string()),
                NodeEvent::connected(),
            ]
        );
    }

    #[tokio::test]
    async fn values_stay_stale_while_unreachable() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        appliance.respond(Err(timeout()));
        let server = server_with(&appliance, config());

        server.poll_now().await.unwrap();
        assert!(server.poll_now().await.is_err());

        let circuit = server.registry().get(&NodeAddress::from_field("circuit1")).unwrap();
        assert_eq!(circuit.value, "1");
        assert_eq!(server.sync_loop().is_connected(), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_poll_is_skipped() {
        let appliance = FakeAppliance::default().with_delay(Duration::from_secs(1));
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(&appliance, config());
        let sync = server.sync_loop();

        let (first, second, state) = tokio::join!(sync.poll_once(), sync.poll_once(), async {
            sync.state()
        });

        assert!(matches!(first.unwrap(), PollOutcome::Completed { .. }));
        assert_eq!(second.unwrap(), PollOutcome::Skipped);
        assert_eq!(state, SyncState::Polling);
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(appliance.fetches(), 1);
        assert_eq!(server.stats().skipped(), 1);
    }

    #[tokio::test]
    async fn ignore_solar_never_creates_solar_nodes() {
        let appliance = FakeAppliance::default();
        let mut status = snapshot("1", "78", "F");
        status.insert(Section::Temp, "soltemp", "95");
        status.insert(Section::Temp, "solarht", "1");
        appliance.respond(Ok(status));
        let server = server_with(&appliance, config().with_ignore_solar(true));

        server.poll_now().await.unwrap();

        assert!(!server.registry().contains(&NodeAddress::from_field("soltemp")));
        assert!(!server.registry().contains(&NodeAddress::from_field("solarht")));
    }
}

// ============================================================================
// Command dispatch
// ============================================================================

mod dispatch {
    use super::*;

    async fn polled_server(appliance: &FakeAppliance) -> NodeServer<FakeAppliance> {
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(appliance, config());
        server.poll_now().await.unwrap();
        server
    }

    #[tokio::test]
    async fn on_and_off_send_power_requests() {
        let appliance = FakeAppliance::default();
        let server = polled_server(&appliance).await;

        let ack = server.handle_command("circuit1", "DOF", None).await.unwrap();
        server.handle_command("feature1", "DON", None).await.unwrap();

        assert_eq!(ack.action, NodeAction::Off);
        assert!(ack.refreshed);
        assert_eq!(
            appliance.commands(),
            ["name=circuit1&value=0", "name=feature1&value=1"]
        );
        // Initial poll plus one confirming poll per command.
        assert_eq!(appliance.fetches(), 3);
    }

    #[tokio::test]
    async fn heat_commands_target_heat_and_setpoint_elements() {
        let appliance = FakeAppliance::default();
        let server = polled_server(&appliance).await;

        server
            .handle_command("poolht", "SET_SPH", Some("85"))
            .await
            .unwrap();
        server
            .handle_command("poolht", "SET_MODE", Some("1"))
            .await
            .unwrap();
        server
            .handle_command("poolht", "SET_MODE", Some("7"))
            .await
            .unwrap();

        assert_eq!(
            appliance.commands(),
            [
                "name=poolsp&temp=85",
                "name=poolht&hval=1",
                "name=poolht&hval=0"
            ]
        );
    }

    #[tokio::test]
    async fn unsupported_action_sends_nothing() {
        let appliance = FakeAppliance::default();
        let server = polled_server(&appliance).await;

        for (command, value) in [("BRT", None), ("DFON", None), ("DON", Some("50"))] {
            let err = server
                .handle_command("circuit1", command, value)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::UnsupportedAction { .. }), "{command}");
        }

        assert!(appliance.commands().is_empty());
        assert_eq!(appliance.fetches(), 1);
    }

    #[tokio::test]
    async fn action_must_fit_node_kind() {
        let appliance = FakeAppliance::default();
        let server = polled_server(&appliance).await;

        let err = server
            .handle_command("pooltemp", "DON", None)
            .await
            .unwrap_err();
        assert!(err.is_rejected_command());
        let err = server
            .handle_command("circuit1", "SET_SPH", Some("80"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedAction { .. }));

        assert!(appliance.commands().is_empty());
    }

    #[tokio::test]
    async fn unknown_address_is_rejected() {
        let appliance = FakeAppliance::default();
        let server = polled_server(&appliance).await;

        let err = server
            .handle_command("circuit9", "DON", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnknownNode(address) if address.as_str() == "circuit9"));
        assert!(appliance.commands().is_empty());
    }

    #[tokio::test]
    async fn unsupported_action_wins_over_unknown_address() {
        let appliance = FakeAppliance::default();
        let server = polled_server(&appliance).await;

        let err = server.handle_command("nowhere", "BRT", None).await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedAction { .. }));
    }

    #[tokio::test]
    async fn query_reports_current_value() {
        let appliance = FakeAppliance::default();
        let server = polled_server(&appliance).await;
        let mut events = server.subscribe();

        let ack = server.handle_command("pooltemp", "QUERY", None).await.unwrap();

        assert!(ack.refreshed);
        assert!(appliance.commands().is_empty());
        match drain(&mut events).as_slice() {
            [NodeEvent::Reported { node }] => {
                assert_eq!(node.address.as_str(), "pooltemp");
                assert_eq!(node.value, "78");
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn confirming_poll_waits_for_scheduled_poll() {
        let appliance = FakeAppliance::default().with_delay(Duration::from_secs(1));
        let server = polled_server(&appliance).await;
        let sync = server.sync_loop();

        let (scheduled, ack) = tokio::join!(
            sync.poll_once(),
            server.handle_command("circuit1", "DOF", None)
        );

        assert!(matches!(scheduled.unwrap(), PollOutcome::Completed { .. }));
        assert!(ack.unwrap().refreshed);
        // Initial poll, the scheduled one, then a fresh one after the command.
        assert_eq!(appliance.fetches(), 3);
        assert_eq!(server.stats().skipped(), 1);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[tokio::test]
    async fn refresh_can_be_disabled() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(&appliance, config().with_refresh_after_command(false));
        server.poll_now().await.unwrap();

        let ack = server.handle_command("circuit1", "DOF", None).await.unwrap();

        assert!(!ack.refreshed);
        assert_eq!(appliance.fetches(), 1);
        // The registry only changes when a poll confirms the command.
        let circuit = server.registry().get(&NodeAddress::from_field("circuit1")).unwrap();
        assert_eq!(circuit.value, "1");
    }
}

// ============================================================================
// Run loop
// ============================================================================

mod run {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn polls_on_interval_until_shutdown() {
        let appliance = FakeAppliance::default();
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(&appliance, config());

        server
            .run(tokio::time::sleep(Duration::from_secs(65)))
            .await;

        // Ticks at 0, 20, 40 and 60 seconds.
        assert_eq!(appliance.fetches(), 4);
        assert_eq!(server.stats().successful(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_polls_do_not_stop_the_loop() {
        let appliance = FakeAppliance::default();
        appliance.respond(Err(timeout()));
        appliance.respond(Err(timeout()));
        appliance.respond(Ok(snapshot("1", "78", "F")));
        let server = server_with(
            &appliance,
            config().with_polling_interval(Duration::from_secs(5)),
        );

        server
            .run(tokio::time::sleep(Duration::from_secs(12)))
            .await;

        assert_eq!(server.stats().failed(), 2);
        assert_eq!(server.stats().successful(), 1);
        assert_eq!(server.registry().len(), 5);
    }
}
