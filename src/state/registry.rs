// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of controller nodes.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::ParseError;
use crate::response::ApplianceStatus;
use crate::types::{HeatingState, NodeAddress, TempUnit};

use super::{NodeKind, NodeRecord, NodeUpdate};

const HEAT_STATUS_FIELD: &str = "htstatus";

/// Result of diffing one status snapshot against the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Nodes created by this snapshot.
    pub added: Vec<NodeRecord>,
    /// Existing nodes whose value changed.
    pub changed: Vec<NodeUpdate>,
    /// Temperature unit toggle detected in this snapshot, as `(from, to)`.
    pub unit_change: Option<(TempUnit, TempUnit)>,
}

impl Reconciliation {
    /// Returns true if nothing needs to be pushed to the controller.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.unit_change.is_none()
    }
}

#[derive(Debug, Default)]
struct RegistryInner {
    nodes: BTreeMap<NodeAddress, NodeRecord>,
    temp_unit: Option<TempUnit>,
}

impl RegistryInner {
    fn ensure_node(
        &mut self,
        field: &str,
        kind: NodeKind,
        value: &str,
        temp_unit: Option<TempUnit>,
    ) -> Option<(&mut NodeRecord, bool)> {
        let address = NodeAddress::from_field(field);
        if address.is_empty() || value.is_empty() {
            return None;
        }

        let mut created = false;
        let record = self.nodes.entry(address.clone()).or_insert_with(|| {
            created = true;
            NodeRecord {
                address,
                field: field.to_string(),
                kind,
                value: value.to_string(),
                temp_unit,
            }
        });

        if record.field != field {
            tracing::warn!(
                address = %record.address,
                existing = %record.field,
                field,
                "Field maps to an address already owned by another field, ignoring"
            );
            return None;
        }

        Some((record, created))
    }
}

/// Registry of controller nodes, one per reporting field.
///
/// Nodes are created on the first snapshot that carries a non-empty value
/// for their field and are never renamed or removed. The registry is the
/// state shared between the sync loop, which is its only writer, and the
/// command dispatcher, which looks addresses up.
///
/// # Thread Safety
///
/// Interior mutability via `parking_lot::RwLock`; the lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    inner: RwLock<RegistryInner>,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diffs a status snapshot against the registry and applies it.
    ///
    /// Values are compared as reported. When the snapshot's temperature unit
    /// differs from the unit a temperature node was last updated in, that
    /// node's old value is converted into the new unit and compared within
    /// rounding tolerance instead; a match is adopted silently so that
    /// toggling the display unit does not look like a temperature change.
    ///
    /// Fields without a value leave their node untouched.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if the temperature unit indicator
    /// is not recognized. The registry is left unchanged in that case.
    pub fn reconcile(&self, status: &ApplianceStatus) -> Result<Reconciliation, ParseError> {
        let reported_unit = status.temp_unit()?;
        let mut inner = self.inner.write();
        let mut result = Reconciliation::default();

        let current_unit = reported_unit.or(inner.temp_unit);
        if let (Some(from), Some(to)) = (inner.temp_unit, reported_unit) {
            if from != to {
                result.unit_change = Some((from, to));
            }
        }
        inner.temp_unit = current_unit;

        for (field, status_field) in status.fields() {
            let Some(kind) = NodeKind::classify(status_field.section, field) else {
                continue;
            };
            let unit = if kind.is_temperature() {
                current_unit
            } else {
                None
            };
            let value = status_field.value.trim();

            let Some((record, created)) = inner.ensure_node(field, kind, value, unit) else {
                continue;
            };
            if created {
                result.added.push(record.clone());
                continue;
            }
            // A first unit report for a node created without one is adopted.
            let unit_known = record.temp_unit == unit || record.temp_unit.is_none();
            if unit_known && same_value(&record.value, value) {
                record.value = value.to_string();
                record.temp_unit = unit;
                continue;
            }

            if renormalized_match(record, value, unit) {
                tracing::debug!(
                    address = %record.address,
                    old = %record.value,
                    new = value,
                    "Temperature unchanged across unit toggle"
                );
            } else {
                result.changed.push(NodeUpdate {
                    address: record.address.clone(),
                    kind: record.kind,
                    previous: record.value.clone(),
                    value: value.to_string(),
                    temp_unit: unit,
                });
            }
            record.value = value.to_string();
            record.temp_unit = unit;
        }

        Ok(result)
    }

    /// Returns the node for `field`, creating it when `value` is non-empty.
    ///
    /// Returns `None` if the node does not exist and `value` is empty, or if
    /// the field name yields no usable address.
    pub fn ensure_node(&self, field: &str, kind: NodeKind, value: &str) -> Option<NodeRecord> {
        let mut inner = self.inner.write();
        let unit = if kind.is_temperature() {
            inner.temp_unit
        } else {
            None
        };
        let address = NodeAddress::from_field(field);
        if let Some(existing) = inner.nodes.get(&address) {
            return Some(existing.clone());
        }
        inner
            .ensure_node(field, kind, value.trim(), unit)
            .map(|(record, _)| record.clone())
    }

    /// Returns a copy of the node at `address`.
    #[must_use]
    pub fn get(&self, address: &NodeAddress) -> Option<NodeRecord> {
        self.inner.read().nodes.get(address).cloned()
    }

    /// Returns true if a node exists at `address`.
    #[must_use]
    pub fn contains(&self, address: &NodeAddress) -> bool {
        self.inner.read().nodes.contains_key(address)
    }

    /// Returns copies of all nodes in address order.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeRecord> {
        self.inner.read().nodes.values().cloned().collect()
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Returns true if no node has been created yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().nodes.is_empty()
    }

    /// Returns the heating state of a heat node, decoded from the last
    /// reported `htstatus`.
    ///
    /// Returns `None` for other kinds and unknown addresses.
    #[must_use]
    pub fn heating_state(&self, address: &NodeAddress) -> Option<HeatingState> {
        let inner = self.inner.read();
        let spa = match inner.nodes.get(address)?.kind {
            NodeKind::PoolHeat => false,
            NodeKind::SpaHeat => true,
            _ => return None,
        };
        let bits = inner
            .nodes
            .get(&NodeAddress::from_field(HEAT_STATUS_FIELD))
            .and_then(|status| status.value.parse::<u8>().ok())
            .unwrap_or(0);
        Some(HeatingState::from_status_bits(bits, spa))
    }

    /// Returns the temperature unit of the last snapshot that reported one.
    #[must_use]
    pub fn temp_unit(&self) -> Option<TempUnit> {
        self.inner.read().temp_unit
    }
}

/// Compares two raw values, numerically when both parse as numbers.
#[allow(clippy::float_cmp)]
fn same_value(old: &str, new: &str) -> bool {
    if old == new {
        return true;
    }
    match (old.parse::<f64>(), new.parse::<f64>()) {
        (Ok(old), Ok(new)) => old == new,
        _ => false,
    }
}

fn renormalized_match(record: &NodeRecord, value: &str, unit: Option<TempUnit>) -> bool {
    let (Some(old_unit), Some(new_unit)) = (record.temp_unit, unit) else {
        return false;
    };
    if !record.kind.is_temperature() || old_unit == new_unit {
        return false;
    }
    match (record.numeric_value(), value.parse::<f64>()) {
        (Some(old), Ok(new)) => old_unit.same_reading(old, new_unit, new),
        _ => false,
    }
}
