// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Per-tab node positions.
//!
//! Positions are strictly partitioned by tab key: a coordinate recorded on
//! the company tab is never visible on a business tab and vice versa. Nodes
//! without a stored position get a deterministic default so a fresh tab lays
//! out the same way every time.

use std::collections::BTreeMap;

use crate::model::{NodeId, Position, TabKey};

const DEFAULT_GRID_COLUMNS: usize = 8;
const DEFAULT_CELL_WIDTH: f64 = 180.0;
const DEFAULT_CELL_HEIGHT: f64 = 120.0;

/// Default placement for the node at `index` in a restore request: a
/// staggered grid filled row by row. The index counts the whole request,
/// stored hits included, so a node's fallback slot does not shift as its
/// neighbours get placed.
pub fn default_position(index: usize) -> Position {
    let column = index % DEFAULT_GRID_COLUMNS;
    let row = index / DEFAULT_GRID_COLUMNS;
    Position::new(
        column as f64 * DEFAULT_CELL_WIDTH,
        row as f64 * DEFAULT_CELL_HEIGHT,
    )
}

/// Per-tab coordinate store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PositionStore {
    tabs: BTreeMap<TabKey, BTreeMap<NodeId, Position>>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a node's position on one tab.
    pub fn record_position(&mut self, tab_key: &TabKey, node_id: NodeId, position: Position) {
        self.tabs
            .entry(tab_key.clone())
            .or_default()
            .insert(node_id, position);
    }

    pub fn position(&self, tab_key: &TabKey, node_id: &NodeId) -> Option<Position> {
        self.tabs.get(tab_key)?.get(node_id).copied()
    }

    pub fn remove_position(&mut self, tab_key: &TabKey, node_id: &NodeId) -> Option<Position> {
        let positions = self.tabs.get_mut(tab_key)?;
        let removed = positions.remove(node_id);
        if positions.is_empty() {
            self.tabs.remove(tab_key);
        }
        removed
    }

    /// Positions for `node_ids` on one tab.
    ///
    /// Misses get the computed default for their index in the request; they
    /// are not recorded, so a later stored position still wins.
    pub fn restore_positions(
        &self,
        tab_key: &TabKey,
        node_ids: &[NodeId],
    ) -> BTreeMap<NodeId, Position> {
        let stored = self.tabs.get(tab_key);
        node_ids
            .iter()
            .enumerate()
            .map(|(index, node_id)| {
                let position = stored
                    .and_then(|positions| positions.get(node_id).copied())
                    .unwrap_or_else(|| default_position(index));
                (node_id.clone(), position)
            })
            .collect()
    }

    /// Bulk import, used when activating a tab from persisted records.
    pub fn import_records(
        &mut self,
        tab_key: &TabKey,
        records: impl IntoIterator<Item = (NodeId, Position)>,
    ) {
        let positions = self.tabs.entry(tab_key.clone()).or_default();
        for (node_id, position) in records {
            positions.insert(node_id, position);
        }
    }

    /// Everything stored for one tab, for persistence export.
    pub fn records_for_tab<'a>(
        &'a self,
        tab_key: &TabKey,
    ) -> impl Iterator<Item = (&'a NodeId, Position)> {
        self.tabs
            .get(tab_key)
            .into_iter()
            .flatten()
            .map(|(node_id, position)| (node_id, *position))
    }
}
