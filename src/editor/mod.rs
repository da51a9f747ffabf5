// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! The surface the editor/UI collaborator talks to.
//!
//! `Editor` owns the in-memory graph, the scope propagator, the position
//! store, and a boxed persistence collaborator. Every edge mutation walks the
//! same state machine: validate → apply in memory → propagate → persist the
//! edge → persist the scope batch. A failure at any persistence step rolls
//! the in-memory state back exactly and issues best-effort compensating
//! writes, so a rejected mutation never leaves a ghost edge or a subtree with
//! mixed scope values.
//!
//! Mutations take `&mut self`; that is the single-writer model. The consuming
//! UI must not start a second gesture before the in-flight one resolves, and
//! the borrow checker holds it to that here.

use std::collections::BTreeMap;
use std::fmt;

use crate::layout::PositionStore;
use crate::model::{EdgeId, GraphEdge, NodeId, NodeRef, OrgGraph, Position, TabKey, ViewContext};
use crate::ops::validate::ConnectionError;
use crate::ops::{self, EdgeApplied, MutationError};
use crate::query::view::{visible_graph, VisibleGraph};
use crate::scope::{ScopeAssignment, ScopePropagator};
use crate::store::{EdgeRecord, Persistence, PersistenceError, ScopeWriteError};

pub struct Editor {
    graph: OrgGraph,
    propagator: ScopePropagator,
    positions: PositionStore,
    store: Box<dyn Persistence>,
    edge_seq: u64,
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("nodes", &self.graph.nodes().len())
            .field("edges", &self.graph.edges().len())
            .finish_non_exhaustive()
    }
}

impl Editor {
    /// Loads the full graph snapshot from `store` and starts a session.
    pub fn open(mut store: Box<dyn Persistence>) -> Result<Self, EditError> {
        let snapshot = store.load_graph(None).map_err(EditError::Persistence)?;

        let mut graph = OrgGraph::new();
        for node in snapshot.nodes {
            graph
                .insert_node(node)
                .map_err(|err| EditError::Persistence(PersistenceError::Backend {
                    message: format!("snapshot contains a duplicate node: {err}"),
                }))?;
        }
        // Snapshot edges are trusted; they were validated when created.
        for (edge_id, edge) in snapshot.edges {
            graph.insert_edge_unchecked(edge_id, edge);
        }

        Ok(Self {
            graph,
            propagator: ScopePropagator::new(),
            positions: PositionStore::new(),
            store,
            edge_seq: 0,
        })
    }

    pub fn graph(&self) -> &OrgGraph {
        &self.graph
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    /// Connects `source → target`, cascading and persisting scope.
    pub fn propose_edge(
        &mut self,
        source_id: NodeId,
        target_id: NodeId,
    ) -> Result<EdgeId, EditError> {
        let edge_id = self.next_edge_id();
        let applied = ops::apply_edge_add(
            &mut self.graph,
            &mut self.propagator,
            edge_id,
            source_id,
            target_id,
        )
        .map_err(EditError::from_mutation)?;

        let record = match self.edge_record(&applied.edge_id) {
            Ok(record) => record,
            Err(err) => {
                self.rollback_add(&applied);
                return Err(err);
            }
        };
        if let Err(source) = self.store.create_edge(&record) {
            self.rollback_add(&applied);
            return Err(EditError::Persistence(source));
        }

        if let Err(err) = self.persist_scope_batch(&applied.scope_changes) {
            self.rollback_add(&applied);
            self.compensate_remove_edge(&applied.edge_id);
            if let EditError::PartialPropagation { written, .. } = err {
                self.compensate_scope_batch(&applied.scope_changes, written);
            }
            return Err(err);
        }

        log::debug!(
            "edge {} applied ({} scope writes)",
            applied.edge_id,
            applied.scope_changes.len()
        );
        Ok(applied.edge_id)
    }

    /// Disconnects an edge. Scope keeps its last known value.
    pub fn remove_edge(&mut self, edge_id: &EdgeId) -> Result<(), EditError> {
        let removed = ops::apply_edge_remove(&mut self.graph, &mut self.propagator, edge_id)
            .map_err(EditError::from_mutation)?;

        if let Err(source) = self.store.remove_edge(edge_id) {
            self.graph
                .insert_edge_unchecked(edge_id.clone(), removed.edge);
            return Err(EditError::Persistence(source));
        }

        log::debug!("edge {edge_id} removed");
        Ok(())
    }

    /// Rewires an existing edge onto new endpoints, atomically.
    ///
    /// Any failure after the old edge was lifted (validation, persistence,
    /// scope writes) restores the old edge in memory and, where persistence
    /// already acted, compensates so no edge is ever lost.
    pub fn reconnect_edge(
        &mut self,
        edge_id: &EdgeId,
        new_source_id: NodeId,
        new_target_id: NodeId,
    ) -> Result<(), EditError> {
        let Some(old_edge) = self.graph.edge(edge_id).cloned() else {
            return Err(EditError::UnknownEdge {
                edge_id: edge_id.clone(),
            });
        };
        let old_record = self.edge_record(edge_id)?;

        let applied = ops::reconnect(
            &mut self.graph,
            &mut self.propagator,
            edge_id,
            new_source_id,
            new_target_id,
        )
        .map_err(EditError::from_mutation)?;
        let new_record = match self.edge_record(edge_id) {
            Ok(record) => record,
            Err(err) => {
                self.rollback_reconnect(&applied, &old_edge);
                return Err(err);
            }
        };

        if let Err(source) = self.store.remove_edge(edge_id) {
            self.rollback_reconnect(&applied, &old_edge);
            return Err(EditError::Persistence(source));
        }

        if let Err(source) = self.store.create_edge(&new_record) {
            self.rollback_reconnect(&applied, &old_edge);
            self.compensate_create_edge(&old_record);
            return Err(EditError::Persistence(source));
        }

        if let Err(err) = self.persist_scope_batch(&applied.scope_changes) {
            self.rollback_reconnect(&applied, &old_edge);
            self.compensate_remove_edge(edge_id);
            self.compensate_create_edge(&old_record);
            if let EditError::PartialPropagation { written, .. } = err {
                self.compensate_scope_batch(&applied.scope_changes, written);
            }
            return Err(err);
        }

        log::debug!(
            "edge {edge_id} reconnected ({} scope writes)",
            applied.scope_changes.len()
        );
        Ok(())
    }

    /// The visible subset for the active tab. Pure; safe on every switch.
    pub fn get_visible_graph(&self, context: &ViewContext) -> VisibleGraph<'_> {
        visible_graph(&self.graph, context)
    }

    /// Loads the tab's persisted positions into the position store.
    pub fn activate_tab(&mut self, tab_key: &TabKey) -> Result<(), EditError> {
        let records = self
            .store
            .load_positions(tab_key)
            .map_err(EditError::Persistence)?;

        let mut decoded = Vec::with_capacity(records.len());
        for record in &records {
            let (_, node_id, position) = record.decode().map_err(EditError::Persistence)?;
            decoded.push((node_id, position));
        }
        self.positions.import_records(tab_key, decoded);
        Ok(())
    }

    /// Records a drag-stop coordinate for one tab and persists it.
    pub fn on_node_moved(
        &mut self,
        node_id: &NodeId,
        position: Position,
        tab_key: &TabKey,
    ) -> Result<(), EditError> {
        if !self.graph.contains_node(node_id) {
            return Err(EditError::UnknownNode {
                node_id: node_id.clone(),
            });
        }

        let prior = self.positions.position(tab_key, node_id);
        self.positions
            .record_position(tab_key, node_id.clone(), position);

        if let Err(source) = self.store.save_position(tab_key, node_id, position) {
            match prior {
                Some(prior) => self
                    .positions
                    .record_position(tab_key, node_id.clone(), prior),
                None => {
                    self.positions.remove_position(tab_key, node_id);
                }
            }
            return Err(EditError::Persistence(source));
        }
        Ok(())
    }

    /// Positions for the given nodes on one tab, with defaults for misses.
    pub fn restore_positions(
        &self,
        tab_key: &TabKey,
        node_ids: &[NodeId],
    ) -> BTreeMap<NodeId, Position> {
        self.positions.restore_positions(tab_key, node_ids)
    }

    fn next_edge_id(&mut self) -> EdgeId {
        loop {
            self.edge_seq += 1;
            let candidate = EdgeId::new(format!("e{}", self.edge_seq))
                .expect("generated edge id is a valid segment");
            if self.graph.edge(&candidate).is_none() {
                return candidate;
            }
        }
    }

    fn node_ref_of(&self, node_id: &NodeId) -> Result<NodeRef, EditError> {
        self.graph
            .node(node_id)
            .map(|node| node.node_ref())
            .ok_or_else(|| EditError::UnknownNode {
                node_id: node_id.clone(),
            })
    }

    fn edge_record(&self, edge_id: &EdgeId) -> Result<EdgeRecord, EditError> {
        let Some(edge) = self.graph.edge(edge_id) else {
            return Err(EditError::UnknownEdge {
                edge_id: edge_id.clone(),
            });
        };
        let source_ref = self.node_ref_of(edge.source_id())?;
        let target_ref = self.node_ref_of(edge.target_id())?;
        Ok(EdgeRecord::new(edge_id, &source_ref, &target_ref))
    }

    fn persist_scope_batch(&mut self, scope_changes: &[ScopeAssignment]) -> Result<(), EditError> {
        if scope_changes.is_empty() {
            return Ok(());
        }
        match self.store.update_node_scopes(scope_changes) {
            Ok(()) => Ok(()),
            Err(ScopeWriteError::Partial {
                written,
                total,
                source,
            }) => Err(EditError::PartialPropagation {
                written,
                total,
                source,
            }),
            Err(ScopeWriteError::Failed { source }) => Err(EditError::Persistence(source)),
        }
    }

    fn rollback_add(&mut self, applied: &EdgeApplied) {
        self.propagator
            .rollback(&mut self.graph, &applied.scope_changes);
        self.graph.remove_edge(&applied.edge_id);
    }

    fn rollback_reconnect(&mut self, applied: &EdgeApplied, old_edge: &GraphEdge) {
        self.propagator
            .rollback(&mut self.graph, &applied.scope_changes);
        self.graph.remove_edge(&applied.edge_id);
        self.graph
            .insert_edge_unchecked(applied.edge_id.clone(), old_edge.clone());
    }

    fn compensate_remove_edge(&mut self, edge_id: &EdgeId) {
        if let Err(err) = self.store.remove_edge(edge_id) {
            log::warn!("compensating edge removal of {edge_id} failed: {err}");
        }
    }

    fn compensate_create_edge(&mut self, record: &EdgeRecord) {
        if let Err(err) = self.store.create_edge(record) {
            log::warn!("compensating edge restore of {} failed: {err}", record.edge_id);
        }
    }

    /// Re-issues the landed prefix of a partial batch with each assignment's
    /// previous value, newest write first.
    ///
    /// Only the first `written` entries made it to the backend; the entry
    /// that broke the batch (and everything after it) never landed, and
    /// including it again would break the inverse batch the same way.
    fn compensate_scope_batch(&mut self, scope_changes: &[ScopeAssignment], written: usize) {
        let inverse: Vec<ScopeAssignment> = scope_changes
            .iter()
            .take(written)
            .rev()
            .map(|assignment| ScopeAssignment {
                node_id: assignment.node_id.clone(),
                scope_id: assignment.previous.clone(),
                previous: assignment.scope_id.clone(),
            })
            .collect();
        if inverse.is_empty() {
            return;
        }
        if let Err(err) = self.store.update_node_scopes(&inverse) {
            log::warn!("compensating scope batch failed: {err}");
        }
    }
}

#[derive(Debug)]
pub enum EditError {
    Rejected(ConnectionError),
    UnknownEdge {
        edge_id: EdgeId,
    },
    UnknownNode {
        node_id: NodeId,
    },
    EdgeExists {
        edge_id: EdgeId,
    },
    Persistence(PersistenceError),
    /// Some, but not all, cascaded scope writes landed. Always fatal for the
    /// mutation; the engine has already rolled back and compensated.
    PartialPropagation {
        written: usize,
        total: usize,
        source: PersistenceError,
    },
}

impl EditError {
    fn from_mutation(err: MutationError) -> Self {
        match err {
            MutationError::Rejected(reason) => Self::Rejected(reason),
            MutationError::EdgeExists { edge_id } => Self::EdgeExists { edge_id },
            MutationError::UnknownEdge { edge_id } => Self::UnknownEdge { edge_id },
        }
    }

    /// The validator rejection, if that is what this is.
    pub fn rejection(&self) -> Option<&ConnectionError> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "connection rejected: {reason}"),
            Self::UnknownEdge { edge_id } => write!(f, "edge not found (id={edge_id})"),
            Self::UnknownNode { node_id } => write!(f, "node not found (id={node_id})"),
            Self::EdgeExists { edge_id } => write!(f, "edge already exists (id={edge_id})"),
            Self::Persistence(source) => write!(f, "persistence failed: {source}"),
            Self::PartialPropagation {
                written,
                total,
                source,
            } => write!(
                f,
                "scope cascade partially persisted ({written}/{total}), mutation rolled back: {source}"
            ),
        }
    }
}

impl std::error::Error for EditError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(reason) => Some(reason),
            Self::Persistence(source) => Some(source),
            Self::PartialPropagation { source, .. } => Some(source),
            _ => None,
        }
    }
}
