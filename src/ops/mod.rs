// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Edge mutation application.
//!
//! The edit gestures (connect, disconnect, reconnect) applied against
//! the in-memory graph. Every function either completes fully or leaves the
//! graph untouched; persistence and its rollback live one layer up in
//! `editor`.

use std::fmt;

pub mod validate;

use crate::model::{EdgeId, GraphEdge, NodeId, OrgGraph};
use crate::scope::{ScopeAssignment, ScopePropagator};
use validate::{validate_connection, ConnectionError};

/// A successfully applied connect gesture: the new edge plus the scope batch
/// it cascaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeApplied {
    pub edge_id: EdgeId,
    pub scope_changes: Vec<ScopeAssignment>,
}

/// A successfully applied disconnect gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRemoved {
    pub edge_id: EdgeId,
    pub edge: GraphEdge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    Rejected(ConnectionError),
    EdgeExists { edge_id: EdgeId },
    UnknownEdge { edge_id: EdgeId },
}

impl fmt::Display for MutationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "connection rejected: {reason}"),
            Self::EdgeExists { edge_id } => write!(f, "edge already exists (id={edge_id})"),
            Self::UnknownEdge { edge_id } => write!(f, "edge not found (id={edge_id})"),
        }
    }
}

impl std::error::Error for MutationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Validates and inserts `source → target`, then cascades scope.
///
/// On rejection nothing changes; the caller gets the specific reason.
pub fn apply_edge_add(
    graph: &mut OrgGraph,
    propagator: &mut ScopePropagator,
    edge_id: EdgeId,
    source_id: NodeId,
    target_id: NodeId,
) -> Result<EdgeApplied, MutationError> {
    if graph.edge(&edge_id).is_some() {
        return Err(MutationError::EdgeExists { edge_id });
    }
    validate_connection(graph, &source_id, &target_id).map_err(MutationError::Rejected)?;

    graph.insert_edge_unchecked(edge_id.clone(), GraphEdge::new(source_id.clone(), target_id.clone()));
    let scope_changes = propagator.on_edge_add(graph, &source_id, &target_id);

    Ok(EdgeApplied {
        edge_id,
        scope_changes,
    })
}

/// Removes an edge. Scope stays as last assigned (see `scope` module docs).
pub fn apply_edge_remove(
    graph: &mut OrgGraph,
    propagator: &mut ScopePropagator,
    edge_id: &EdgeId,
) -> Result<EdgeRemoved, MutationError> {
    let Some(edge) = graph.remove_edge(edge_id) else {
        return Err(MutationError::UnknownEdge {
            edge_id: edge_id.clone(),
        });
    };
    propagator.on_edge_remove(graph, &edge);

    Ok(EdgeRemoved {
        edge_id: edge_id.clone(),
        edge,
    })
}

/// Atomically rewires an existing edge to new endpoints.
///
/// Compound of remove-old + add-new under the same edge id. If the new
/// connection fails validation, the old edge is restored exactly as it was
/// and the whole operation reports failure; no edge is ever lost
/// mid-operation.
pub fn reconnect(
    graph: &mut OrgGraph,
    propagator: &mut ScopePropagator,
    edge_id: &EdgeId,
    new_source_id: NodeId,
    new_target_id: NodeId,
) -> Result<EdgeApplied, MutationError> {
    let Some(old_edge) = graph.remove_edge(edge_id) else {
        return Err(MutationError::UnknownEdge {
            edge_id: edge_id.clone(),
        });
    };
    propagator.on_edge_remove(graph, &old_edge);

    match validate_connection(graph, &new_source_id, &new_target_id) {
        Ok(()) => {}
        Err(reason) => {
            // Removal never touches scope, so restoring the edge restores
            // the exact pre-gesture state.
            graph.insert_edge_unchecked(edge_id.clone(), old_edge);
            return Err(MutationError::Rejected(reason));
        }
    }

    graph.insert_edge_unchecked(
        edge_id.clone(),
        GraphEdge::new(new_source_id.clone(), new_target_id.clone()),
    );
    let scope_changes = propagator.on_edge_add(graph, &new_source_id, &new_target_id);

    Ok(EdgeApplied {
        edge_id: edge_id.clone(),
        scope_changes,
    })
}
