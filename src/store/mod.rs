// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Persistence boundary.
//!
//! The engine consumes persistence through the [`Persistence`] trait; wire
//! records carry string refs in the canonical `"<kind>-<id>"` form and are
//! parsed into typed values here, once, at the boundary. Model types stay
//! serde-free.
//!
//! `update_node_scopes` takes the whole cascaded batch in one call. That is
//! load-bearing: it bounds latency and it is what makes the all-or-nothing
//! contract of an edge mutation enforceable.

pub mod org_folder;

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::{
    BusinessUnitId, DisplayScope, EdgeId, GraphEdge, GraphNode, NodeId, NodeRef, Position, TabKey,
};
use crate::scope::ScopeAssignment;

pub use org_folder::{OrgFolder, WriteDurability};

/// What `load_graph` returns: every node plus the id-keyed edge list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<(EdgeId, GraphEdge)>,
}

/// The external persistence collaborator.
///
/// Implementations may be remote; the engine serializes calls through its
/// single-writer mutation path, so none of these methods need internal
/// locking for the engine's sake.
pub trait Persistence {
    fn load_graph(
        &mut self,
        scope_filter: Option<&BusinessUnitId>,
    ) -> Result<GraphSnapshot, PersistenceError>;

    fn create_edge(&mut self, record: &EdgeRecord) -> Result<(), PersistenceError>;

    fn remove_edge(&mut self, edge_id: &EdgeId) -> Result<(), PersistenceError>;

    /// Writes a cascaded scope batch in one request.
    fn update_node_scopes(&mut self, assignments: &[ScopeAssignment])
        -> Result<(), ScopeWriteError>;

    fn load_positions(&mut self, tab_key: &TabKey) -> Result<Vec<PositionRecord>, PersistenceError>;

    fn save_position(
        &mut self,
        tab_key: &TabKey,
        node_id: &NodeId,
        position: Position,
    ) -> Result<(), PersistenceError>;
}

/// Persisted form of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node_ref: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    /// `"company"` or a business unit id. Anything unparseable is treated as
    /// unset, which the model resolves to company-wide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_scope: Option<String>,
}

impl NodeRecord {
    pub fn from_node(node: &GraphNode) -> Self {
        Self {
            node_ref: node.node_ref().to_string(),
            label: node.label().to_owned(),
            attributes: node.attributes().clone(),
            scope_id: node.scope_id().map(|scope_id| scope_id.to_string()),
            display_scope: node.display_scope().map(|display_scope| match display_scope {
                DisplayScope::Company => "company".to_owned(),
                DisplayScope::Business(business_id) => business_id.to_string(),
            }),
        }
    }

    pub fn into_node(self) -> Result<GraphNode, PersistenceError> {
        let node_ref: NodeRef = self
            .node_ref
            .parse()
            .map_err(|source| PersistenceError::InvalidRecord {
                field: "node_ref",
                value: self.node_ref.clone(),
                reason: format!("{source}"),
            })?;

        let scope_id = match self.scope_id {
            None => None,
            Some(raw) => Some(BusinessUnitId::new(raw.as_str()).map_err(|source| {
                PersistenceError::InvalidRecord {
                    field: "scope_id",
                    value: raw.clone(),
                    reason: format!("{source}"),
                }
            })?),
        };

        // Invalid display scopes degrade to unset instead of failing the
        // load; the invariant treats both as company-wide.
        let display_scope = self.display_scope.as_deref().and_then(|raw| {
            if raw == "company" {
                return Some(DisplayScope::Company);
            }
            BusinessUnitId::new(raw).ok().map(DisplayScope::Business)
        });

        let mut node = GraphNode::new(node_ref.node_id().clone(), node_ref.kind(), self.label);
        *node.attributes_mut() = self.attributes;
        node.set_scope_id(scope_id);
        node.set_display_scope(display_scope);
        Ok(node)
    }
}

/// Persisted form of an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub edge_id: String,
    pub source_ref: String,
    pub target_ref: String,
}

impl EdgeRecord {
    pub fn new(edge_id: &EdgeId, source_ref: &NodeRef, target_ref: &NodeRef) -> Self {
        Self {
            edge_id: edge_id.to_string(),
            source_ref: source_ref.to_string(),
            target_ref: target_ref.to_string(),
        }
    }

    pub fn decode(&self) -> Result<(EdgeId, GraphEdge), PersistenceError> {
        let edge_id =
            EdgeId::new(self.edge_id.as_str()).map_err(|source| PersistenceError::InvalidRecord {
                field: "edge_id",
                value: self.edge_id.clone(),
                reason: format!("{source}"),
            })?;
        let source_ref = decode_node_ref("source_ref", &self.source_ref)?;
        let target_ref = decode_node_ref("target_ref", &self.target_ref)?;
        Ok((
            edge_id,
            GraphEdge::new(source_ref.into_node_id(), target_ref.into_node_id()),
        ))
    }
}

/// Persisted form of one node's position on one tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub tab_key: String,
    pub node_ref: String,
    pub x: f64,
    pub y: f64,
}

impl PositionRecord {
    pub fn new(tab_key: &TabKey, node_ref: &NodeRef, position: Position) -> Self {
        Self {
            tab_key: tab_key.to_string(),
            node_ref: node_ref.to_string(),
            x: position.x,
            y: position.y,
        }
    }

    pub fn decode(&self) -> Result<(TabKey, NodeId, Position), PersistenceError> {
        let tab_key: TabKey =
            self.tab_key
                .parse()
                .map_err(|source| PersistenceError::InvalidRecord {
                    field: "tab_key",
                    value: self.tab_key.clone(),
                    reason: format!("{source}"),
                })?;
        let node_ref = decode_node_ref("node_ref", &self.node_ref)?;
        Ok((
            tab_key,
            node_ref.into_node_id(),
            Position::new(self.x, self.y),
        ))
    }
}

fn decode_node_ref(field: &'static str, raw: &str) -> Result<NodeRef, PersistenceError> {
    raw.parse()
        .map_err(|source| PersistenceError::InvalidRecord {
            field,
            value: raw.to_owned(),
            reason: format!("{source}"),
        })
}

#[derive(Debug)]
pub enum PersistenceError {
    /// A failure reported by the backing collaborator itself.
    Backend {
        message: String,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidRecord {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { message } => write!(f, "persistence backend error: {message}"),
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::InvalidRecord {
                field,
                value,
                reason,
            } => write!(f, "invalid {field} {value:?}: {reason}"),
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Backend { .. } | Self::InvalidRecord { .. } => None,
        }
    }
}

/// Outcome of a batched scope write that did not fully succeed.
///
/// `Partial` is the dangerous one: some cascaded writes landed. The caller
/// must treat it as fatal for the mutation and roll back; it is never
/// silently ignored.
#[derive(Debug)]
pub enum ScopeWriteError {
    Partial {
        written: usize,
        total: usize,
        source: PersistenceError,
    },
    Failed {
        source: PersistenceError,
    },
}

impl fmt::Display for ScopeWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partial {
                written,
                total,
                source,
            } => write!(
                f,
                "scope batch partially written ({written}/{total}): {source}"
            ),
            Self::Failed { source } => write!(f, "scope batch failed: {source}"),
        }
    }
}

impl std::error::Error for ScopeWriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Partial { source, .. } | Self::Failed { source } => Some(source),
        }
    }
}
