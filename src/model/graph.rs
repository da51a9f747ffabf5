// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::edge::GraphEdge;
use super::ids::{EdgeId, NodeId};
use super::node::GraphNode;

/// The authoritative node/edge set for one editing session.
///
/// Adjacency is maintained incrementally alongside the edge map so that
/// parent/child lookups never scan the edge set:
/// - `parent_edge` maps a node to its single incoming structural edge
///   (single-parent invariant),
/// - `children` maps a node to the set of its direct structural children.
///
/// Edge insertion here is unchecked; connection legality is the job of
/// `ops::validate`, which runs before anything touches this structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrgGraph {
    nodes: BTreeMap<NodeId, GraphNode>,
    edges: BTreeMap<EdgeId, GraphEdge>,
    parent_edge: BTreeMap<NodeId, EdgeId>,
    children: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

impl OrgGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &BTreeMap<NodeId, GraphNode> {
        &self.nodes
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&GraphNode> {
        self.nodes.get(node_id)
    }

    pub(crate) fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut GraphNode> {
        self.nodes.get_mut(node_id)
    }

    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    pub fn edges(&self) -> &BTreeMap<EdgeId, GraphEdge> {
        &self.edges
    }

    pub fn edge(&self, edge_id: &EdgeId) -> Option<&GraphEdge> {
        self.edges.get(edge_id)
    }

    /// The edge that makes `node_id` someone's child, if any.
    pub fn parent_edge_of(&self, node_id: &NodeId) -> Option<&EdgeId> {
        self.parent_edge.get(node_id)
    }

    pub fn parent_of(&self, node_id: &NodeId) -> Option<&NodeId> {
        let edge_id = self.parent_edge.get(node_id)?;
        self.edges.get(edge_id).map(GraphEdge::source_id)
    }

    pub fn children_of<'a>(&'a self, node_id: &NodeId) -> impl Iterator<Item = &'a NodeId> {
        self.children.get(node_id).into_iter().flatten()
    }

    pub fn insert_node(&mut self, node: GraphNode) -> Result<(), GraphError> {
        if self.nodes.contains_key(node.node_id()) {
            return Err(GraphError::NodeExists {
                node_id: node.node_id().clone(),
            });
        }
        self.nodes.insert(node.node_id().clone(), node);
        Ok(())
    }

    /// Removes a node and every edge incident to it.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Result<RemovedNode, GraphError> {
        let Some(node) = self.nodes.remove(node_id) else {
            return Err(GraphError::UnknownNode {
                node_id: node_id.clone(),
            });
        };

        let incident = self
            .edges
            .iter()
            .filter(|(_, edge)| edge.source_id() == node_id || edge.target_id() == node_id)
            .map(|(edge_id, _)| edge_id.clone())
            .collect::<Vec<_>>();

        let mut removed_edges = Vec::with_capacity(incident.len());
        for edge_id in incident {
            if let Some(edge) = self.remove_edge(&edge_id) {
                removed_edges.push((edge_id, edge));
            }
        }
        self.children.remove(node_id);

        Ok(RemovedNode {
            node,
            removed_edges,
        })
    }

    /// Inserts an edge and updates adjacency.
    ///
    /// Caller is responsible for having validated the connection; this will
    /// silently overwrite the target's parent slot otherwise.
    pub(crate) fn insert_edge_unchecked(&mut self, edge_id: EdgeId, edge: GraphEdge) {
        self.parent_edge
            .insert(edge.target_id().clone(), edge_id.clone());
        self.children
            .entry(edge.source_id().clone())
            .or_default()
            .insert(edge.target_id().clone());
        self.edges.insert(edge_id, edge);
    }

    pub(crate) fn remove_edge(&mut self, edge_id: &EdgeId) -> Option<GraphEdge> {
        let edge = self.edges.remove(edge_id)?;

        if self.parent_edge.get(edge.target_id()) == Some(edge_id) {
            self.parent_edge.remove(edge.target_id());
        }
        if let Some(children) = self.children.get_mut(edge.source_id()) {
            children.remove(edge.target_id());
            if children.is_empty() {
                self.children.remove(edge.source_id());
            }
        }

        Some(edge)
    }
}

/// A removed node together with the incident edges that went with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedNode {
    pub node: GraphNode,
    pub removed_edges: Vec<(EdgeId, GraphEdge)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    NodeExists { node_id: NodeId },
    UnknownNode { node_id: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeExists { node_id } => write!(f, "node already exists (id={node_id})"),
            Self::UnknownNode { node_id } => write!(f, "node not found (id={node_id})"),
        }
    }
}

impl std::error::Error for GraphError {}
