// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

use super::ids::NodeId;

/// A directed structural relationship between two nodes.
///
/// Edges are keyed by `EdgeId` in the graph's edge map; the edge value only
/// carries its endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    source_id: NodeId,
    target_id: NodeId,
}

impl GraphEdge {
    pub fn new(source_id: NodeId, target_id: NodeId) -> Self {
        Self {
            source_id,
            target_id,
        }
    }

    pub fn source_id(&self) -> &NodeId {
        &self.source_id
    }

    pub fn target_id(&self) -> &NodeId {
        &self.target_id
    }
}
