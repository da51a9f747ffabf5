// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Core data model.
//!
//! Typed ids, org-chart nodes and structural edges, the in-memory graph with
//! maintained adjacency, and the per-tab view/position primitives.

pub mod edge;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod graph;
pub mod ids;
pub mod node;
pub mod view;

pub use edge::GraphEdge;
pub use graph::{GraphError, OrgGraph, RemovedNode};
pub use ids::{BusinessUnitId, EdgeId, Id, IdError, NodeId};
pub use node::{DisplayScope, GraphNode, NodeKind, NodeRef, ParseNodeRefError};
pub use view::{ParseTabKeyError, Position, TabKey, ViewContext};
