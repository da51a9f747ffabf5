// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

use super::edge::GraphEdge;
use super::graph::OrgGraph;
use super::ids::{BusinessUnitId, EdgeId, NodeId};
use super::node::{DisplayScope, GraphNode, NodeKind};

pub(crate) fn node_id(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

pub(crate) fn edge_id(value: &str) -> EdgeId {
    EdgeId::new(value).expect("edge id")
}

pub(crate) fn business_id(value: &str) -> BusinessUnitId {
    BusinessUnitId::new(value).expect("business id")
}

pub(crate) fn node(kind: NodeKind, id: &str, label: &str) -> GraphNode {
    GraphNode::new(node_id(id), kind, label)
}

pub(crate) fn container(id: &str, label: &str, display_scope: Option<DisplayScope>) -> GraphNode {
    let mut container = node(NodeKind::Container, id, label);
    container.set_display_scope(display_scope);
    container
}

/// One business unit plus the unconnected pieces of a `B → T1 → T2 → E`
/// chain. Edges are left to the caller so validation/propagation paths stay
/// exercised.
pub(crate) fn chain_org() -> OrgGraph {
    let mut graph = OrgGraph::new();
    graph
        .insert_node(node(NodeKind::BusinessUnit, "biz-1", "Retail"))
        .expect("insert business unit");
    graph
        .insert_node(node(NodeKind::Task, "t1", "Plan stock"))
        .expect("insert task");
    graph
        .insert_node(node(NodeKind::Task, "t2", "Order stock"))
        .expect("insert task");
    graph
        .insert_node(node(NodeKind::Executor, "x1", "Warehouse team"))
        .expect("insert executor");
    graph
}

/// Pre-wired `B → T1 → T2` with scope already cascaded, as a persistence
/// snapshot would deliver it.
pub(crate) fn scoped_chain_org() -> OrgGraph {
    let mut graph = chain_org();
    graph.insert_edge_unchecked(
        edge_id("e1"),
        GraphEdge::new(node_id("biz-1"), node_id("t1")),
    );
    graph.insert_edge_unchecked(edge_id("e2"), GraphEdge::new(node_id("t1"), node_id("t2")));
    for id in ["t1", "t2"] {
        graph
            .node_mut(&node_id(id))
            .expect("chain node")
            .set_scope_id(Some(business_id("biz-1")));
    }
    graph
}
