// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use orgweave::model::{
    BusinessUnitId, DisplayScope, EdgeId, GraphNode, NodeId, NodeKind, OrgGraph,
};
use orgweave::ops;
use orgweave::scope::ScopePropagator;

pub fn node_id(value: &str) -> NodeId {
    value.parse().expect("node id")
}

pub fn edge_id(value: &str) -> EdgeId {
    value.parse().expect("edge id")
}

pub fn business_id(value: &str) -> BusinessUnitId {
    value.parse().expect("business id")
}

/// A business unit plus an unscoped task chain `t0 → t1 → … → t<len-1>`.
///
/// The business unit is left unconnected so benchmarks can measure the
/// cascade that connecting it triggers.
pub fn unscoped_task_chain(len: usize) -> (OrgGraph, ScopePropagator) {
    let mut graph = OrgGraph::new();
    let mut propagator = ScopePropagator::new();

    graph
        .insert_node(GraphNode::new(
            node_id("biz-1"),
            NodeKind::BusinessUnit,
            "Retail",
        ))
        .expect("insert business unit");
    for index in 0..len {
        graph
            .insert_node(GraphNode::new(
                node_id(&format!("t{index}")),
                NodeKind::Task,
                format!("Task {index}"),
            ))
            .expect("insert task");
    }
    for index in 1..len {
        ops::apply_edge_add(
            &mut graph,
            &mut propagator,
            edge_id(&format!("e{index}")),
            node_id(&format!("t{}", index - 1)),
            node_id(&format!("t{index}")),
        )
        .expect("wire chain");
    }

    (graph, propagator)
}

/// `lanes` containers spread over `businesses` business units, plus one
/// scoped task per container.
pub fn lanes_org(lanes: usize, businesses: usize) -> OrgGraph {
    let mut graph = OrgGraph::new();

    for index in 0..businesses {
        graph
            .insert_node(GraphNode::new(
                node_id(&format!("biz-{index}")),
                NodeKind::BusinessUnit,
                format!("Business {index}"),
            ))
            .expect("insert business unit");
    }

    for index in 0..lanes {
        let business = business_id(&format!("biz-{}", index % businesses));

        let mut lane = GraphNode::new(
            node_id(&format!("lane-{index}")),
            NodeKind::Container,
            format!("Lane {index}"),
        );
        lane.set_display_scope(Some(DisplayScope::Business(business.clone())));
        graph.insert_node(lane).expect("insert lane");

        let mut task = GraphNode::new(
            node_id(&format!("task-{index}")),
            NodeKind::Task,
            format!("Task {index}"),
        );
        task.set_scope_id(Some(business));
        graph.insert_node(task).expect("insert task");
    }

    graph
}
