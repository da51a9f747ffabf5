// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Per-tab visibility filtering.
//!
//! Pure functions over the in-memory graph; recomputed from scratch on every
//! tab switch. The company tab shows everything. A business tab shows only
//! the containers displayed for that unit and the nodes scoped to it.

use crate::model::{DisplayScope, GraphNode, NodeKind, OrgGraph, ViewContext};

/// The subset of the graph rendered for one tab.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleGraph<'a> {
    pub nodes: Vec<&'a GraphNode>,
    pub containers: Vec<&'a GraphNode>,
}

/// Containers visible under `context`.
///
/// A container with an unset display scope is company-wide: shown on the
/// company tab, excluded from every business tab.
pub fn visible_containers<'a>(graph: &'a OrgGraph, context: &ViewContext) -> Vec<&'a GraphNode> {
    graph
        .nodes()
        .values()
        .filter(|node| node.kind() == NodeKind::Container)
        .filter(|container| match context {
            ViewContext::Company => true,
            ViewContext::Business(selected) => {
                container.effective_display_scope() == DisplayScope::Business(selected.clone())
            }
        })
        .collect()
}

/// The full visible subset for `context`: non-container nodes plus
/// containers.
///
/// On a business tab a node is visible when its derived scope matches the
/// selection, or when it is the selected business unit itself.
pub fn visible_graph<'a>(graph: &'a OrgGraph, context: &ViewContext) -> VisibleGraph<'a> {
    let nodes = graph
        .nodes()
        .values()
        .filter(|node| node.kind() != NodeKind::Container)
        .filter(|node| match context {
            ViewContext::Company => true,
            ViewContext::Business(selected) => {
                node.scope_id() == Some(selected)
                    || node.business_unit_id().as_ref() == Some(selected)
            }
        })
        .collect();

    VisibleGraph {
        nodes,
        containers: visible_containers(graph, context),
    }
}
