// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Derived business-scope propagation.
//!
//! Scope flows downward from an already-scoped ancestor whenever an edge is
//! added: the target and all of its structural descendants take the source's
//! scope. Two behaviors are intentional and load-bearing:
//!
//! - a source without an established scope propagates nothing (scope is never
//!   overwritten by a scope-less ancestor);
//! - removing an edge neither clears nor recomputes scope; a node keeps its
//!   last known assignment until another edge re-scopes it.
//!
//! Changing either requires a product decision, not a refactor.

use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;

use crate::model::{BusinessUnitId, GraphEdge, NodeId, OrgGraph};

/// One cascaded scope write, with the value it replaced.
///
/// `previous` is what rollback restores when persistence fails mid-mutation.
/// `scope_id` is `None` only in compensating batches; propagation itself
/// always assigns a concrete scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeAssignment {
    pub node_id: NodeId,
    pub scope_id: Option<BusinessUnitId>,
    pub previous: Option<BusinessUnitId>,
}

/// Cache of resolved source scopes, owned by the propagator.
///
/// An explicit object instead of module-level state so independent graph
/// instances don't share entries and tests stay deterministic. Entries for
/// reassigned nodes are invalidated on every mutation.
#[derive(Debug, Clone, Default)]
pub struct ScopeCache {
    resolved: BTreeMap<NodeId, Option<BusinessUnitId>>,
}

impl ScopeCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, node_id: &NodeId) -> Option<&Option<BusinessUnitId>> {
        self.resolved.get(node_id)
    }

    fn insert(&mut self, node_id: NodeId, scope_id: Option<BusinessUnitId>) {
        self.resolved.insert(node_id, scope_id);
    }

    pub fn invalidate(&mut self, node_id: &NodeId) {
        self.resolved.remove(node_id);
    }

    pub fn clear(&mut self) {
        self.resolved.clear();
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

/// Recomputes the derived scope attribute on affected subtrees after edge
/// mutations.
#[derive(Debug, Default)]
pub struct ScopePropagator {
    cache: ScopeCache,
}

impl ScopePropagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(cache: ScopeCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ScopeCache {
        &self.cache
    }

    /// Cascades scope after `source → target` was inserted.
    ///
    /// Returns the ordered batch of assignments actually applied (target
    /// first, then descendants in BFS order), each carrying its previous
    /// value. The batch is what the caller hands to persistence in one
    /// request, and what rollback replays backwards. An empty batch means the
    /// source had no established scope and propagation was skipped.
    ///
    /// Re-running with the same arguments yields the same final values; a
    /// node already carrying the scope is still included so a retried batch
    /// has the same shape.
    pub fn on_edge_add(
        &mut self,
        graph: &mut OrgGraph,
        source_id: &NodeId,
        target_id: &NodeId,
    ) -> Vec<ScopeAssignment> {
        let Some(scope_id) = self.resolve_source_scope(graph, source_id) else {
            return Vec::new();
        };

        let mut assignments: Vec<ScopeAssignment> = Vec::new();
        let mut visited: BTreeSet<NodeId> = BTreeSet::new();
        let mut worklist: SmallVec<[NodeId; 8]> = SmallVec::new();
        worklist.push(target_id.clone());
        let mut cursor = 0;

        while cursor < worklist.len() {
            let node_id = worklist[cursor].clone();
            cursor += 1;
            if !visited.insert(node_id.clone()) {
                continue;
            }

            let Some(node) = graph.node_mut(&node_id) else {
                continue;
            };
            let previous = node.scope_id().cloned();
            node.set_scope_id(Some(scope_id.clone()));
            self.cache.invalidate(&node_id);
            assignments.push(ScopeAssignment {
                node_id: node_id.clone(),
                scope_id: Some(scope_id.clone()),
                previous,
            });

            for child in graph.children_of(&node_id) {
                if !visited.contains(child) {
                    worklist.push(child.clone());
                }
            }
        }

        assignments
    }

    /// Called after an edge was removed.
    ///
    /// Deliberately leaves the former target's (and its descendants') scope
    /// untouched: scope is a last-known assignment, not a re-derived value.
    pub fn on_edge_remove(&mut self, _graph: &mut OrgGraph, _edge: &GraphEdge) {}

    /// Restores the `previous` values of a batch, newest write first.
    pub fn rollback(&mut self, graph: &mut OrgGraph, assignments: &[ScopeAssignment]) {
        for assignment in assignments.iter().rev() {
            if let Some(node) = graph.node_mut(&assignment.node_id) {
                node.set_scope_id(assignment.previous.clone());
            }
            self.cache.invalidate(&assignment.node_id);
        }
    }

    /// The scope a connection from `source_id` would establish:
    /// a BusinessUnit contributes its own id, anything else its derived
    /// scope.
    fn resolve_source_scope(
        &mut self,
        graph: &OrgGraph,
        source_id: &NodeId,
    ) -> Option<BusinessUnitId> {
        if let Some(cached) = self.cache.get(source_id) {
            return cached.clone();
        }

        let resolved = graph.node(source_id).and_then(|node| {
            node.business_unit_id()
                .or_else(|| node.scope_id().cloned())
        });
        self.cache.insert(source_id.clone(), resolved.clone());
        resolved
    }
}
