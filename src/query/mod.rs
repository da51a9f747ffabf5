// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Read-only traversal helpers over the org graph.
//!
//! The same worklist machinery backs cycle detection (`ops::validate`) and
//! scope cascading (`scope`), so traversal depth is bounded by the visited
//! set rather than the call stack.

pub mod view;

use std::collections::{BTreeSet, VecDeque};

use crate::model::{NodeId, OrgGraph};

/// All structural descendants of `start`, in BFS order, `start` excluded.
pub fn descendants_of(graph: &OrgGraph, start: &NodeId) -> Vec<NodeId> {
    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut order: Vec<NodeId> = Vec::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    visited.insert(start.clone());
    queue.push_back(start.clone());

    while let Some(node_id) = queue.pop_front() {
        for child in graph.children_of(&node_id) {
            if visited.insert(child.clone()) {
                order.push(child.clone());
                queue.push_back(child.clone());
            }
        }
    }

    order
}

/// Whether `to` is reachable from `from` by following edges forward.
pub fn reaches(graph: &OrgGraph, from: &NodeId, to: &NodeId) -> bool {
    if from == to {
        return true;
    }

    let mut visited: BTreeSet<NodeId> = BTreeSet::new();
    let mut queue: VecDeque<NodeId> = VecDeque::new();

    visited.insert(from.clone());
    queue.push_back(from.clone());

    while let Some(node_id) = queue.pop_front() {
        for child in graph.children_of(&node_id) {
            if child == to {
                return true;
            }
            if visited.insert(child.clone()) {
                queue.push_back(child.clone());
            }
        }
    }

    false
}
