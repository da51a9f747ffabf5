// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Connection validation.
//!
//! A stateless rule set run before any edge mutation touches the graph. The
//! rules run in a fixed order and the first failure wins, so callers always
//! get the most specific rejection.

use std::fmt;

use crate::model::{EdgeId, NodeId, NodeKind, OrgGraph};
use crate::query;

/// Kind pairs a structural edge may connect, source to target.
const ALLOWED_PATTERNS: [(NodeKind, NodeKind); 3] = [
    (NodeKind::BusinessUnit, NodeKind::Task),
    (NodeKind::Task, NodeKind::Executor),
    (NodeKind::Task, NodeKind::Task),
];

pub fn pattern_is_allowed(source_kind: NodeKind, target_kind: NodeKind) -> bool {
    ALLOWED_PATTERNS.contains(&(source_kind, target_kind))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    SelfLoop {
        node_id: NodeId,
    },
    MissingNode {
        node_id: NodeId,
    },
    InvalidPattern {
        source_kind: NodeKind,
        target_kind: NodeKind,
    },
    DuplicateParent {
        target_id: NodeId,
        existing_edge_id: EdgeId,
    },
    Cycle {
        source_id: NodeId,
        target_id: NodeId,
    },
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { node_id } => {
                write!(f, "cannot connect a node to itself (id={node_id})")
            }
            Self::MissingNode { node_id } => write!(f, "node not found (id={node_id})"),
            Self::InvalidPattern {
                source_kind,
                target_kind,
            } => write!(
                f,
                "connection {source_kind} → {target_kind} is not allowed"
            ),
            Self::DuplicateParent {
                target_id,
                existing_edge_id,
            } => write!(
                f,
                "target {target_id} already has an incoming edge ({existing_edge_id})"
            ),
            Self::Cycle {
                source_id,
                target_id,
            } => write!(
                f,
                "connecting {source_id} → {target_id} would close a task cycle"
            ),
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Decides whether `source → target` is a legal structural edge.
///
/// Rule order (first failure wins): self-loop, endpoint existence, kind
/// pattern, single parent, and (for Task→Task only) acyclicity of the
/// hypothetical graph. The cycle check searches forward from `target`: if
/// `source` is reachable, the new edge would close a loop.
pub fn validate_connection(
    graph: &OrgGraph,
    source_id: &NodeId,
    target_id: &NodeId,
) -> Result<(), ConnectionError> {
    if source_id == target_id {
        return Err(ConnectionError::SelfLoop {
            node_id: source_id.clone(),
        });
    }

    let Some(source) = graph.node(source_id) else {
        return Err(ConnectionError::MissingNode {
            node_id: source_id.clone(),
        });
    };
    let Some(target) = graph.node(target_id) else {
        return Err(ConnectionError::MissingNode {
            node_id: target_id.clone(),
        });
    };

    if !pattern_is_allowed(source.kind(), target.kind()) {
        return Err(ConnectionError::InvalidPattern {
            source_kind: source.kind(),
            target_kind: target.kind(),
        });
    }

    if let Some(existing_edge_id) = graph.parent_edge_of(target_id) {
        return Err(ConnectionError::DuplicateParent {
            target_id: target_id.clone(),
            existing_edge_id: existing_edge_id.clone(),
        });
    }

    if source.kind() == NodeKind::Task
        && target.kind() == NodeKind::Task
        && query::reaches(graph, target_id, source_id)
    {
        return Err(ConnectionError::Cycle {
            source_id: source_id.clone(),
            target_id: target_id.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{pattern_is_allowed, validate_connection, ConnectionError};
    use crate::model::fixtures::{edge_id, node, node_id};
    use crate::model::{GraphEdge, NodeKind, OrgGraph};

    fn one_of_each() -> OrgGraph {
        let mut graph = OrgGraph::new();
        for kind in NodeKind::ALL {
            graph
                .insert_node(node(kind, kind.tag(), kind.tag()))
                .expect("insert");
        }
        graph
    }

    #[test]
    fn only_the_three_structural_patterns_are_allowed() {
        let graph = one_of_each();

        for source_kind in NodeKind::ALL {
            for target_kind in NodeKind::ALL {
                if source_kind == target_kind {
                    continue;
                }
                let result = validate_connection(
                    &graph,
                    &node_id(source_kind.tag()),
                    &node_id(target_kind.tag()),
                );
                if pattern_is_allowed(source_kind, target_kind) {
                    assert_eq!(result, Ok(()), "{source_kind} → {target_kind}");
                } else {
                    assert_eq!(
                        result,
                        Err(ConnectionError::InvalidPattern {
                            source_kind,
                            target_kind
                        })
                    );
                }
            }
        }
    }

    #[test]
    fn self_loop_is_rejected_before_anything_else() {
        let graph = one_of_each();
        let result = validate_connection(&graph, &node_id("task"), &node_id("task"));
        assert_eq!(
            result,
            Err(ConnectionError::SelfLoop {
                node_id: node_id("task")
            })
        );

        // Even an id that is not in the graph at all.
        let result = validate_connection(&graph, &node_id("ghost"), &node_id("ghost"));
        assert_eq!(
            result,
            Err(ConnectionError::SelfLoop {
                node_id: node_id("ghost")
            })
        );
    }

    #[test]
    fn missing_endpoints_are_reported() {
        let graph = one_of_each();
        assert_eq!(
            validate_connection(&graph, &node_id("ghost"), &node_id("task")),
            Err(ConnectionError::MissingNode {
                node_id: node_id("ghost")
            })
        );
        assert_eq!(
            validate_connection(&graph, &node_id("task"), &node_id("ghost")),
            Err(ConnectionError::MissingNode {
                node_id: node_id("ghost")
            })
        );
    }

    #[test]
    fn second_parent_is_rejected_regardless_of_source() {
        let mut graph = one_of_each();
        graph
            .insert_node(node(NodeKind::Task, "task-2", "Other task"))
            .expect("insert");
        graph.insert_edge_unchecked(
            edge_id("e1"),
            GraphEdge::new(node_id("business"), node_id("task")),
        );

        // A different, individually legal source still loses to the
        // single-parent invariant.
        let result = validate_connection(&graph, &node_id("task-2"), &node_id("task"));
        assert_eq!(
            result,
            Err(ConnectionError::DuplicateParent {
                target_id: node_id("task"),
                existing_edge_id: edge_id("e1")
            })
        );
    }

    #[test]
    fn task_cycles_are_rejected_and_acyclic_edges_pass() {
        let mut graph = OrgGraph::new();
        for id in ["t1", "t2", "t3"] {
            graph
                .insert_node(node(NodeKind::Task, id, id))
                .expect("insert");
        }
        graph.insert_edge_unchecked(edge_id("e1"), GraphEdge::new(node_id("t1"), node_id("t2")));
        graph.insert_edge_unchecked(edge_id("e2"), GraphEdge::new(node_id("t2"), node_id("t3")));

        // Closing the loop back to an ancestor is rejected.
        assert_eq!(
            validate_connection(&graph, &node_id("t3"), &node_id("t1")),
            Err(ConnectionError::Cycle {
                source_id: node_id("t3"),
                target_id: node_id("t1")
            })
        );

        // A forward edge to a fresh task keeps the subgraph acyclic.
        graph
            .insert_node(node(NodeKind::Task, "t4", "t4"))
            .expect("insert");
        assert_eq!(
            validate_connection(&graph, &node_id("t3"), &node_id("t4")),
            Ok(())
        );
    }
}
