// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::ids::{BusinessUnitId, IdError, NodeId};

/// The organizational role a node plays in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Company,
    Executive,
    BusinessUnit,
    Task,
    Executor,
    Container,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Company,
        NodeKind::Executive,
        NodeKind::BusinessUnit,
        NodeKind::Task,
        NodeKind::Executor,
        NodeKind::Container,
    ];

    /// Wire tag used in the canonical `"<kind>-<id>"` node ref form.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Executive => "executive",
            Self::BusinessUnit => "business",
            Self::Task => "task",
            Self::Executor => "executor",
            Self::Container => "container",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Which tab a container is shown on: the whole company or one business unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisplayScope {
    Company,
    Business(BusinessUnitId),
}

/// A node of the org chart.
///
/// `scope_id` is a derived attribute: it is written by scope propagation (and
/// snapshot loading), never edited directly by users. `display_scope` is only
/// meaningful for `Container` nodes; anything unset is treated as
/// company-wide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    node_id: NodeId,
    kind: NodeKind,
    label: String,
    attributes: BTreeMap<String, String>,
    scope_id: Option<BusinessUnitId>,
    display_scope: Option<DisplayScope>,
}

impl GraphNode {
    pub fn new(node_id: NodeId, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            node_id,
            kind,
            label: label.into(),
            attributes: BTreeMap::new(),
            scope_id: None,
            display_scope: None,
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn node_ref(&self) -> NodeRef {
        NodeRef::new(self.kind, self.node_id.clone())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.attributes
    }

    pub fn scope_id(&self) -> Option<&BusinessUnitId> {
        self.scope_id.as_ref()
    }

    pub fn set_scope_id(&mut self, scope_id: Option<BusinessUnitId>) {
        self.scope_id = scope_id;
    }

    /// The id this node contributes as a scope, if it is a BusinessUnit.
    pub fn business_unit_id(&self) -> Option<BusinessUnitId> {
        (self.kind == NodeKind::BusinessUnit).then(|| self.node_id.retag())
    }

    pub fn display_scope(&self) -> Option<&DisplayScope> {
        self.display_scope.as_ref()
    }

    pub fn set_display_scope(&mut self, display_scope: Option<DisplayScope>) {
        self.display_scope = display_scope;
    }

    /// Display scope with the unset case resolved to company-wide.
    pub fn effective_display_scope(&self) -> DisplayScope {
        self.display_scope.clone().unwrap_or(DisplayScope::Company)
    }
}

/// Tagged node identity used at the persistence boundary.
///
/// Constructed once from the canonical `"<kind>-<id>"` string and passed as a
/// value afterwards; the string form is never re-parsed inside the engine.
/// The ref is the join key between the engine and persistence and must remain
/// stable for the life of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    kind: NodeKind,
    node_id: NodeId,
}

impl NodeRef {
    pub fn new(kind: NodeKind, node_id: NodeId) -> Self {
        Self { kind, node_id }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn into_node_id(self) -> NodeId {
        self.node_id
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.tag(), self.node_id)
    }
}

impl FromStr for NodeRef {
    type Err = ParseNodeRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((tag, raw_id)) = s.split_once('-') else {
            return Err(ParseNodeRefError::MissingSeparator {
                value: s.to_owned(),
            });
        };
        let Some(kind) = NodeKind::from_tag(tag) else {
            return Err(ParseNodeRefError::UnknownKind {
                tag: tag.to_owned(),
            });
        };
        let node_id = NodeId::new(raw_id).map_err(|source| ParseNodeRefError::InvalidId {
            value: raw_id.to_owned(),
            source,
        })?;
        Ok(Self { kind, node_id })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseNodeRefError {
    MissingSeparator { value: String },
    UnknownKind { tag: String },
    InvalidId { value: String, source: IdError },
}

impl fmt::Display for ParseNodeRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator { value } => {
                write!(f, "node ref {value:?} is missing the '<kind>-<id>' separator")
            }
            Self::UnknownKind { tag } => write!(f, "unknown node kind tag {tag:?}"),
            Self::InvalidId { value, source } => {
                write!(f, "invalid node id {value:?}: {source}")
            }
        }
    }
}

impl std::error::Error for ParseNodeRefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId { source, .. } => Some(source),
            _ => None,
        }
    }
}
