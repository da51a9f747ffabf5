// SPDX-FileCopyrightText: 2026 Orgweave Authors
// SPDX-License-Identifier: MIT

//! Folder-backed persistence adapter.
//!
//! One JSON file for the graph, one positions file per tab:
//!
//! ```text
//! <root>/orgweave-graph.json
//! <root>/positions/company.json
//! <root>/positions/business-<id>.json
//! ```
//!
//! All writes are atomic (temp file + rename inside the root). Tab-key
//! segments are hex-escaped where they contain filesystem-hostile bytes so
//! one tab can never alias another's file.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::{
    EdgeRecord, GraphSnapshot, NodeRecord, Persistence, PersistenceError, PositionRecord,
    ScopeWriteError,
};
use crate::model::{
    BusinessUnitId, DisplayScope, EdgeId, NodeId, NodeKind, OrgGraph, Position, TabKey,
};
use crate::scope::ScopeAssignment;

const GRAPH_FILENAME: &str = "orgweave-graph.json";
const POSITIONS_DIRNAME: &str = "positions";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Fast, best-effort persistence.
    ///
    /// - Writes a temp file and renames atomically into place.
    /// - Does not perform per-file fsync.
    #[default]
    BestEffort,

    /// Slower, best-effort durability.
    ///
    /// Flushes written file contents to stable storage before the rename
    /// where possible. Exact guarantees are platform/filesystem-dependent.
    Durable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct GraphFile {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PositionsFile {
    positions: Vec<PositionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PositionEntry {
    node_ref: String,
    x: f64,
    y: f64,
}

/// `Persistence` over a plain folder of JSON files.
#[derive(Debug)]
pub struct OrgFolder {
    root: PathBuf,
    durability: WriteDurability,
    cached_graph: Option<GraphFile>,
}

impl OrgFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
            cached_graph: None,
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn graph_path(&self) -> PathBuf {
        self.root.join(GRAPH_FILENAME)
    }

    pub fn position_path(&self, tab_key: &TabKey) -> PathBuf {
        self.root
            .join(POSITIONS_DIRNAME)
            .join(format!("{}.json", tab_file_stem(tab_key)))
    }

    /// Replaces the persisted graph with `graph`, e.g. to seed a folder.
    pub fn save_graph(&mut self, graph: &OrgGraph) -> Result<(), PersistenceError> {
        let nodes = graph.nodes().values().map(NodeRecord::from_node).collect();

        let mut edges = Vec::with_capacity(graph.edges().len());
        for (edge_id, edge) in graph.edges() {
            let source = graph.node(edge.source_id()).ok_or_else(|| {
                PersistenceError::Backend {
                    message: format!("edge {edge_id} references unknown source {}", edge.source_id()),
                }
            })?;
            let target = graph.node(edge.target_id()).ok_or_else(|| {
                PersistenceError::Backend {
                    message: format!("edge {edge_id} references unknown target {}", edge.target_id()),
                }
            })?;
            edges.push(EdgeRecord::new(
                edge_id,
                &source.node_ref(),
                &target.node_ref(),
            ));
        }

        let file = GraphFile { nodes, edges };
        self.write_graph_file(&file)?;
        self.cached_graph = Some(file);
        Ok(())
    }

    fn graph_file(&mut self) -> Result<&GraphFile, PersistenceError> {
        if self.cached_graph.is_none() {
            let path = self.graph_path();
            let file = match fs::read_to_string(&path) {
                Ok(raw) => serde_json::from_str(&raw).map_err(|source| PersistenceError::Json {
                    path: path.clone(),
                    source,
                })?,
                Err(err) if err.kind() == io::ErrorKind::NotFound => GraphFile::default(),
                Err(source) => return Err(PersistenceError::Io { path, source }),
            };
            self.cached_graph = Some(file);
        }
        Ok(self
            .cached_graph
            .as_ref()
            .expect("graph cache populated above"))
    }

    /// Writes a staged graph file and only then adopts it as the mirror, so
    /// a failed write leaves the mirror agreeing with disk.
    fn commit_graph_file(&mut self, staged: GraphFile) -> Result<(), PersistenceError> {
        self.write_graph_file(&staged)?;
        self.cached_graph = Some(staged);
        Ok(())
    }

    fn write_graph_file(&self, file: &GraphFile) -> Result<(), PersistenceError> {
        let path = self.graph_path();
        let raw = serde_json::to_string_pretty(file).map_err(|source| PersistenceError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomic_in_root(&self.root, &path, raw.as_bytes(), self.durability)
    }

    fn read_positions_file(&self, tab_key: &TabKey) -> Result<PositionsFile, PersistenceError> {
        let path = self.position_path(tab_key);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|source| PersistenceError::Json { path, source }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PositionsFile::default()),
            Err(source) => Err(PersistenceError::Io { path, source }),
        }
    }

    fn write_positions_file(
        &self,
        tab_key: &TabKey,
        file: &PositionsFile,
    ) -> Result<(), PersistenceError> {
        let path = self.position_path(tab_key);
        let raw = serde_json::to_string_pretty(file).map_err(|source| PersistenceError::Json {
            path: path.clone(),
            source,
        })?;
        write_atomic_in_root(&self.root, &path, raw.as_bytes(), self.durability)
    }

    /// Kind lookup for building `"<kind>-<id>"` refs from bare node ids.
    fn node_kind(&mut self, node_id: &NodeId) -> Result<NodeKind, PersistenceError> {
        let file = self.graph_file()?;
        for record in &file.nodes {
            let node_ref: crate::model::NodeRef =
                record
                    .node_ref
                    .parse()
                    .map_err(|source| PersistenceError::InvalidRecord {
                        field: "node_ref",
                        value: record.node_ref.clone(),
                        reason: format!("{source}"),
                    })?;
            if node_ref.node_id() == node_id {
                return Ok(node_ref.kind());
            }
        }
        Err(PersistenceError::Backend {
            message: format!("node {node_id} not found"),
        })
    }
}

impl Persistence for OrgFolder {
    fn load_graph(
        &mut self,
        scope_filter: Option<&BusinessUnitId>,
    ) -> Result<GraphSnapshot, PersistenceError> {
        let file = self.graph_file()?.clone();

        let mut nodes = Vec::with_capacity(file.nodes.len());
        for record in file.nodes {
            nodes.push(record.into_node()?);
        }

        if let Some(selected) = scope_filter {
            nodes.retain(|node| {
                node.scope_id() == Some(selected)
                    || node.business_unit_id().as_ref() == Some(selected)
                    || (node.kind() == NodeKind::Container
                        && node.effective_display_scope() == DisplayScope::Business(selected.clone()))
            });
        }

        let kept: BTreeMap<&NodeId, ()> = nodes.iter().map(|node| (node.node_id(), ())).collect();
        let mut edges = Vec::with_capacity(file.edges.len());
        for record in &file.edges {
            let (edge_id, edge) = record.decode()?;
            if kept.contains_key(edge.source_id()) && kept.contains_key(edge.target_id()) {
                edges.push((edge_id, edge));
            }
        }

        Ok(GraphSnapshot { nodes, edges })
    }

    fn create_edge(&mut self, record: &EdgeRecord) -> Result<(), PersistenceError> {
        let file = self.graph_file()?;
        if file.edges.iter().any(|edge| edge.edge_id == record.edge_id) {
            return Err(PersistenceError::Backend {
                message: format!("edge {} already exists", record.edge_id),
            });
        }
        let mut staged = file.clone();
        staged.edges.push(record.clone());
        self.commit_graph_file(staged)
    }

    fn remove_edge(&mut self, edge_id: &EdgeId) -> Result<(), PersistenceError> {
        let mut staged = self.graph_file()?.clone();
        let before = staged.edges.len();
        staged.edges.retain(|edge| edge.edge_id != edge_id.as_str());
        if staged.edges.len() == before {
            return Err(PersistenceError::Backend {
                message: format!("edge {edge_id} not found"),
            });
        }
        self.commit_graph_file(staged)
    }

    fn update_node_scopes(
        &mut self,
        assignments: &[ScopeAssignment],
    ) -> Result<(), ScopeWriteError> {
        let total = assignments.len();
        let mut staged = match self.graph_file() {
            Ok(file) => file.clone(),
            Err(source) => return Err(ScopeWriteError::Failed { source }),
        };

        // Index records by bare node id; refs were validated on load.
        let mut by_node_id: BTreeMap<NodeId, usize> = BTreeMap::new();
        for (index, record) in staged.nodes.iter().enumerate() {
            if let Ok(node_ref) = record.node_ref.parse::<crate::model::NodeRef>() {
                by_node_id.insert(node_ref.into_node_id(), index);
            }
        }

        let mut written = 0usize;
        let mut missing: Option<NodeId> = None;
        for assignment in assignments {
            let Some(&index) = by_node_id.get(&assignment.node_id) else {
                missing = Some(assignment.node_id.clone());
                break;
            };
            staged.nodes[index].scope_id =
                assignment.scope_id.as_ref().map(|scope_id| scope_id.to_string());
            written += 1;
        }

        match (missing, self.commit_graph_file(staged)) {
            (None, Ok(())) => Ok(()),
            // The batch stopped early but what was applied did land.
            (Some(node_id), Ok(())) => Err(ScopeWriteError::Partial {
                written,
                total,
                source: PersistenceError::Backend {
                    message: format!("node {node_id} not found"),
                },
            }),
            // The write never happened; neither disk nor the mirror moved.
            (_, Err(source)) => Err(ScopeWriteError::Failed { source }),
        }
    }

    fn load_positions(
        &mut self,
        tab_key: &TabKey,
    ) -> Result<Vec<PositionRecord>, PersistenceError> {
        let file = self.read_positions_file(tab_key)?;
        Ok(file
            .positions
            .into_iter()
            .map(|entry| PositionRecord {
                tab_key: tab_key.to_string(),
                node_ref: entry.node_ref,
                x: entry.x,
                y: entry.y,
            })
            .collect())
    }

    fn save_position(
        &mut self,
        tab_key: &TabKey,
        node_id: &NodeId,
        position: Position,
    ) -> Result<(), PersistenceError> {
        let kind = self.node_kind(node_id)?;
        let node_ref = format!("{}-{node_id}", kind.tag());

        let mut file = self.read_positions_file(tab_key)?;
        match file
            .positions
            .iter_mut()
            .find(|entry| entry.node_ref == node_ref)
        {
            Some(entry) => {
                entry.x = position.x;
                entry.y = position.y;
            }
            None => file.positions.push(PositionEntry {
                node_ref,
                x: position.x,
                y: position.y,
            }),
        }
        self.write_positions_file(tab_key, &file)
    }
}

fn tab_file_stem(tab_key: &TabKey) -> String {
    match tab_key {
        TabKey::Company => "company".to_owned(),
        TabKey::Business(business_id) => {
            format!("business-{}", encode_filename_segment(business_id.as_str()))
        }
    }
}

/// Hex-escapes bytes that are hostile in file names (`:`, `*`, separators,
/// control bytes, non-ASCII) so distinct tab keys map to distinct files.
fn encode_filename_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        let keep = byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.');
        if keep {
            out.push(byte as char);
        } else {
            out.push('~');
            const HEX: &[u8; 16] = b"0123456789abcdef";
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0f) as usize] as char);
        }
    }
    out
}

fn write_atomic_in_root(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), PersistenceError> {
    if !path.starts_with(root) {
        return Err(PersistenceError::Backend {
            message: format!("path {path:?} escapes store root {root:?}"),
        });
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(PersistenceError::Backend {
                message: format!("refusing to write through symlink at {path:?}"),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("file");
    let temp_path = path.with_file_name(format!(
        ".{file_name}.tmp-{}-{nanos}",
        std::process::id()
    ));

    let result = (|| -> io::Result<()> {
        let mut temp = fs::File::create(&temp_path)?;
        temp.write_all(contents)?;
        if durability == WriteDurability::Durable {
            temp.sync_all()?;
        }
        drop(temp);
        fs::rename(&temp_path, path)
    })();

    if let Err(source) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
