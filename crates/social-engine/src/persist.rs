//! Snapshot codec for the digraph and its node side-table.
//!
//! Two linked artifacts share one base path: `<base>.graph.bin` carries the
//! structure (bincode), `<base>.nodes.json` carries the node -> user id
//! side-table. Node indices are meaningless without the side-table, so a
//! pair that does not match is rejected as a whole.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::graph::{NodeRegistry, WeightedDigraph};

const GRAPH_EXT: &str = "graph.bin";
const NODEMAP_EXT: &str = "nodes.json";

/// Persisted digraph structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// RFC 3339 stamp of the save, for operator inspection only.
    pub saved_at: String,
    pub node_count: u32,
    pub edges: Vec<(u32, u32, f64)>,
}

pub fn graph_file(base: &Path) -> PathBuf {
    artifact(base, GRAPH_EXT)
}

pub fn nodemap_file(base: &Path) -> PathBuf {
    artifact(base, NODEMAP_EXT)
}

fn artifact(base: &Path, ext: &str) -> PathBuf {
    let mut name = base
        .file_name()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(ext);
    base.with_file_name(name)
}

/// Writes both artifacts for the given graph state.
pub fn save(
    base: &Path,
    graph: &WeightedDigraph,
    registry: &NodeRegistry,
) -> Result<(), GraphError> {
    if let Some(parent) = base.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let snapshot = GraphSnapshot {
        saved_at: Utc::now().to_rfc3339(),
        node_count: graph.node_count() as u32,
        edges: graph.edges().collect(),
    };
    fs::write(graph_file(base), bincode::serialize(&snapshot)?)?;

    let nodemap: HashMap<u32, u64> = registry.iter().collect();
    fs::write(nodemap_file(base), serde_json::to_string(&nodemap)?)?;
    Ok(())
}

/// Reads both artifacts back into an equivalent in-memory state.
///
/// The pair is validated before anything is returned: the side-table must
/// map exactly the indices `0..node_count` to distinct users, and every
/// edge endpoint must be a known node. Any mismatch is fatal.
pub fn load(base: &Path) -> Result<(WeightedDigraph, NodeRegistry), GraphError> {
    let snapshot: GraphSnapshot = bincode::deserialize(&fs::read(graph_file(base))?)?;
    let nodemap: HashMap<u32, u64> = serde_json::from_str(&fs::read_to_string(nodemap_file(base))?)?;

    if nodemap.len() != snapshot.node_count as usize {
        return Err(GraphError::NodeMapMismatch {
            nodes: snapshot.node_count,
            mapped: nodemap.len(),
        });
    }

    let mut registry = NodeRegistry::new();
    for node in 0..snapshot.node_count {
        let user = *nodemap.get(&node).ok_or(GraphError::UnmappedNode(node))?;
        if registry.node(user).is_some() {
            return Err(GraphError::DuplicateUser(user));
        }
        let allocated = registry.register(user);
        debug_assert_eq!(allocated, node);
    }

    let mut graph = WeightedDigraph::with_nodes(snapshot.node_count as usize);
    for (src, dst, weight) in snapshot.edges {
        if src >= snapshot.node_count || dst >= snapshot.node_count {
            return Err(GraphError::EdgeOutOfRange { src, dst });
        }
        graph.set_weight(src, dst, weight);
    }

    Ok((graph, registry))
}
